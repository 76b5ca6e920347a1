//! Storyline command-line entry point.
//!
//! Builds the default agent graph and an HTTP caller from `STORYLINE_*`
//! environment variables, runs one storyline generation for the project
//! context given on the command line, and prints the outcome as JSON.

use clap::Parser;
use std::sync::Arc;
use storyline_core::{ProjectContext, StorylineResult};
use storyline_engine::{default_agents, AgentGraph, Engine, EngineConfig, HttpAgentCaller};
use tracing::info;
use tracing_subscriber::EnvFilter;

#[derive(Parser)]
#[command(name = "storyline", about = "Storyline — agent-driven research storyline generator")]
struct Cli {
    /// Project identifier
    #[arg(long, default_value = "")]
    project_id: String,
    /// Project name
    #[arg(long, default_value = "")]
    project_name: String,
    /// Client name
    #[arg(long, default_value = "")]
    client_name: String,
    /// Client industry
    #[arg(long, default_value = "")]
    industry: String,
    /// Free-text project description
    #[arg(long, default_value = "")]
    description: String,
    /// Target deliverable identifier
    #[arg(long, default_value = "")]
    deliverable_id: String,
    /// Target deliverable name
    #[arg(long, default_value = "")]
    deliverable_name: String,
    /// Free-text deliverable brief
    #[arg(long, default_value = "")]
    brief: String,
    /// Geography of interest
    #[arg(long, default_value = "")]
    geography: String,
}

impl Cli {
    fn into_context(self) -> ProjectContext {
        ProjectContext {
            project_id: self.project_id,
            project_name: self.project_name,
            client_name: self.client_name,
            industry: self.industry,
            description: self.description,
            deliverable_id: self.deliverable_id,
            deliverable_name: self.deliverable_name,
            brief: self.brief,
            geography: self.geography,
        }
    }
}

#[tokio::main]
async fn main() -> StorylineResult<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .init();

    let cli = Cli::parse();
    let config = EngineConfig::from_env();
    let graph = AgentGraph::new(default_agents())?;
    let caller = Arc::new(HttpAgentCaller::new(&config));
    let engine = Engine::new(graph, caller, &config);

    engine
        .tracker()
        .subscribe(|update| {
            info!(
                phase = update.phase,
                agent = %update.agent,
                status = ?update.status,
                progress = update.progress,
                "progress"
            );
        })
        .await;

    let outcome = engine.run(cli.into_context()).await;
    println!("{}", serde_json::to_string_pretty(&outcome)?);

    if !outcome.success {
        std::process::exit(1);
    }
    Ok(())
}
