use crate::config::EngineConfig;
use crate::extract;
use crate::graph::AgentSpec;
use crate::input::AgentInput;
use async_trait::async_trait;
use serde_json::Value;
use std::time::Duration;
use storyline_core::{AgentContent, CallError};
use tracing::warn;

/// Seam between the engine and the outbound agent transport.
///
/// Implementations perform exactly one call per invocation and keep no
/// state between calls; retries and fallback live in the engine.
#[async_trait]
pub trait AgentCaller: Send + Sync {
    /// Invoke one agent endpoint with the given input payload.
    async fn call(&self, spec: &AgentSpec, input: &AgentInput) -> Result<AgentContent, CallError>;
}

/// HTTP implementation: POST `{base_url}/agents/{binding}/invoke` with the
/// API key in the `x-api-key` header and a hard per-call timeout.
pub struct HttpAgentCaller {
    client: reqwest::Client,
    base_url: String,
    api_key: String,
    timeout: Duration,
}

impl HttpAgentCaller {
    /// Build a caller from the engine configuration.
    pub fn new(config: &EngineConfig) -> Self {
        Self {
            client: reqwest::Client::new(),
            base_url: config.base_url.trim_end_matches('/').to_string(),
            api_key: config.api_key.clone(),
            timeout: config.timeout,
        }
    }
}

#[async_trait]
impl AgentCaller for HttpAgentCaller {
    async fn call(&self, spec: &AgentSpec, input: &AgentInput) -> Result<AgentContent, CallError> {
        let url = format!("{}/agents/{}/invoke", self.base_url, spec.binding);

        let resp = self
            .client
            .post(&url)
            .header("x-api-key", &self.api_key)
            .timeout(self.timeout)
            .json(input)
            .send()
            .await
            .map_err(|e| {
                if e.is_timeout() {
                    CallError::Timeout
                } else {
                    CallError::Transport(e.to_string())
                }
            })?;

        let status = resp.status();
        if !status.is_success() {
            let body = resp.text().await.unwrap_or_default();
            return Err(CallError::Http {
                status: status.as_u16(),
                body,
            });
        }

        let payload: Value = resp.json().await.map_err(|e| {
            if e.is_timeout() {
                CallError::Timeout
            } else {
                CallError::Decode(e.to_string())
            }
        })?;

        Ok(normalize(spec, &payload))
    }
}

/// Normalize a raw agent payload into canonical content.
///
/// A present-but-malformed response is patched in place rather than
/// rejected: a missing content object becomes an empty one and missing
/// insights get a minimal placeholder, with `validation_warning` set so
/// downstream consumers can tell. Degrading here is what keeps one sloppy
/// upstream response from poisoning the whole run.
pub fn normalize(spec: &AgentSpec, payload: &Value) -> AgentContent {
    let mut validation_warning = false;

    let insights = extract::string_list(payload, extract::INSIGHT_KEYS).unwrap_or_else(|| {
        validation_warning = true;
        vec![format!("{} completed with limited output", spec.display_name)]
    });

    let body = match payload.get("content") {
        Some(content @ Value::Object(_)) => content.clone(),
        _ => {
            validation_warning = true;
            Value::Object(serde_json::Map::new())
        }
    };

    if validation_warning {
        warn!(agent = %spec.id, "agent response missing required fields, patched in place");
    }

    AgentContent {
        title: extract::string(payload, extract::TITLE_KEYS),
        insights,
        citations: extract::value_list(payload, extract::CITATION_KEYS).unwrap_or_default(),
        score: extract::number(payload, extract::SCORE_KEYS),
        body,
        validation_warning,
    }
}
