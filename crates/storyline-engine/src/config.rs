use std::time::Duration;

/// Engine configuration.
///
/// Every knob is environment-provided with a default; an absent or
/// unparsable value falls back rather than failing the engine.
#[derive(Debug, Clone)]
pub struct EngineConfig {
    /// Base URL of the agent endpoint service.
    pub base_url: String,
    /// API key sent in the `x-api-key` header.
    pub api_key: String,
    /// Hard per-call timeout.
    pub timeout: Duration,
    /// Retries per agent call before the fallback is substituted.
    pub max_retries: u32,
    /// Base delay for the linear retry backoff (attempt number × base).
    pub retry_base_delay: Duration,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            base_url: "http://localhost:8080".to_string(),
            api_key: String::new(),
            timeout: Duration::from_secs(120),
            max_retries: 2,
            retry_base_delay: Duration::from_secs(1),
        }
    }
}

impl EngineConfig {
    /// Read configuration from `STORYLINE_*` environment variables,
    /// falling back to defaults for anything missing or unparsable.
    pub fn from_env() -> Self {
        let defaults = Self::default();
        Self {
            base_url: env_string("STORYLINE_API_BASE_URL").unwrap_or(defaults.base_url),
            api_key: env_string("STORYLINE_API_KEY").unwrap_or(defaults.api_key),
            timeout: env_parse("STORYLINE_TIMEOUT_SECS")
                .map(Duration::from_secs)
                .unwrap_or(defaults.timeout),
            max_retries: env_parse("STORYLINE_MAX_RETRIES").unwrap_or(defaults.max_retries),
            retry_base_delay: env_parse("STORYLINE_RETRY_BASE_DELAY_MS")
                .map(Duration::from_millis)
                .unwrap_or(defaults.retry_base_delay),
        }
    }
}

fn env_string(key: &str) -> Option<String> {
    std::env::var(key).ok().filter(|v| !v.trim().is_empty())
}

fn env_parse<T: std::str::FromStr>(key: &str) -> Option<T> {
    env_string(key).and_then(|v| v.parse().ok())
}
