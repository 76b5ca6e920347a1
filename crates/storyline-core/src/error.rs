use thiserror::Error;

/// Convenience alias for `Result<T, StorylineError>`.
pub type StorylineResult<T> = Result<T, StorylineError>;

/// Failure of a single outbound agent call.
///
/// These are absorbed by the engine's retry-and-fallback wrapper and never
/// propagate past it: after retries are exhausted the canned fallback result
/// is substituted and the run moves on.
#[derive(Debug, Error)]
pub enum CallError {
    /// The call exceeded its per-call timeout and was aborted.
    #[error("agent call timed out")]
    Timeout,

    /// The request never produced a response (connect/DNS/TLS failure).
    #[error("transport error: {0}")]
    Transport(String),

    /// The endpoint answered with a non-success status.
    /// The response body is carried for diagnostics.
    #[error("HTTP error {status}: {body}")]
    Http {
        /// HTTP status code returned by the endpoint.
        status: u16,
        /// Raw response body.
        body: String,
    },

    /// A success response whose body could not be decoded as JSON.
    #[error("response decode error: {0}")]
    Decode(String),
}

/// Fatal, structural errors.
///
/// Anything surfacing through this enum occurred outside the per-agent
/// retry/fallback machinery and aborts the whole run into the full
/// fallback storyline.
#[derive(Debug, Error)]
pub enum StorylineError {
    /// Invalid agent graph configuration (duplicate id, dangling dependency, cycle).
    #[error("graph error: {0}")]
    Graph(String),

    /// Invalid engine configuration.
    #[error("config error: {0}")]
    Config(String),

    /// JSON serialization failure.
    #[error("serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
}
