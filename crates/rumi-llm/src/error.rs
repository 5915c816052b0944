use thiserror::Error;

/// Reserved for the handful of unrecoverable conditions in the LLM
/// pipeline. Per-call failures (timeout, transport, malformed response) are
/// routine and tracked through `WarningCounters`, never through this type.
#[derive(Debug, Error)]
pub enum LlmError {
    #[error("missing API credential: {0}")]
    MissingCredential(String),
    #[error("context serialization failed: {0}")]
    ContextSerialization(#[from] serde_json::Error),
}

pub type LlmResult<T> = Result<T, LlmError>;
