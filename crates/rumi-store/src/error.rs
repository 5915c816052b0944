use thiserror::Error;

/// Reserved for persistence failures that must be surfaced as fatal for
/// the write in question (§7: PersistenceFailure). Routine decode-as-miss
/// behavior on read (`load_if_current`) never raises this type.
#[derive(Debug, Error)]
pub enum StoreError {
    #[error("failed to serialize {what}: {source}")]
    Serialize {
        what: &'static str,
        #[source]
        source: serde_json::Error,
    },
    #[error("atomic write to {path} failed: {source}")]
    Write {
        path: std::path::PathBuf,
        #[source]
        source: std::io::Error,
    },
}

pub type StoreResult<T> = Result<T, StoreError>;
