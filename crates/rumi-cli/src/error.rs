//! CLI-level fatal errors (§6, §7): only unrecoverable conditions — invalid
//! arguments, missing required credentials, zero-duration video, and
//! external-API/ML-pipeline failures — reach here. Everything else is a
//! recovered condition tracked through `WarningCounters` and never raises.

use thiserror::Error;

#[derive(Debug, Error)]
pub enum CliError {
    #[error("invalid arguments: {0}")]
    InvalidArguments(String),

    #[error("missing required credential: {0}")]
    MissingCredential(String),

    #[error("video metadata invalid: {0}")]
    InvalidVideo(#[from] rumi_core::CoreError),

    #[error("external API failure: {0}")]
    ExternalApi(String),

    #[error("ML pipeline failure: {0}")]
    MlPipeline(String),

    #[error("persistence failure: {0}")]
    Persistence(#[from] rumi_store::StoreError),
}

impl CliError {
    /// Maps this error onto the exit codes fixed by §6: 2 invalid arguments,
    /// 3 external API failure, 4 ML pipeline failure, 1 everything else.
    pub fn exit_code(&self) -> i32 {
        match self {
            CliError::InvalidArguments(_) => 2,
            CliError::MissingCredential(_) => 2,
            CliError::ExternalApi(_) => 3,
            CliError::MlPipeline(_) => 4,
            CliError::InvalidVideo(_) => 1,
            CliError::Persistence(_) => 1,
        }
    }
}

pub type CliResult<T> = Result<T, CliError>;
