//! Fatal-only error taxonomy for `rumi-core`.
//!
//! Most recovered conditions are tracked through [`crate::warnings`] rather
//! than through `Result`; this enum is reserved for the handful of
//! unrecoverable conditions spec'd in §7: invalid input shape the caller
//! cannot proceed without, and zero-duration video.

use thiserror::Error;

#[derive(Debug, Error)]
pub enum CoreError {
    #[error("video metadata invalid: {0}")]
    InvalidMetadata(String),

    #[error("video duration must be > 0, got {0}")]
    ZeroDuration(f64),

    #[error("original_fps must be > 0 if present, got {0}")]
    InvalidFps(f64),
}

pub type CoreResult<T> = Result<T, CoreError>;
