//! The `runner <video_url>` full-pipeline entrypoint needs two external
//! collaborators this system explicitly does not own (§1 Non-goals): video
//! acquisition/download, and the ML models that produce per-analyzer raw
//! output. Both are modeled as one pluggable capability, the same way the
//! teacher wraps its own external services (`GeminiClient`, its R2 storage
//! client) behind a small trait rather than inlining network calls into the
//! pipeline.
//!
//! No production implementation ships here — acquiring a video and running
//! ML models against it is infrastructure this crate does not provide.
//! `runner <video_url>` fails fast with exit code 3 until a real
//! `Acquisition` is wired in by an embedder.

use std::collections::HashMap;

use async_trait::async_trait;
use rumi_core::{MLAnalysisResult, VideoMetadata};

/// Downloads `url` and runs every analyzer against it, returning the video's
/// metadata alongside each analyzer's raw `MLAnalysisResult`.
#[async_trait]
pub trait Acquisition: Send + Sync {
    async fn acquire(&self, url: &str) -> Result<(VideoMetadata, HashMap<String, MLAnalysisResult>), String>;
}

/// The only `Acquisition` this crate ships: always fails, naming the
/// missing collaborator. Stands in until an embedder supplies a real
/// downloader + ML runner.
pub struct UnavailableAcquisition;

#[async_trait]
impl Acquisition for UnavailableAcquisition {
    async fn acquire(&self, _url: &str) -> Result<(VideoMetadata, HashMap<String, MLAnalysisResult>), String> {
        Err("video acquisition and ML model execution are external collaborators with no implementation configured in this build".to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn unavailable_acquisition_always_fails() {
        let result = UnavailableAcquisition.acquire("https://example.com/v1").await;
        assert!(result.is_err());
    }
}
