//! Per-video FPS registry.
//!
//! A video carries several distinct frame-rate contexts: the camera's
//! original FPS, the adaptive frame-extraction rate, model-internal sampling
//! rates, and a fixed 1 Hz aggregation rate for output buckets. Only the
//! *original* FPS may ever be used for frame↔seconds conversion (§9 of the
//! design notes fixes this); the others are sampling metadata and must never
//! leak into timestamp comparisons.
//!
//! The registry is process-wide, init-on-demand, write-once per video id.

use std::collections::HashMap;
use std::sync::RwLock;

use tracing::warn;

/// The FPS contexts tracked for one video.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct FpsContext {
    /// The camera's native frame rate. The sole basis for frame↔seconds
    /// conversion.
    pub original_fps: f64,
    /// Adaptive frame-extraction rate (2-5 Hz typical). Sampling metadata
    /// only.
    pub extraction_fps: f64,
}

impl FpsContext {
    /// Conservative defaults used when a video has no registered context:
    /// 30 fps original, 1 Hz extraction.
    pub const DEFAULT: FpsContext = FpsContext {
        original_fps: 30.0,
        extraction_fps: 1.0,
    };
}

impl Default for FpsContext {
    fn default() -> Self {
        Self::DEFAULT
    }
}

/// Process-wide, write-once-per-video registry of FPS contexts.
#[derive(Default)]
pub struct FpsRegistry {
    inner: RwLock<HashMap<String, FpsContext>>,
}

impl FpsRegistry {
    pub fn new() -> Self {
        Self {
            inner: RwLock::new(HashMap::new()),
        }
    }

    /// Register the FPS context for a video. A no-op (with a warning) if the
    /// video already has a registered context — the registry is write-once
    /// per video id so that in-flight conversions never see the basis shift
    /// under them.
    pub fn register(&self, video_id: &str, ctx: FpsContext) {
        let mut guard = self.inner.write().expect("fps registry lock poisoned");
        if guard.contains_key(video_id) {
            warn!(video_id, "fps registry: ignoring re-registration for already-registered video");
            return;
        }
        guard.insert(video_id.to_string(), ctx);
    }

    /// Fetch the registered context for a video, or the conservative
    /// defaults (with a logged warning) if none was registered.
    pub fn get_or_default(&self, video_id: &str) -> FpsContext {
        let guard = self.inner.read().expect("fps registry lock poisoned");
        match guard.get(video_id) {
            Some(ctx) => *ctx,
            None => {
                warn!(video_id, "fps registry: no context registered, using conservative defaults");
                FpsContext::DEFAULT
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_when_unregistered() {
        let reg = FpsRegistry::new();
        let ctx = reg.get_or_default("unknown");
        assert_eq!(ctx, FpsContext::DEFAULT);
    }

    #[test]
    fn write_once_ignores_second_registration() {
        let reg = FpsRegistry::new();
        reg.register("v1", FpsContext { original_fps: 24.0, extraction_fps: 2.0 });
        reg.register("v1", FpsContext { original_fps: 60.0, extraction_fps: 5.0 });
        let ctx = reg.get_or_default("v1");
        assert_eq!(ctx.original_fps, 24.0);
    }
}
