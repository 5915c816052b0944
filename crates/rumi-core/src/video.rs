//! Video-level metadata, as fanned out to every analyzer and precompute
//! function.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::error::{CoreError, CoreResult};

/// Engagement counters for the source platform.
#[derive(Debug, Clone, Default, Serialize, Deserialize, schemars::JsonSchema)]
pub struct Stats {
    #[serde(default)]
    pub views: u64,
    #[serde(default)]
    pub likes: u64,
    #[serde(default)]
    pub comments: u64,
    #[serde(default)]
    pub shares: u64,
    #[serde(default)]
    pub saves: u64,
}

/// `{video_id, url, duration_seconds, original_fps, frame_count, width,
/// height, description, author, stats, created_at}`.
///
/// Invariants: `duration_seconds > 0`; `original_fps > 0` if present.
#[derive(Debug, Clone, Serialize, Deserialize, schemars::JsonSchema)]
pub struct VideoMetadata {
    pub video_id: String,
    pub url: String,
    pub duration_seconds: f64,
    pub original_fps: Option<f64>,
    pub frame_count: Option<u64>,
    pub width: Option<u32>,
    pub height: Option<u32>,
    #[serde(default)]
    pub description: String,
    #[serde(default)]
    pub author: String,
    #[serde(default)]
    pub stats: Stats,
    pub created_at: DateTime<Utc>,
}

impl VideoMetadata {
    /// Validate the invariants a caller must hold before the pipeline
    /// proceeds. `duration_seconds <= 0` and an out-of-range `original_fps`
    /// are the two unrecoverable conditions named in §7 — everything else is
    /// tracked as a warning downstream.
    pub fn validate(&self) -> CoreResult<()> {
        if !(self.duration_seconds > 0.0) {
            return Err(CoreError::ZeroDuration(self.duration_seconds));
        }
        if let Some(fps) = self.original_fps {
            if !(fps > 0.0) {
                return Err(CoreError::InvalidFps(fps));
            }
        }
        Ok(())
    }

    pub fn engagement_count(&self) -> u64 {
        self.stats.likes + self.stats.comments + self.stats.shares + self.stats.saves
    }

    /// `(likes+comments+shares+saves)/views`, `0.0` when `views == 0` rather
    /// than dividing by zero.
    pub fn engagement_rate(&self) -> f64 {
        if self.stats.views == 0 {
            0.0
        } else {
            self.engagement_count() as f64 / self.stats.views as f64
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn base() -> VideoMetadata {
        VideoMetadata {
            video_id: "v1".into(),
            url: "https://example.com/v1".into(),
            duration_seconds: 10.0,
            original_fps: Some(30.0),
            frame_count: Some(300),
            width: Some(1080),
            height: Some(1920),
            description: String::new(),
            author: String::new(),
            stats: Stats::default(),
            created_at: Utc::now(),
        }
    }

    #[test]
    fn rejects_zero_duration() {
        let mut v = base();
        v.duration_seconds = 0.0;
        assert!(matches!(v.validate(), Err(CoreError::ZeroDuration(_))));
    }

    #[test]
    fn rejects_non_positive_fps() {
        let mut v = base();
        v.original_fps = Some(0.0);
        assert!(matches!(v.validate(), Err(CoreError::InvalidFps(_))));
    }

    #[test]
    fn accepts_absent_fps() {
        let mut v = base();
        v.original_fps = None;
        assert!(v.validate().is_ok());
    }

    #[test]
    fn engagement_rate_avoids_division_by_zero() {
        let v = base();
        assert_eq!(v.engagement_rate(), 0.0);
    }
}
