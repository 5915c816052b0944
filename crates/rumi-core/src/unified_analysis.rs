//! `UnifiedAnalysis`: the aggregate produced by C3, extended by C4, and
//! consumed read-only by C5/C6/C8.

use std::collections::HashMap;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::markers::TemporalMarkers;
use crate::timeline::Timeline;
use crate::video::VideoMetadata;
use crate::warnings::WarningCounters;

/// One analyzer's normalized output, as produced by a C2 adapter.
///
/// `success = false` does not imply `data` is absent — `data` must still be
/// a valid (possibly empty) object, never null.
#[derive(Debug, Clone, Serialize, Deserialize, schemars::JsonSchema)]
pub struct MLAnalysisResult {
    pub model_name: String,
    pub model_version: String,
    pub success: bool,
    pub data: serde_json::Value,
    pub error: Option<String>,
    pub processing_time: f64,
}

impl MLAnalysisResult {
    pub fn success(model_name: impl Into<String>, model_version: impl Into<String>, data: serde_json::Value, processing_time: f64) -> Self {
        Self {
            model_name: model_name.into(),
            model_version: model_version.into(),
            success: true,
            data,
            error: None,
            processing_time,
        }
    }

    pub fn failure(model_name: impl Into<String>, model_version: impl Into<String>, error: impl Into<String>) -> Self {
        Self {
            model_name: model_name.into(),
            model_version: model_version.into(),
            success: false,
            data: serde_json::json!({}),
            error: Some(error.into()),
            processing_time: 0.0,
        }
    }
}

/// `{video_id, metadata, timeline, ml_results, temporal_markers?,
/// created_at}`.
///
/// Lifecycle: constructed after all adapters complete (C3); extended with
/// markers (C4); persisted atomically (C9); consumed read-only by C5/C6/C8.
/// Ownership: `UnifiedAnalysis` owns its `Timeline` and `MLAnalysisResult`s
/// exclusively.
#[derive(Debug, Clone, Serialize, Deserialize, schemars::JsonSchema)]
pub struct UnifiedAnalysis {
    pub video_id: String,
    pub metadata: VideoMetadata,
    pub timeline: Timeline,
    pub ml_results: HashMap<String, MLAnalysisResult>,
    pub temporal_markers: Option<TemporalMarkers>,
    #[serde(default)]
    pub warnings: WarningCounters,
    pub created_at: DateTime<Utc>,
}

impl UnifiedAnalysis {
    pub fn new(metadata: VideoMetadata, timeline: Timeline, ml_results: HashMap<String, MLAnalysisResult>, warnings: WarningCounters) -> Self {
        let video_id = metadata.video_id.clone();
        Self {
            video_id,
            metadata,
            timeline,
            ml_results,
            temporal_markers: None,
            warnings,
            created_at: Utc::now(),
        }
    }

    pub fn with_markers(mut self, markers: TemporalMarkers) -> Self {
        self.temporal_markers = Some(markers);
        self
    }

    /// Whether every declared model in `expected_models` produced a
    /// successful result; used to compute `data_completeness`.
    pub fn data_completeness(&self, expected_models: &[&str]) -> f64 {
        if expected_models.is_empty() {
            return 1.0;
        }
        let present = expected_models
            .iter()
            .filter(|m| self.ml_results.get(**m).map(|r| r.success).unwrap_or(false))
            .count();
        present as f64 / expected_models.len() as f64
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::video::Stats;

    fn meta() -> VideoMetadata {
        VideoMetadata {
            video_id: "v1".into(),
            url: "u".into(),
            duration_seconds: 10.0,
            original_fps: Some(30.0),
            frame_count: Some(300),
            width: None,
            height: None,
            description: String::new(),
            author: String::new(),
            stats: Stats::default(),
            created_at: Utc::now(),
        }
    }

    #[test]
    fn data_completeness_accounts_missing_modality() {
        let mut results = HashMap::new();
        results.insert("speech".to_string(), MLAnalysisResult::success("speech", "v1", serde_json::json!({}), 0.1));
        let ua = UnifiedAnalysis::new(meta(), Timeline::new(), results, WarningCounters::new());
        assert_eq!(ua.data_completeness(&["speech", "ocr"]), 0.5);
    }

    #[test]
    fn data_completeness_is_one_when_nothing_expected() {
        let ua = UnifiedAnalysis::new(meta(), Timeline::new(), HashMap::new(), WarningCounters::new());
        assert_eq!(ua.data_completeness(&[]), 1.0);
    }
}
