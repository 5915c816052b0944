//! Ties C9's atomic writer to the on-disk layout (§6) for the three
//! persisted shapes: `UnifiedAnalysis`, `TemporalMarkers`, and per-analysis
//! insight results.

use std::path::Path;

use chrono::Utc;
use rumi_core::{TemporalMarkers, UnifiedAnalysis};
use serde_json::Value;

use crate::atomic::{atomic_write_json, load_if_current};
use crate::error::StoreResult;
use crate::layout::{insight_result_path, temporal_markers_path, unified_analysis_path};

pub async fn persist_unified_analysis(base_dir: &Path, analysis: &UnifiedAnalysis) -> StoreResult<()> {
    let path = unified_analysis_path(base_dir, &analysis.video_id);
    atomic_write_json(&path, analysis, "unified analysis").await
}

/// Cache-aware read: an already-persisted `UnifiedAnalysis` for `video_id`
/// is usable as long as its `video_id` matches (corrupt or mismatched data
/// is a miss, never an error), letting a second `runner <video_id>`
/// invocation skip straight to C4/C5 (§2 supplemented feature).
pub async fn load_if_current_unified_analysis(base_dir: &Path, video_id: &str) -> Option<UnifiedAnalysis> {
    let path = unified_analysis_path(base_dir, video_id);
    load_if_current(&path, |ua: &UnifiedAnalysis| ua.video_id == video_id).await
}

pub async fn persist_temporal_markers(base_dir: &Path, video_id: &str, markers: &TemporalMarkers) -> StoreResult<()> {
    let timestamp = Utc::now().format("%Y%m%dT%H%M%SZ").to_string();
    let path = temporal_markers_path(base_dir, video_id, &timestamp);
    atomic_write_json(&path, markers, "temporal markers").await
}

pub async fn persist_insight_result(base_dir: &Path, video_id: &str, analysis: &str, result: &Value) -> StoreResult<()> {
    let path = insight_result_path(base_dir, video_id, analysis);
    atomic_write_json(&path, result, "insight result").await
}

#[cfg(test)]
mod tests {
    use super::*;
    use rumi_core::video::Stats;
    use rumi_core::{Timeline, VideoMetadata, WarningCounters};
    use std::collections::HashMap;

    fn meta() -> VideoMetadata {
        VideoMetadata {
            video_id: "v1".into(),
            url: "u".into(),
            duration_seconds: 10.0,
            original_fps: Some(30.0),
            frame_count: None,
            width: None,
            height: None,
            description: String::new(),
            author: String::new(),
            stats: Stats::default(),
            created_at: Utc::now(),
        }
    }

    #[tokio::test]
    async fn persisted_unified_analysis_round_trips() {
        let dir = tempfile::tempdir().unwrap();
        let ua = UnifiedAnalysis::new(meta(), Timeline::new(), HashMap::new(), WarningCounters::new());

        persist_unified_analysis(dir.path(), &ua).await.unwrap();
        let loaded = load_if_current_unified_analysis(dir.path(), "v1").await;
        assert!(loaded.is_some());
        assert_eq!(loaded.unwrap().video_id, "v1");
    }

    #[tokio::test]
    async fn mismatched_video_id_is_a_miss() {
        let dir = tempfile::tempdir().unwrap();
        let ua = UnifiedAnalysis::new(meta(), Timeline::new(), HashMap::new(), WarningCounters::new());
        persist_unified_analysis(dir.path(), &ua).await.unwrap();

        let loaded = load_if_current_unified_analysis(dir.path(), "other-video").await;
        assert!(loaded.is_none());
    }
}
