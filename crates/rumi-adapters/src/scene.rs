//! Shot/scene detector adapter. Contract: `{shots: [{start_time, end_time,
//! start_frame, end_frame}]}`.

use rumi_core::{Payload, SceneChangePayload};
use rumi_core::timeline::SceneChangeKind;
use rumi_core::MLAnalysisResult;
use serde_json::{json, Value};
use tracing::warn;

use crate::raw_entry::RawEntry;

pub const MODEL_NAME: &str = "scene_detector";

pub fn adapt(raw: &Value, model_version: &str) -> MLAnalysisResult {
    let Some(shots) = raw.get("shots").and_then(Value::as_array) else {
        warn!(model = MODEL_NAME, "adapter: missing shots array");
        return MLAnalysisResult::failure(MODEL_NAME, model_version, "missing shots array");
    };
    let normalized: Vec<Value> = shots
        .iter()
        .filter_map(|s| {
            let start_time = s.get("start_time").and_then(Value::as_f64)?;
            let end_time = s.get("end_time").and_then(Value::as_f64)?;
            let kind = s.get("kind").and_then(Value::as_str).unwrap_or("cut").to_string();
            Some(json!({ "start_time": start_time, "end_time": end_time, "kind": kind }))
        })
        .collect();
    MLAnalysisResult::success(MODEL_NAME, model_version, json!({ "shots": normalized }), 0.0)
}

fn parse_kind(raw: &str) -> SceneChangeKind {
    match raw.to_lowercase().as_str() {
        "dissolve" => SceneChangeKind::Dissolve,
        "fade" => SceneChangeKind::Fade,
        _ => SceneChangeKind::Cut,
    }
}

/// One `scene_change` entry per shot boundary, tagged with a stable
/// `shot_id` (the shot's index in detection order).
pub fn build_entries(data: &Value) -> Vec<RawEntry> {
    let mut out = Vec::new();
    let Some(shots) = data.get("shots").and_then(Value::as_array) else {
        return out;
    };
    for (idx, shot) in shots.iter().enumerate() {
        let Some(start) = shot.get("start_time").and_then(Value::as_f64) else { continue };
        let end = shot.get("end_time").and_then(Value::as_f64);
        let kind = parse_kind(shot.get("kind").and_then(Value::as_str).unwrap_or("cut"));
        out.push(RawEntry::new(
            start,
            end,
            Payload::SceneChange(SceneChangePayload { kind, shot_id: idx.to_string() }),
        ));
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn adapts_shots_into_scene_change_entries() {
        let raw = json!({ "shots": [{"start_time":0.0,"end_time":2.0},{"start_time":2.0,"end_time":5.0}] });
        let result = adapt(&raw, "pyscenedetect-1");
        assert!(result.success);
        let entries = build_entries(&result.data);
        assert_eq!(entries.len(), 2);
        assert_eq!(entries[1].start, 2.0);
    }
}
