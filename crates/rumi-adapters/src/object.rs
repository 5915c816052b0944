//! Object tracker adapter.
//!
//! Tolerates `objectAnnotations`, `detections`, or `results` as the top-level
//! key (§6 analyzer output contracts).

use rumi_core::{BoundingBox, MLAnalysisResult, ObjectPayload, Payload};
use serde_json::{json, Value};
use tracing::warn;

use crate::raw_entry::RawEntry;

pub const MODEL_NAME: &str = "object_tracker";

/// Normalize raw object-tracker output into a canonical `{tracks: [...]}`
/// shape. Never raises: an unrecognized top-level shape becomes
/// `success=false` with empty data.
pub fn adapt(raw: &Value, model_version: &str) -> MLAnalysisResult {
    let top = raw
        .get("objectAnnotations")
        .or_else(|| raw.get("detections"))
        .or_else(|| raw.get("results"))
        .and_then(Value::as_array);

    match top {
        Some(arr) => {
            let tracks: Vec<Value> = arr.iter().filter_map(normalize_track).collect();
            MLAnalysisResult::success(MODEL_NAME, model_version, json!({ "tracks": tracks }), 0.0)
        }
        None => {
            warn!(model = MODEL_NAME, "adapter: unrecognized object tracker output shape");
            MLAnalysisResult::failure(MODEL_NAME, model_version, "unrecognized object tracker output shape")
        }
    }
}

fn normalize_track(raw: &Value) -> Option<Value> {
    let class = raw.get("class").or_else(|| raw.get("label")).and_then(Value::as_str)?.to_string();
    let confidence = raw.get("confidence").or_else(|| raw.get("score")).and_then(Value::as_f64).unwrap_or(0.0);
    let track_id = raw
        .get("track_id")
        .or_else(|| raw.get("trackId"))
        .and_then(Value::as_str)
        .map(str::to_string);
    let frames: Vec<Value> = raw
        .get("frames")
        .and_then(Value::as_array)
        .map(|arr| arr.iter().filter_map(normalize_frame).collect())
        .unwrap_or_default();
    Some(json!({ "class": class, "confidence": confidence, "track_id": track_id, "frames": frames }))
}

fn normalize_frame(raw: &Value) -> Option<Value> {
    let timestamp = raw.get("timestamp").and_then(Value::as_f64);
    let frame_index = raw.get("frame_index").or_else(|| raw.get("frameIndex")).and_then(Value::as_u64);
    if timestamp.is_none() && frame_index.is_none() {
        return None;
    }
    Some(json!({ "timestamp": timestamp, "frame_index": frame_index, "bbox": raw.get("bbox").cloned() }))
}

/// Build raw timeline entries (one per track per frame with a resolvable
/// timestamp) from a normalized [`MLAnalysisResult::data`].
/// `frame_to_seconds` converts any frame-indexed frame using the video's
/// original FPS (never analyzer-local sampling FPS, per §4.1).
pub fn build_entries(data: &Value, original_fps: f64) -> Vec<RawEntry> {
    let mut out = Vec::new();
    let Some(tracks) = data.get("tracks").and_then(Value::as_array) else {
        return out;
    };
    for track in tracks {
        let class = match track.get("class").and_then(Value::as_str) {
            Some(c) => c.to_string(),
            None => continue,
        };
        let confidence = track.get("confidence").and_then(Value::as_f64).unwrap_or(0.0);
        let track_id = track.get("track_id").and_then(Value::as_str).map(str::to_string);
        let Some(frames) = track.get("frames").and_then(Value::as_array) else {
            continue;
        };
        for frame in frames {
            let start = match frame.get("timestamp").and_then(Value::as_f64) {
                Some(t) => t,
                None => match frame.get("frame_index").and_then(Value::as_u64) {
                    Some(idx) => rumi_core::timestamp::frame_to_seconds(idx, original_fps),
                    None => continue,
                },
            };
            let bbox = frame.get("bbox").and_then(normalize_bbox);
            out.push(RawEntry::new(
                start,
                None,
                Payload::Object(ObjectPayload {
                    class: class.clone(),
                    confidence,
                    bbox,
                    track_id: track_id.clone(),
                }),
            ));
        }
    }
    out
}

fn normalize_bbox(raw: &Value) -> Option<BoundingBox> {
    let x = raw.get("x").and_then(Value::as_f64)?;
    let y = raw.get("y").and_then(Value::as_f64)?;
    let width = raw.get("width").or_else(|| raw.get("w")).and_then(Value::as_f64)?;
    let height = raw.get("height").or_else(|| raw.get("h")).and_then(Value::as_f64)?;
    Some(BoundingBox { x, y, width, height })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn adapts_detections_key_variant() {
        let raw = json!({
            "detections": [
                { "label": "person", "score": 0.8, "frames": [{ "timestamp": 1.0, "bbox": {"x":0.1,"y":0.1,"w":0.2,"h":0.3} }] }
            ]
        });
        let result = adapt(&raw, "v1");
        assert!(result.success);
        let entries = build_entries(&result.data, 30.0);
        assert_eq!(entries.len(), 1);
        assert_eq!(entries[0].start, 1.0);
    }

    #[test]
    fn unrecognized_shape_is_not_fatal() {
        let raw = json!({ "somethingElse": [] });
        let result = adapt(&raw, "v1");
        assert!(!result.success);
        assert!(build_entries(&result.data, 30.0).is_empty());
    }

    #[test]
    fn frame_index_uses_original_fps() {
        let raw = json!({
            "objectAnnotations": [
                { "class": "cup", "confidence": 0.5, "frames": [{ "frame_index": 30 }] }
            ]
        });
        let result = adapt(&raw, "v1");
        let entries = build_entries(&result.data, 30.0);
        assert_eq!(entries[0].start, 1.0);
    }
}
