//! Human analyzer adapter (pose/face/gesture/expression). Contract:
//! per-frame records with face/pose/gesture/expression fields.

use rumi_core::{ExpressionPayload, GesturePayload, Payload, PosePayload};
use rumi_core::MLAnalysisResult;
use serde_json::{json, Value};
use tracing::warn;

use crate::raw_entry::RawEntry;

pub const MODEL_NAME: &str = "human_analyzer";

pub fn adapt(raw: &Value, model_version: &str) -> MLAnalysisResult {
    let Some(frames) = raw.get("frames").and_then(Value::as_array) else {
        warn!(model = MODEL_NAME, "adapter: missing frames array");
        return MLAnalysisResult::failure(MODEL_NAME, model_version, "missing frames array");
    };
    let normalized: Vec<Value> = frames.iter().filter_map(normalize_frame).collect();
    MLAnalysisResult::success(MODEL_NAME, model_version, json!({ "frames": normalized }), 0.0)
}

fn normalize_frame(raw: &Value) -> Option<Value> {
    let timestamp = raw.get("timestamp").and_then(Value::as_f64)?;

    let pose = raw.get("pose").map(|p| {
        json!({
            "confidence": p.get("confidence").and_then(Value::as_f64).unwrap_or(0.0),
            "keypoints": p.get("keypoints").cloned(),
        })
    });

    let expression = raw
        .get("expression")
        .or_else(|| raw.get("face").and_then(|f| f.get("expression")))
        .map(|e| {
            json!({
                "emotion": e.get("emotion").and_then(Value::as_str).unwrap_or("neutral"),
                "valence": e.get("valence").and_then(Value::as_f64).unwrap_or(0.0),
                "intensity": e.get("intensity").and_then(Value::as_f64).unwrap_or(0.0),
            })
        });

    let gestures: Vec<Value> = raw
        .get("gestures")
        .and_then(Value::as_array)
        .map(|arr| {
            arr.iter()
                .filter_map(|g| {
                    Some(json!({
                        "label": g.get("label").and_then(Value::as_str)?.to_string(),
                        "target": g.get("target").and_then(Value::as_str),
                        "confidence": g.get("confidence").and_then(Value::as_f64).unwrap_or(0.0),
                    }))
                })
                .collect()
        })
        .unwrap_or_default();

    Some(json!({ "timestamp": timestamp, "pose": pose, "expression": expression, "gestures": gestures }))
}

pub fn build_entries(data: &Value) -> Vec<RawEntry> {
    let mut out = Vec::new();
    let Some(frames) = data.get("frames").and_then(Value::as_array) else {
        return out;
    };
    for frame in frames {
        let Some(timestamp) = frame.get("timestamp").and_then(Value::as_f64) else { continue };

        if let Some(pose) = frame.get("pose").filter(|p| !p.is_null()) {
            let confidence = pose.get("confidence").and_then(Value::as_f64).unwrap_or(0.0);
            let keypoints = pose.get("keypoints").and_then(Value::as_array).map(|arr| {
                arr.iter()
                    .filter_map(|kp| {
                        let pair = kp.as_array()?;
                        Some((pair.first()?.as_f64()?, pair.get(1)?.as_f64()?))
                    })
                    .collect::<Vec<_>>()
            });
            out.push(RawEntry::new(timestamp, None, Payload::Pose(PosePayload { keypoints, confidence })));
        }

        if let Some(expr) = frame.get("expression").filter(|e| !e.is_null()) {
            let emotion = expr.get("emotion").and_then(Value::as_str).unwrap_or("neutral").to_string();
            let valence = expr.get("valence").and_then(Value::as_f64).unwrap_or(0.0);
            let intensity = expr.get("intensity").and_then(Value::as_f64).unwrap_or(0.0);
            out.push(RawEntry::new(timestamp, None, Payload::Expression(ExpressionPayload { emotion, valence, intensity })));
        }

        if let Some(gestures) = frame.get("gestures").and_then(Value::as_array) {
            for g in gestures {
                let Some(label) = g.get("label").and_then(Value::as_str) else { continue };
                let target = g.get("target").and_then(Value::as_str).map(str::to_string);
                let confidence = g.get("confidence").and_then(Value::as_f64).unwrap_or(0.0);
                out.push(RawEntry::new(
                    timestamp,
                    None,
                    Payload::Gesture(GesturePayload { label: label.to_string(), target, confidence }),
                ));
            }
        }
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn adapts_mixed_frame_fields() {
        let raw = json!({
            "frames": [{
                "timestamp": 2.0,
                "pose": {"confidence": 0.7, "keypoints": [[0.1,0.2],[0.3,0.4]]},
                "expression": {"emotion":"happy", "valence":0.8, "intensity":0.6},
                "gestures": [{"label":"point", "confidence":0.9}]
            }]
        });
        let result = adapt(&raw, "v1");
        assert!(result.success);
        let entries = build_entries(&result.data);
        assert_eq!(entries.len(), 3);
    }
}
