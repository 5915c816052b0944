//! Speech transcription adapter. Contract: `{segments: [{start,end,text,
//! confidence,words?}], language}`.

use rumi_core::{MLAnalysisResult, Payload, SpeechPayload, Word};
use serde_json::{json, Value};
use tracing::warn;

use crate::raw_entry::RawEntry;

pub const MODEL_NAME: &str = "speech";

pub fn adapt(raw: &Value, model_version: &str) -> MLAnalysisResult {
    let Some(segments) = raw.get("segments").and_then(Value::as_array) else {
        warn!(model = MODEL_NAME, "adapter: missing segments array");
        return MLAnalysisResult::failure(MODEL_NAME, model_version, "missing segments array");
    };
    let language = raw.get("language").and_then(Value::as_str).unwrap_or("unknown").to_string();
    let normalized: Vec<Value> = segments.iter().filter_map(normalize_segment).collect();
    MLAnalysisResult::success(MODEL_NAME, model_version, json!({ "segments": normalized, "language": language }), 0.0)
}

fn normalize_segment(raw: &Value) -> Option<Value> {
    let start = raw.get("start").and_then(Value::as_f64)?;
    let end = raw.get("end").and_then(Value::as_f64);
    let text = raw.get("text").and_then(Value::as_str)?.to_string();
    let confidence = raw.get("confidence").and_then(Value::as_f64).unwrap_or(0.0);
    let words = raw.get("words").and_then(Value::as_array).map(|arr| {
        arr.iter()
            .filter_map(|w| {
                Some(json!({
                    "word": w.get("word").and_then(Value::as_str)?.to_string(),
                    "start": w.get("start").and_then(Value::as_f64)?,
                    "end": w.get("end").and_then(Value::as_f64)?,
                    "confidence": w.get("confidence").and_then(Value::as_f64).unwrap_or(0.0),
                }))
            })
            .collect::<Vec<_>>()
    });
    Some(json!({ "start": start, "end": end, "text": text, "confidence": confidence, "words": words }))
}

pub fn build_entries(data: &Value) -> Vec<RawEntry> {
    let mut out = Vec::new();
    let language = data.get("language").and_then(Value::as_str).unwrap_or("unknown").to_string();
    let Some(segments) = data.get("segments").and_then(Value::as_array) else {
        return out;
    };
    for seg in segments {
        let Some(start) = seg.get("start").and_then(Value::as_f64) else { continue };
        let end = seg.get("end").and_then(Value::as_f64);
        let text = seg.get("text").and_then(Value::as_str).unwrap_or("").to_string();
        let confidence = seg.get("confidence").and_then(Value::as_f64).unwrap_or(0.0);
        let words = seg.get("words").and_then(Value::as_array).map(|arr| {
            arr.iter()
                .filter_map(|w| {
                    Some(Word {
                        word: w.get("word").and_then(Value::as_str)?.to_string(),
                        start: w.get("start").and_then(Value::as_f64)?,
                        end: w.get("end").and_then(Value::as_f64)?,
                        confidence: w.get("confidence").and_then(Value::as_f64).unwrap_or(0.0),
                    })
                })
                .collect::<Vec<_>>()
        });
        out.push(RawEntry::new(
            start,
            end,
            Payload::Speech(SpeechPayload { text, language: language.clone(), confidence, words }),
        ));
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn adapts_and_builds_entries() {
        let raw = json!({
            "segments": [{ "start": 1.0, "end": 3.0, "text": "hello world", "confidence": 0.95 }],
            "language": "en"
        });
        let result = adapt(&raw, "whisper-1");
        assert!(result.success);
        let entries = build_entries(&result.data);
        assert_eq!(entries.len(), 1);
        assert_eq!(entries[0].start, 1.0);
        assert_eq!(entries[0].end, Some(3.0));
    }

    #[test]
    fn missing_segments_is_not_fatal() {
        let raw = json!({ "language": "en" });
        let result = adapt(&raw, "whisper-1");
        assert!(!result.success);
    }
}
