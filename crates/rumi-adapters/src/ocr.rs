//! OCR adapter. Contract: per-frame records with text elements `{text,
//! bbox, size, position, category?}`.

use rumi_core::timeline::{HorizontalPosition, SizeClass, TextCategory, TextPosition, VerticalPosition};
use rumi_core::{BoundingBox, MLAnalysisResult, Payload, TextOverlayPayload};
use serde_json::{json, Value};
use tracing::warn;

use crate::raw_entry::RawEntry;

pub const MODEL_NAME: &str = "ocr";

pub fn adapt(raw: &Value, model_version: &str) -> MLAnalysisResult {
    let Some(frames) = raw.get("frames").and_then(Value::as_array) else {
        warn!(model = MODEL_NAME, "adapter: missing frames array");
        return MLAnalysisResult::failure(MODEL_NAME, model_version, "missing frames array");
    };
    let normalized: Vec<Value> = frames
        .iter()
        .filter_map(|f| {
            let timestamp = f.get("timestamp").and_then(Value::as_f64)?;
            let elements: Vec<Value> = f
                .get("elements")
                .or_else(|| f.get("texts"))
                .and_then(Value::as_array)
                .map(|arr| arr.iter().filter_map(normalize_element).collect())
                .unwrap_or_default();
            Some(json!({ "timestamp": timestamp, "elements": elements }))
        })
        .collect();
    MLAnalysisResult::success(MODEL_NAME, model_version, json!({ "frames": normalized }), 0.0)
}

fn normalize_element(raw: &Value) -> Option<Value> {
    let text = raw.get("text").and_then(Value::as_str)?.to_string();
    let bbox = raw.get("bbox")?;
    let size = raw.get("size").and_then(Value::as_str).unwrap_or("M").to_string();
    let position = raw.get("position").cloned().unwrap_or(json!("middle_center"));
    let category = raw.get("category").and_then(Value::as_str).unwrap_or("other").to_string();
    Some(json!({ "text": text, "bbox": bbox, "size": size, "position": position, "category": category }))
}

fn parse_size_class(raw: &str) -> SizeClass {
    match raw.to_uppercase().as_str() {
        "S" => SizeClass::S,
        "L" => SizeClass::L,
        "XL" => SizeClass::Xl,
        _ => SizeClass::M,
    }
}

fn parse_position(raw: &Value) -> TextPosition {
    let combined = raw.as_str().unwrap_or("middle_center").to_lowercase();
    let vertical = if combined.contains("top") {
        VerticalPosition::Top
    } else if combined.contains("bottom") {
        VerticalPosition::Bottom
    } else {
        VerticalPosition::Middle
    };
    let horizontal = if combined.contains("left") {
        HorizontalPosition::Left
    } else if combined.contains("right") {
        HorizontalPosition::Right
    } else {
        HorizontalPosition::Center
    };
    TextPosition { vertical, horizontal }
}

fn parse_category(raw: &str) -> TextCategory {
    match raw.to_lowercase().as_str() {
        "headline" => TextCategory::Headline,
        "subtitle" => TextCategory::Subtitle,
        "cta" => TextCategory::Cta,
        "caption" => TextCategory::Caption,
        "number" => TextCategory::Number,
        "hashtag" => TextCategory::Hashtag,
        _ => TextCategory::Other,
    }
}

fn parse_bbox(raw: &Value) -> Option<BoundingBox> {
    Some(BoundingBox {
        x: raw.get("x").and_then(Value::as_f64)?,
        y: raw.get("y").and_then(Value::as_f64)?,
        width: raw.get("width").or_else(|| raw.get("w")).and_then(Value::as_f64)?,
        height: raw.get("height").or_else(|| raw.get("h")).and_then(Value::as_f64)?,
    })
}

pub fn build_entries(data: &Value) -> Vec<RawEntry> {
    let mut out = Vec::new();
    let Some(frames) = data.get("frames").and_then(Value::as_array) else {
        return out;
    };
    for frame in frames {
        let Some(timestamp) = frame.get("timestamp").and_then(Value::as_f64) else { continue };
        let Some(elements) = frame.get("elements").and_then(Value::as_array) else { continue };
        for el in elements {
            let Some(text) = el.get("text").and_then(Value::as_str) else { continue };
            let Some(bbox) = el.get("bbox").and_then(parse_bbox) else { continue };
            let size_class = parse_size_class(el.get("size").and_then(Value::as_str).unwrap_or("M"));
            let position = parse_position(el.get("position").unwrap_or(&json!("middle_center")));
            let category = parse_category(el.get("category").and_then(Value::as_str).unwrap_or("other"));
            out.push(RawEntry::new(
                timestamp,
                None,
                Payload::TextOverlay(TextOverlayPayload {
                    text: text.to_string(),
                    bbox,
                    size_class,
                    position,
                    category,
                }),
            ));
        }
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn adapts_text_elements_key_variant() {
        let raw = json!({
            "frames": [{
                "timestamp": 0.5,
                "texts": [{ "text": "FOLLOW ME", "bbox": {"x":0.1,"y":0.1,"w":0.5,"h":0.1}, "size":"XL", "position":"top_center", "category":"cta" }]
            }]
        });
        let result = adapt(&raw, "easyocr-1");
        assert!(result.success);
        let entries = build_entries(&result.data);
        assert_eq!(entries.len(), 1);
        match &entries[0].payload {
            Payload::TextOverlay(p) => {
                assert_eq!(p.size_class, SizeClass::Xl);
                assert_eq!(p.category, TextCategory::Cta);
            }
            _ => panic!("expected text_overlay payload"),
        }
    }
}
