//! C8: response validator (§4.8). Never raises.

use serde::Serialize;
use serde_json::Value;

pub const CANONICAL_BLOCKS: &[&str] = &["CoreMetrics", "Dynamics", "Interactions", "KeyEvents", "Patterns", "Quality"];
const DEFAULT_CONFIDENCE: f64 = 0.5;

/// Historical block name -> canonical name. Adopted so the validator
/// accepts both legacy and canonical shapes (§9 open question: the legacy
/// shape is treated as an accepted subset, not rejected).
fn legacy_remap(name: &str) -> Option<&'static str> {
    match name {
        "densityCoreMetrics" | "creative_density_core_metrics" => Some("CoreMetrics"),
        "densityDynamics" | "creative_density_dynamics" => Some("Dynamics"),
        "densityInteractions" | "creative_density_interactions" => Some("Interactions"),
        "densityKeyEvents" | "creative_density_key_events" => Some("KeyEvents"),
        "densityPatterns" | "creative_density_patterns" => Some("Patterns"),
        "densityQuality" | "creative_density_quality" => Some("Quality"),
        _ => None,
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct ValidatedResponse {
    pub blocks_present: Vec<String>,
    pub blocks_missing: Vec<String>,
    pub data: Value,
}

pub fn validate(raw_text: &str) -> ValidatedResponse {
    let extracted = extract_largest_balanced_object(raw_text);
    let parsed: Value = match extracted.and_then(|s| serde_json::from_str(&s).ok()) {
        Some(v) => v,
        None => {
            tracing::warn!("LLM response contained no parseable balanced JSON object");
            return ValidatedResponse {
                blocks_present: Vec::new(),
                blocks_missing: CANONICAL_BLOCKS.iter().map(|s| s.to_string()).collect(),
                data: Value::Object(serde_json::Map::new()),
            };
        }
    };

    let mut remapped = serde_json::Map::new();
    if let Value::Object(obj) = &parsed {
        for (key, value) in obj {
            let canonical = legacy_remap(key).map(|s| s.to_string()).unwrap_or_else(|| key.clone());
            remapped.insert(canonical, value.clone());
        }
    }

    let mut blocks_present = Vec::new();
    let mut blocks_missing = Vec::new();
    let mut data = serde_json::Map::new();

    for block in CANONICAL_BLOCKS {
        match remapped.get(*block) {
            Some(Value::Object(block_obj)) => {
                let mut block_obj = block_obj.clone();
                normalize_confidence(&mut block_obj, block);
                data.insert(block.to_string(), Value::Object(block_obj));
                blocks_present.push(block.to_string());
            }
            Some(_) => {
                tracing::warn!(block = block, "LLM block present but not an object, treating as missing");
                blocks_missing.push(block.to_string());
            }
            None => {
                tracing::warn!(block = block, "LLM response missing canonical block");
                blocks_missing.push(block.to_string());
            }
        }
    }

    ValidatedResponse { blocks_present, blocks_missing, data: Value::Object(data) }
}

fn normalize_confidence(block: &mut serde_json::Map<String, Value>, block_name: &str) {
    let valid = block.get("confidence").and_then(|v| v.as_f64()).filter(|c| (0.0..=1.0).contains(c));
    if valid.is_none() {
        tracing::warn!(block = block_name, "missing or out-of-range confidence, defaulting to 0.5");
        block.insert("confidence".to_string(), Value::from(DEFAULT_CONFIDENCE));
    }
}

/// Finds the longest substring of `text` that forms a balanced `{...}`
/// span, tolerant of braces inside string literals.
fn extract_largest_balanced_object(text: &str) -> Option<String> {
    let chars: Vec<char> = text.chars().collect();
    let mut best: Option<(usize, usize)> = None;
    let mut stack: Vec<usize> = Vec::new();
    let mut in_string = false;
    let mut escaped = false;

    for (i, c) in chars.iter().enumerate() {
        if in_string {
            if escaped {
                escaped = false;
            } else if *c == '\\' {
                escaped = true;
            } else if *c == '"' {
                in_string = false;
            }
            continue;
        }
        match c {
            '"' => in_string = true,
            '{' => stack.push(i),
            '}' => {
                if let Some(start) = stack.pop() {
                    if stack.is_empty() {
                        let len = i - start;
                        if best.map(|(s, e)| e - s < len).unwrap_or(true) {
                            best = Some((start, i));
                        }
                    }
                }
            }
            _ => {}
        }
    }

    best.map(|(start, end)| chars[start..=end].iter().collect())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn no_balanced_braces_reports_all_missing() {
        let result = validate("not json at all");
        assert!(result.blocks_present.is_empty());
        assert_eq!(result.blocks_missing.len(), 6);
    }

    #[test]
    fn e5_partial_response_reports_present_and_missing() {
        let result = validate("Sure! Here is your JSON: {\"CoreMetrics\":{\"confidence\":0.9}}");
        assert_eq!(result.blocks_present, vec!["CoreMetrics"]);
        assert_eq!(result.blocks_missing, vec!["Dynamics", "Interactions", "KeyEvents", "Patterns", "Quality"]);
    }

    #[test]
    fn out_of_range_confidence_is_clamped_to_default() {
        let result = validate("{\"CoreMetrics\":{\"confidence\":5.0}}");
        assert_eq!(result.data["CoreMetrics"]["confidence"], 0.5);
    }

    #[test]
    fn missing_confidence_defaults() {
        let result = validate("{\"CoreMetrics\":{}}");
        assert_eq!(result.data["CoreMetrics"]["confidence"], 0.5);
    }

    #[test]
    fn legacy_name_remapped_to_canonical() {
        let result = validate("{\"densityCoreMetrics\":{\"confidence\":0.8}}");
        assert_eq!(result.blocks_present, vec!["CoreMetrics"]);
    }
}
