//! C6: prompt context builder (§4.6).

use std::collections::HashMap;

use rumi_core::timeline::Modality;
use rumi_core::{FeatureBundle, Timeline, VideoMetadata};
use serde::Serialize;
use serde_json::{json, Value};

const SIZE_BUDGET_BYTES: usize = 200 * 1024;
const DESCRIPTION_TRUNCATE_CHARS: usize = 40;
const TIER_B_CAP: usize = 50;
const DEFAULT_PROJECTION_CAP: usize = 30;

#[derive(Debug, Clone, Serialize)]
pub struct PromptContext {
    pub analysis: String,
    pub precomputed_metrics: FeatureBundle,
    pub timelines: Value,
    pub metadata: VideoMetadata,
    pub duration: f64,
    /// 0 = no compression needed; 1..=3 = tiers (a)/(b)/(c) of §4.6 applied.
    pub compression_level: u8,
}

/// Which modalities feed each analysis's context, mirroring C5's own
/// per-analysis inputs so the LLM sees the same evidence the precomputed
/// metrics were derived from.
fn required_modalities(analysis: &str) -> &'static [Modality] {
    use Modality::*;
    match analysis {
        "creative_density" => &[TextOverlay, Sticker, SceneChange, Object],
        "emotional_journey" => &[Expression, Gesture],
        "person_framing" => &[Object, Expression, Pose],
        "scene_pacing" => &[SceneChange],
        "speech_analysis" => &[Speech, Gesture],
        "visual_overlay" => &[TextOverlay, Gesture, Sticker, Speech],
        "metadata_analysis" => &[],
        _ => &[],
    }
}

pub fn build_context(analysis: &str, bundle: &FeatureBundle, timeline: &Timeline, metadata: &VideoMetadata) -> PromptContext {
    let modalities = required_modalities(analysis);
    let mut timelines = project_timelines(timeline, modalities, DEFAULT_PROJECTION_CAP);

    let mut compression_level = 0u8;
    if serialized_size(&timelines, bundle, metadata) > SIZE_BUDGET_BYTES {
        truncate_descriptions(&mut timelines);
        compression_level = 1;
    }
    if serialized_size(&timelines, bundle, metadata) > SIZE_BUDGET_BYTES {
        timelines = project_timelines(timeline, modalities, TIER_B_CAP.min(DEFAULT_PROJECTION_CAP));
        truncate_descriptions(&mut timelines);
        compression_level = 2;
    }
    if serialized_size(&timelines, bundle, metadata) > SIZE_BUDGET_BYTES {
        timelines = summary_counts(timeline, modalities);
        compression_level = 3;
    }

    PromptContext {
        analysis: analysis.to_string(),
        precomputed_metrics: bundle.clone(),
        timelines,
        metadata: metadata.clone(),
        duration: metadata.duration_seconds,
        compression_level,
    }
}

fn serialized_size(timelines: &Value, bundle: &FeatureBundle, metadata: &VideoMetadata) -> usize {
    let payload = json!({
        "precomputed_metrics": bundle,
        "timelines": timelines,
        "metadata": metadata,
        "duration": metadata.duration_seconds,
    });
    serde_json::to_vec(&payload).map(|v| v.len()).unwrap_or(usize::MAX)
}

fn project_timelines(timeline: &Timeline, modalities: &[Modality], cap: usize) -> Value {
    let mut map: HashMap<String, Value> = HashMap::new();
    for modality in modalities {
        let entries: Vec<&rumi_core::TimelineEntry> = timeline.by_modality(*modality).collect();
        let sampled = evenly_spaced(&entries, cap);
        let values: Vec<Value> = sampled.iter().map(|e| json!(e)).collect();
        map.insert(format!("{:?}", modality).to_lowercase(), json!(values));
    }
    json!(map)
}

fn evenly_spaced<'a, T>(items: &[&'a T], cap: usize) -> Vec<&'a T> {
    if items.len() <= cap || cap == 0 {
        return items.to_vec();
    }
    let step = items.len() as f64 / cap as f64;
    (0..cap).map(|i| items[((i as f64 * step) as usize).min(items.len() - 1)]).collect()
}

/// Tier (a): drop verbose descriptions by truncating free-text fields.
fn truncate_descriptions(timelines: &mut Value) {
    if let Value::Object(map) = timelines {
        for (_, entries) in map.iter_mut() {
            if let Value::Array(list) = entries {
                for entry in list.iter_mut() {
                    truncate_text_fields(entry);
                }
            }
        }
    }
}

fn truncate_text_fields(entry: &mut Value) {
    if let Value::Object(obj) = entry {
        for (key, value) in obj.iter_mut() {
            if key == "text" || key == "description" {
                if let Value::String(s) = value {
                    if s.chars().count() > DESCRIPTION_TRUNCATE_CHARS {
                        *s = s.chars().take(DESCRIPTION_TRUNCATE_CHARS).collect();
                    }
                }
            } else {
                truncate_text_fields(value);
            }
        }
    }
}

/// Tier (c): replace raw timelines with per-modality counts only.
fn summary_counts(timeline: &Timeline, modalities: &[Modality]) -> Value {
    let mut map: HashMap<String, usize> = HashMap::new();
    for modality in modalities {
        map.insert(format!("{:?}", modality).to_lowercase(), timeline.by_modality(*modality).count());
    }
    json!(map)
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Utc;
    use rumi_core::video::Stats;
    use rumi_core::{Payload, TimelineEntry, Timestamp};
    use serde_json::json as j;

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

    #[test]
    fn object_timeline_downsampled_to_cap() {
        let mut timeline = Timeline::new();
        for i in 0..100 {
            timeline.push(TimelineEntry {
                start: Timestamp::from_seconds(i as f64 / 10.0).unwrap(),
                end: None,
                payload: Payload::Object(rumi_core::timeline::ObjectPayload {
                    class: "person".into(),
                    confidence: 0.9,
                    track_id: None,
                    bbox: None,
                }),
            });
        }
        timeline.sort();
        let bundle = FeatureBundle::new("person_framing", j!({}));
        let ctx = build_context("person_framing", &bundle, &timeline, &meta());
        let object_entries = ctx.timelines.get("object").unwrap().as_array().unwrap();
        assert!(object_entries.len() <= 30);
    }

    #[test]
    fn no_compression_when_under_budget() {
        let bundle = FeatureBundle::new("speech_analysis", j!({"word_count": 2}));
        let ctx = build_context("speech_analysis", &bundle, &Timeline::new(), &meta());
        assert_eq!(ctx.compression_level, 0);
    }
}
