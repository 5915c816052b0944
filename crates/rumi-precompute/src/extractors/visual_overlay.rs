//! Analysis 6: visual overlay (§4.5.6).

use std::panic::{catch_unwind, AssertUnwindSafe};

use rumi_core::lexicons::{matches_any, CTA_LEXICON};
use rumi_core::timeline::{Modality, TextCategory};
use rumi_core::{FeatureBundle, Payload, Timeline, VideoMetadata};
use serde_json::json;

use crate::stats;

pub const NAME: &str = "visual_overlay";
const CLUTTER_WINDOW_SECS: f64 = 5.0;

const URGENCY_PHRASES: &[&str] = &["now", "today", "last chance", "ends soon", "limited", "hurry"];
const SOCIAL_PROOF_PHRASES: &[&str] = &["everyone", "viral", "trending", "millions", "followers love"];
const PRODUCT_PHRASES: &[&str] = &["buy", "shop", "product", "available", "discount", "price"];

pub fn extract(timeline: &Timeline, metadata: &VideoMetadata) -> FeatureBundle {
    let duration = metadata.duration_seconds;
    match catch_unwind(AssertUnwindSafe(|| compute(timeline, duration))) {
        Ok(metrics) => FeatureBundle::new(NAME, metrics),
        Err(_) => FeatureBundle::fallback(NAME, "visual overlay extraction panicked", json!({ "entry_count": timeline.len() })),
    }
}

fn compute(timeline: &Timeline, duration: f64) -> serde_json::Value {
    let entries: Vec<&rumi_core::TimelineEntry> = timeline.by_modality(Modality::TextOverlay).collect();

    let avg_texts_per_second = entries.len() as f64 / duration.max(1e-9);
    let unique_text_count = entries
        .iter()
        .filter_map(|e| match &e.payload {
            Payload::TextOverlay(p) => Some(p.text.clone()),
            _ => None,
        })
        .collect::<std::collections::HashSet<_>>()
        .len();

    let mut times: Vec<f64> = entries.iter().map(|e| e.start.seconds()).collect();
    times.sort_by(|a, b| a.partial_cmp(b).unwrap());
    let time_to_first_text = times.first().copied();

    let display_durations: Vec<f64> = entries.iter().filter_map(|e| e.end.map(|end| (end.seconds() - e.start.seconds()).max(0.0))).collect();
    let avg_text_display_duration = stats::mean(&display_durations);

    let intervals = stats::inter_event_intervals(times.clone());
    let burst_count = count_bursts(&times, 2.0, 3);

    let n_seconds = duration.ceil().max(1.0) as usize;
    let mut occupied = vec![false; n_seconds];
    for t in &times {
        occupied[(*t as usize).min(n_seconds.saturating_sub(1))] = true;
    }
    let empty_seconds = occupied.iter().filter(|o| !**o).count();
    let breathing_room_ratio = empty_seconds as f64 / n_seconds as f64;

    let overlay_rhythm = json!({
        "inter_appearance_mean": stats::mean(&intervals),
        "inter_appearance_variance": stats::variance(&intervals),
        "burst_windows": burst_count,
        "breathing_room_ratio": breathing_room_ratio,
    });

    let clutter_timeline = stats::windowed_counts(times.iter().copied(), duration, CLUTTER_WINDOW_SECS);

    let areas: Vec<f64> = entries
        .iter()
        .filter_map(|e| match &e.payload {
            Payload::TextOverlay(p) => Some(p.bbox.area()),
            _ => None,
        })
        .collect();
    let readability_components = json!({
        "avg_area": stats::mean(&areas),
        "area_variance": stats::variance(&areas),
    });

    let mut position_counts: std::collections::HashMap<String, u32> = std::collections::HashMap::new();
    let mut size_values: Vec<f64> = Vec::new();
    for e in &entries {
        if let Payload::TextOverlay(p) = &e.payload {
            let key = format!("{:?}_{:?}", p.position.vertical, p.position.horizontal);
            *position_counts.entry(key).or_insert(0) += 1;
            size_values.push(size_class_score(p.size_class));
        }
    }
    let text_position_distribution: serde_json::Map<String, serde_json::Value> = position_counts.into_iter().map(|(k, v)| (k, json!(v))).collect();
    let text_size_variance = stats::variance(&size_values);

    let (start, end) = rumi_core::markers::cta_window_bounds(duration);
    let cta_reinforcement_matrix = cta_reinforcement(timeline, start, end);

    let mut groups: std::collections::HashMap<&str, u32> = std::collections::HashMap::new();
    for e in &entries {
        if let Payload::TextOverlay(p) = &e.payload {
            let bucket = classify_semantic_group(&p.text, p.category);
            *groups.entry(bucket).or_insert(0) += 1;
        }
    }
    let text_semantic_groups = json!({
        "product_mentions": groups.get("product_mentions").copied().unwrap_or(0),
        "urgency_phrases": groups.get("urgency_phrases").copied().unwrap_or(0),
        "social_proof": groups.get("social_proof").copied().unwrap_or(0),
        "questions": groups.get("questions").copied().unwrap_or(0),
        "other": groups.get("other").copied().unwrap_or(0),
    });

    let speech_texts: Vec<(f64, String)> = timeline
        .by_modality(Modality::Speech)
        .filter_map(|e| match &e.payload {
            Payload::Speech(p) => Some((e.start.seconds(), p.text.to_lowercase())),
            _ => None,
        })
        .collect();
    let aligned = entries
        .iter()
        .filter(|e| {
            if let Payload::TextOverlay(p) = &e.payload {
                let overlay_text = p.text.to_lowercase();
                speech_texts.iter().any(|(t, text)| (t - e.start.seconds()).abs() <= 1.0 && text.contains(&overlay_text))
            } else {
                false
            }
        })
        .count();
    let text_speech_alignment = if entries.is_empty() { 0.0 } else { aligned as f64 / entries.len() as f64 };

    json!({
        "avg_texts_per_second": avg_texts_per_second,
        "unique_text_count": unique_text_count,
        "time_to_first_text": time_to_first_text,
        "avg_text_display_duration": avg_text_display_duration,
        "overlay_rhythm": overlay_rhythm,
        "clutter_timeline": clutter_timeline,
        "readability_components": readability_components,
        "text_position_distribution": text_position_distribution,
        "text_size_variance": text_size_variance,
        "cta_reinforcement_matrix": cta_reinforcement_matrix,
        "text_semantic_groups": text_semantic_groups,
        "text_speech_alignment": text_speech_alignment,
    })
}

fn size_class_score(sc: rumi_core::timeline::SizeClass) -> f64 {
    use rumi_core::timeline::SizeClass::*;
    match sc {
        S => 0.0,
        M => 1.0,
        L => 2.0,
        Xl => 3.0,
    }
}

fn count_bursts(sorted_times: &[f64], window: f64, min_count: usize) -> usize {
    let mut bursts = 0;
    let mut i = 0;
    while i < sorted_times.len() {
        let mut j = i;
        while j < sorted_times.len() && sorted_times[j] - sorted_times[i] <= window {
            j += 1;
        }
        if j - i >= min_count {
            bursts += 1;
            i = j;
        } else {
            i += 1;
        }
    }
    bursts
}

fn cta_reinforcement(timeline: &Timeline, start: f64, end: f64) -> serde_json::Value {
    let in_window = |t: f64| t >= start && t <= end;
    let text_times: Vec<f64> = timeline.by_modality(Modality::TextOverlay).map(|e| e.start.seconds()).filter(|t| in_window(*t)).collect();
    let gesture_times: Vec<f64> = timeline.by_modality(Modality::Gesture).map(|e| e.start.seconds()).filter(|t| in_window(*t)).collect();
    let sticker_times: Vec<f64> = timeline.by_modality(Modality::Sticker).map(|e| e.start.seconds()).filter(|t| in_window(*t)).collect();

    let co_occurs = |a: &[f64], b: &[f64]| a.iter().filter(|t1| b.iter().any(|t2| (*t1 - t2).abs() <= 0.5)).count();

    json!({
        "text_gesture": co_occurs(&text_times, &gesture_times),
        "text_sticker": co_occurs(&text_times, &sticker_times),
        "gesture_sticker": co_occurs(&gesture_times, &sticker_times),
    })
}

fn classify_semantic_group(text: &str, category: TextCategory) -> &'static str {
    if category == TextCategory::Cta || matches_any(text, CTA_LEXICON) {
        return "other";
    }
    if matches_any(text, URGENCY_PHRASES) {
        "urgency_phrases"
    } else if matches_any(text, SOCIAL_PROOF_PHRASES) {
        "social_proof"
    } else if matches_any(text, PRODUCT_PHRASES) {
        "product_mentions"
    } else if text.trim_end().ends_with('?') {
        "questions"
    } else {
        "other"
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Utc;
    use rumi_core::video::Stats;

    fn meta(duration: f64) -> VideoMetadata {
        VideoMetadata {
            video_id: "v1".into(),
            url: "u".into(),
            duration_seconds: duration,
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
    fn e4_missing_ocr_reports_zeros() {
        let bundle = extract(&Timeline::new(), &meta(10.0));
        assert_eq!(bundle.metrics["avg_texts_per_second"], 0.0);
        assert_eq!(bundle.metrics["unique_text_count"], 0);
    }
}
