//! C3: the unified timeline assembler.
//!
//! Builds an ordered `Timeline` from each analyzer's `MLAnalysisResult`. A
//! failure in one modality's builder yields a logged error and zero entries
//! from that modality, never a pipeline failure (§4.3).

use std::collections::HashMap;

use rumi_core::timeline::Modality;
use rumi_core::{MLAnalysisResult, Timeline, TimelineEntry, Timestamp, VideoMetadata, WarningCounters, WarningKind};
use serde_json::Value;
use tracing::error;

use crate::raw_entry::RawEntry;
use crate::{human, object, ocr, scene, speech};

/// The five analyzer model names the assembler knows how to place on the
/// timeline, and the set checked for `MissingModality` accounting.
pub const EXPECTED_MODELS: &[&str] = &["object_tracker", "speech", "human_analyzer", "ocr", "scene_detector"];

/// Build the unified timeline and accompanying warning counters from raw
/// analyzer results. `fps` is the video's original FPS (§4.1) — the only
/// basis used for converting any frame-indexed adapter output.
pub fn assemble(metadata: &VideoMetadata, ml_results: &HashMap<String, MLAnalysisResult>, fps: f64) -> (Timeline, WarningCounters) {
    let duration = metadata.duration_seconds;
    let mut warnings = WarningCounters::new();
    let mut timeline = Timeline::new();

    for model in EXPECTED_MODELS {
        if ml_results.get(*model).map(|r| r.success).unwrap_or(false) {
            continue;
        }
        warnings.record(WarningKind::MissingModality);
    }

    // Fixed cross-modality insertion order (§4.3): scene_change, object,
    // pose, expression, gesture, text_overlay, sticker, speech.
    push_modality_entries(&mut timeline, &mut warnings, duration, raw_entries_for("scene_detector", ml_results, |data, _| scene::build_entries(data), fps));
    push_modality_entries(&mut timeline, &mut warnings, duration, raw_entries_for("object_tracker", ml_results, |data, fps| object::build_entries(data, fps), fps));

    let human_all = raw_entries_for("human_analyzer", ml_results, |data, _| human::build_entries(data), fps);
    let (pose, rest): (Vec<_>, Vec<_>) = human_all.into_iter().partition(|e| e.payload.modality() == Modality::Pose);
    let (expr, gesture): (Vec<_>, Vec<_>) = rest.into_iter().partition(|e| e.payload.modality() == Modality::Expression);
    push_modality_entries(&mut timeline, &mut warnings, duration, pose);
    push_modality_entries(&mut timeline, &mut warnings, duration, expr);
    push_modality_entries(&mut timeline, &mut warnings, duration, gesture);

    push_modality_entries(&mut timeline, &mut warnings, duration, raw_entries_for("ocr", ml_results, |data, _| ocr::build_entries(data), fps));
    // No sticker-producing analyzer contract is specified (§6); stickers
    // remain a valid modality with zero entries unless a future adapter
    // contributes them.
    push_modality_entries(&mut timeline, &mut warnings, duration, raw_entries_for("speech", ml_results, |data, _| speech::build_entries(data), fps));

    timeline.sort();
    (timeline, warnings)
}

fn raw_entries_for(
    model: &str,
    ml_results: &HashMap<String, MLAnalysisResult>,
    build: impl Fn(&Value, f64) -> Vec<RawEntry>,
    fps: f64,
) -> Vec<RawEntry> {
    match ml_results.get(model) {
        Some(result) if result.success => build(&result.data, fps),
        Some(_) => Vec::new(),
        None => {
            error!(model, "assembler: analyzer absent, contributing zero entries");
            Vec::new()
        }
    }
}

fn push_modality_entries(timeline: &mut Timeline, warnings: &mut WarningCounters, duration: f64, raw: Vec<RawEntry>) {
    for entry in raw {
        if let Some(validated) = validate_entry(entry, duration, warnings) {
            timeline.push(validated);
        }
    }
}

/// Apply §4.3's edge-case policy: drop negative starts, clamp
/// out-of-duration starts/ends to `[0, duration]`, and swap an inverted
/// `end < start` pair.
fn validate_entry(raw: RawEntry, duration: f64, warnings: &mut WarningCounters) -> Option<TimelineEntry> {
    let mut start = raw.start;
    let mut end = raw.end;

    if start < 0.0 {
        warnings.record(WarningKind::Clamp);
        return None;
    }

    if start > duration {
        start = duration;
        warnings.record(WarningKind::Clamp);
    }

    if let Some(mut e) = end {
        if e < start {
            std::mem::swap(&mut start, &mut e);
            warnings.record(WarningKind::Clamp);
        }
        if e > duration {
            e = duration;
            warnings.record(WarningKind::Clamp);
        }
        end = Some(e);
    }

    let start_ts = Timestamp::from_seconds(start)?;
    let end_ts = end.and_then(Timestamp::from_seconds);
    Some(TimelineEntry { start: start_ts, end: end_ts, payload: raw.payload })
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
    fn e6_clamp_and_order() {
        // entries with starts -0.1, 0.0, 5.0, 100.0 on a 10s video.
        let mut results = HashMap::new();
        let speech_data = serde_json::json!({
            "language": "en",
            "segments": [
                {"start": -0.1, "text": "a", "confidence": 0.5},
                {"start": 0.0, "text": "b", "confidence": 0.5},
                {"start": 5.0, "text": "c", "confidence": 0.5},
                {"start": 100.0, "text": "d", "confidence": 0.5},
            ]
        });
        results.insert("speech".to_string(), MLAnalysisResult::success("speech", "v1", speech_data, 0.0));
        let (timeline, warnings) = assemble(&meta(10.0), &results, 30.0);
        let starts: Vec<f64> = timeline.entries().iter().map(|e| e.start.seconds()).collect();
        assert_eq!(starts, vec![0.0, 5.0, 10.0]);
        assert_eq!(warnings.count(WarningKind::Clamp), 2);
    }

    #[test]
    fn missing_modality_is_counted() {
        let (_, warnings) = assemble(&meta(10.0), &HashMap::new(), 30.0);
        assert_eq!(warnings.count(WarningKind::MissingModality), EXPECTED_MODELS.len() as u32);
    }

    #[test]
    fn fixed_modality_order_at_equal_start() {
        let mut results = HashMap::new();
        results.insert(
            "scene_detector".to_string(),
            MLAnalysisResult::success("scene_detector", "v1", serde_json::json!({"shots":[{"start_time":0.0,"end_time":1.0}]}), 0.0),
        );
        results.insert(
            "object_tracker".to_string(),
            MLAnalysisResult::success(
                "object_tracker",
                "v1",
                serde_json::json!({"tracks":[{"class":"cup","confidence":0.5,"frames":[{"timestamp":0.0}]}]}),
                0.0,
            ),
        );
        let (timeline, _) = assemble(&meta(10.0), &results, 30.0);
        assert_eq!(timeline.entries()[0].modality(), Modality::SceneChange);
        assert_eq!(timeline.entries()[1].modality(), Modality::Object);
    }
}
