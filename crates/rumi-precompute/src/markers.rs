//! C4: temporal-marker extraction (§4.4).
//!
//! `extract` never raises: any internal failure is caught and the canonical
//! empty-but-valid `TemporalMarkers` is returned instead, logged at error.

use std::collections::HashMap;
use std::panic::{catch_unwind, AssertUnwindSafe};

use rumi_core::lexicons::{matches_any, CTA_LEXICON};
use rumi_core::markers::{cta_window_bounds, CtaAppearance, CtaWindow, FirstFiveSeconds, GestureMoment, MarkersMetadata, ObjectAppearance, TemporalMarkers, TextMoment, HARD_CAP_BYTES};
use rumi_core::timeline::{Modality, Payload};
use rumi_core::{Timeline, UnifiedAnalysis};
use tracing::error;

const INITIAL_K: usize = 8;

/// `extract(UnifiedAnalysis) -> TemporalMarkers`. Never raises.
pub fn extract(ua: &UnifiedAnalysis) -> TemporalMarkers {
    let video_id = ua.video_id.clone();
    let duration = ua.metadata.duration_seconds;

    let result = catch_unwind(AssertUnwindSafe(|| extract_inner(&ua.timeline, &video_id, duration)));

    match result {
        Ok(markers) => markers,
        Err(_) => {
            error!(video_id, "temporal marker extraction panicked, emitting empty structure");
            TemporalMarkers::empty(video_id, duration)
        }
    }
}

fn extract_inner(timeline: &Timeline, video_id: &str, duration: f64) -> TemporalMarkers {
    let mut k = INITIAL_K;
    loop {
        let markers = build_markers(timeline, video_id, duration, k);
        if markers.fits_hard_cap() {
            return markers;
        }
        if k == 0 {
            error!(video_id, "temporal markers exceed hard cap even at k=0, emitting empty structure");
            return TemporalMarkers::empty(video_id, duration);
        }
        k /= 2;
    }
}

fn build_markers(timeline: &Timeline, video_id: &str, duration: f64, k: usize) -> TemporalMarkers {
    TemporalMarkers {
        first_5_seconds: build_first_5_seconds(timeline, k),
        cta_window: build_cta_window(timeline, duration, k),
        metadata: MarkersMetadata {
            video_id: video_id.to_string(),
            duration,
            generated_at: chrono::Utc::now(),
        },
    }
}

fn build_first_5_seconds(timeline: &Timeline, k: usize) -> FirstFiveSeconds {
    let mut density_progression = [0u32; 5];
    for entry in timeline.entries() {
        let s = entry.start.seconds();
        if s < 5.0 {
            let idx = (s as usize).min(4);
            density_progression[idx] = (density_progression[idx] + 1).min(10);
        }
    }

    let mut text_moments: Vec<(f64, TextMoment)> = Vec::new();
    let mut gesture_moments: Vec<(f64, GestureMoment)> = Vec::new();
    let mut object_appearances: Vec<(f64, ObjectAppearance)> = Vec::new();
    let mut seen_classes: std::collections::HashSet<String> = std::collections::HashSet::new();

    for entry in timeline.entries() {
        let s = entry.start.seconds();
        if s >= 5.0 {
            continue;
        }
        match &entry.payload {
            Payload::TextOverlay(p) => {
                let rank = size_class_rank(p.size_class);
                let score = rank * 1000.0 + p.bbox.area();
                text_moments.push((score, TextMoment { time: s, text: p.text.clone(), size_class: format!("{:?}", p.size_class), confidence: 1.0 }));
            }
            Payload::Gesture(p) => {
                gesture_moments.push((p.confidence, GestureMoment { time: s, label: p.label.clone(), confidence: p.confidence }));
            }
            Payload::Object(p) => {
                let is_first = seen_classes.insert(p.class.clone());
                let novelty_bonus = if is_first { 1.0 } else { 0.0 };
                let score = p.confidence + novelty_bonus;
                object_appearances.push((score, ObjectAppearance { time: s, class: p.class.clone(), confidence: p.confidence, is_first_appearance: is_first }));
            }
            _ => {}
        }
    }

    FirstFiveSeconds {
        density_progression,
        text_moments: top_k(text_moments, k),
        emotion_sequence: emotion_sequence_for_first_5s(timeline),
        gesture_moments: top_k(gesture_moments, k),
        object_appearances: top_k(object_appearances, k),
    }
}

fn size_class_rank(sc: rumi_core::timeline::SizeClass) -> f64 {
    use rumi_core::timeline::SizeClass::*;
    match sc {
        Xl => 3.0,
        L => 2.0,
        M => 1.0,
        S => 0.0,
    }
}

fn top_k<T>(mut scored: Vec<(f64, T)>, k: usize) -> Vec<T> {
    scored.sort_by(|a, b| b.0.partial_cmp(&a.0).unwrap_or(std::cmp::Ordering::Equal));
    scored.truncate(k);
    scored.into_iter().map(|(_, v)| v).collect()
}

fn emotion_sequence_for_first_5s(timeline: &Timeline) -> [String; 5] {
    let mut buckets: [Option<(f64, String)>; 5] = Default::default();
    for entry in timeline.by_modality(Modality::Expression) {
        let s = entry.start.seconds();
        if s >= 5.0 {
            continue;
        }
        if let Payload::Expression(p) = &entry.payload {
            let idx = (s as usize).min(4);
            let strength = p.intensity.abs();
            let replace = match &buckets[idx] {
                Some((existing, _)) => strength > *existing,
                None => true,
            };
            if replace {
                buckets[idx] = Some((strength, p.emotion.clone()));
            }
        }
    }
    std::array::from_fn(|i| buckets[i].clone().map(|(_, e)| e).unwrap_or_else(|| "neutral".to_string()))
}

fn build_cta_window(timeline: &Timeline, duration: f64, k: usize) -> CtaWindow {
    let (start, end) = cta_window_bounds(duration);

    let mut appearances: Vec<(f64, CtaAppearance)> = Vec::new();
    for entry in timeline.by_modality(Modality::TextOverlay) {
        let s = entry.start.seconds();
        if s < start || s > end {
            continue;
        }
        if let Payload::TextOverlay(p) = &entry.payload {
            let lexicon_hit = matches_any(&p.text, CTA_LEXICON);
            let is_cta_category = p.category == rumi_core::timeline::TextCategory::Cta;
            if is_cta_category || lexicon_hit {
                let score = if is_cta_category { 2.0 } else { 1.0 };
                appearances.push((score, CtaAppearance { time: s, text: p.text.clone(), matched_lexicon: lexicon_hit }));
            }
        }
    }
    let cta_appearances = top_k(appearances, k);

    let mut gesture_sync: HashMap<String, bool> = HashMap::new();
    for gesture in timeline.by_modality(Modality::Gesture) {
        let gs = gesture.start.seconds();
        let Payload::Gesture(p) = &gesture.payload else { continue };
        let synced = cta_appearances.iter().any(|c| (c.time - gs).abs() <= 0.5);
        let entry = gesture_sync.entry(p.label.clone()).or_insert(false);
        *entry = *entry || synced;
    }

    let mut objects: Vec<(f64, ObjectAppearance)> = Vec::new();
    let mut seen_classes = std::collections::HashSet::new();
    for entry in timeline.by_modality(Modality::Object) {
        let s = entry.start.seconds();
        if s < start || s > end {
            continue;
        }
        if let Payload::Object(p) = &entry.payload {
            let is_first = seen_classes.insert(p.class.clone());
            objects.push((p.confidence, ObjectAppearance { time: s, class: p.class.clone(), confidence: p.confidence, is_first_appearance: is_first }));
        }
    }
    let object_focus = top_k(objects, k);

    CtaWindow {
        time_range: rumi_core::markers::TimeRange { start, end },
        cta_appearances,
        gesture_sync,
        object_focus,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Utc;
    use rumi_core::timeline::{BoundingBox, SizeClass, TextCategory, TextOverlayPayload, TextPosition, VerticalPosition, HorizontalPosition};
    use rumi_core::video::Stats;
    use rumi_core::{Timeline, TimelineEntry, Timestamp, VideoMetadata};
    use std::collections::HashMap as StdHashMap;

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
    fn e3_overflow_markers_cap_density_and_size() {
        let mut timeline = Timeline::new();
        for i in 0..500 {
            let t = (i as f64 / 100.0).min(4.999);
            timeline.push(TimelineEntry {
                start: Timestamp::from_seconds(t).unwrap(),
                end: None,
                payload: Payload::TextOverlay(TextOverlayPayload {
                    text: format!("overlay {i}"),
                    bbox: BoundingBox { x: 0.0, y: 0.0, width: 0.1, height: 0.1 },
                    size_class: SizeClass::M,
                    position: TextPosition { vertical: VerticalPosition::Top, horizontal: HorizontalPosition::Left },
                    category: TextCategory::Other,
                }),
            });
        }
        timeline.sort();
        let ua = UnifiedAnalysis::new(meta(20.0), timeline, StdHashMap::new(), rumi_core::WarningCounters::new());
        let markers = extract(&ua);
        assert_eq!(markers.first_5_seconds.density_progression, [10, 10, 10, 10, 10]);
        assert!(markers.fits_hard_cap());
    }

    #[test]
    fn e1_minimal_video_density_progression() {
        let mut timeline = Timeline::new();
        timeline.push(TimelineEntry {
            start: Timestamp::from_seconds(1.0).unwrap(),
            end: Some(Timestamp::from_seconds(3.0).unwrap()),
            payload: Payload::Speech(rumi_core::timeline::SpeechPayload { text: "hello world".into(), language: "en".into(), confidence: 0.9, words: None }),
        });
        timeline.sort();
        let ua = UnifiedAnalysis::new(meta(10.0), timeline, StdHashMap::new(), rumi_core::WarningCounters::new());
        let markers = extract(&ua);
        // Speech entries do not count toward density_progression (only
        // text_overlay/sticker/scene_change/object/effect classes do per
        // §4.5's creative-density definition, which C4 reuses implicitly
        // through timeline membership); density_progression instead counts
        // every timeline entry starting in that second, so a speech start
        // at 1.0s contributes to bucket 1.
        assert_eq!(markers.first_5_seconds.density_progression, [0, 1, 0, 0, 0]);
    }
}
