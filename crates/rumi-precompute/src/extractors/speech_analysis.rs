//! Analysis 5: speech analysis (§4.5.5).

use std::panic::{catch_unwind, AssertUnwindSafe};

use rumi_core::lexicons::{matches_any, CTA_LEXICON, FILLER_LEXICON, HOOK_LEXICON};
use rumi_core::timeline::Modality;
use rumi_core::{FeatureBundle, Payload, Timeline, VideoMetadata};
use serde_json::json;

use crate::stats;

pub const NAME: &str = "speech_analysis";
const WINDOW_SECS: f64 = 10.0;

struct SpeechSpan {
    start: f64,
    end: f64,
    text: String,
    words: Option<Vec<rumi_core::timeline::Word>>,
}

pub fn extract(timeline: &Timeline, metadata: &VideoMetadata) -> FeatureBundle {
    let duration = metadata.duration_seconds;
    match catch_unwind(AssertUnwindSafe(|| compute(timeline, duration))) {
        Ok(metrics) => FeatureBundle::new(NAME, metrics),
        Err(_) => FeatureBundle::fallback(NAME, "speech analysis extraction panicked", json!({ "entry_count": timeline.len() })),
    }
}

fn compute(timeline: &Timeline, duration: f64) -> serde_json::Value {
    let spans: Vec<SpeechSpan> = timeline
        .by_modality(Modality::Speech)
        .filter_map(|e| match &e.payload {
            Payload::Speech(p) => Some(SpeechSpan {
                start: e.start.seconds(),
                end: e.end.map(|t| t.seconds()).unwrap_or(e.start.seconds()),
                text: p.text.clone(),
                words: p.words.clone(),
            }),
            _ => None,
        })
        .collect();

    let word_count: usize = spans.iter().map(|s| s.text.split_whitespace().count()).sum();
    let speech_seconds: f64 = spans.iter().map(|s| (s.end - s.start).max(0.0)).sum();
    let speech_density = if speech_seconds > 0.0 { word_count as f64 / speech_seconds } else { 0.0 };
    let speech_coverage = speech_seconds / duration.max(1e-9);
    let speech_rate_wpm = speech_density * 60.0;

    let n_windows = (duration / WINDOW_SECS).ceil().max(1.0) as usize;
    let mut window_words = vec![0u32; n_windows];
    let mut window_seconds = vec![0.0f64; n_windows];
    for s in &spans {
        let idx = ((s.start / WINDOW_SECS) as usize).min(n_windows.saturating_sub(1));
        window_words[idx] += s.text.split_whitespace().count() as u32;
        window_seconds[idx] += (s.end - s.start).max(0.0);
    }
    let wpm_by_segment: Vec<f64> = window_words
        .iter()
        .zip(window_seconds.iter())
        .map(|(w, secs)| if *secs > 0.0 { *w as f64 / secs * 60.0 } else { 0.0 })
        .collect();

    let pause_analysis = pause_analysis(&spans);

    let all_text = spans.iter().map(|s| s.text.as_str()).collect::<Vec<_>>().join(" ");
    let filler_count = FILLER_LEXICON.iter().filter(|f| matches_any(&all_text, &[**f])).count();
    let total_words = word_count.max(1);
    let filler_word_ratio = filler_count as f64 / total_words as f64;

    let hook_phrases: Vec<String> = spans
        .iter()
        .filter(|s| s.start < 10.0)
        .flat_map(|s| HOOK_LEXICON.iter().filter(|h| matches_any(&s.text, &[**h])).map(|h| h.to_string()))
        .collect();

    let cta_threshold = duration * 0.7;
    let cta_phrases: Vec<String> = spans
        .iter()
        .filter(|s| s.start >= cta_threshold)
        .flat_map(|s| CTA_LEXICON.iter().filter(|c| matches_any(&s.text, &[**c])).map(|c| c.to_string()))
        .collect();

    let repetition_patterns = repetition_patterns(&all_text);

    let wpm_mean = stats::mean(&wpm_by_segment);
    let wpm_std = stats::stdev(&wpm_by_segment);
    let speech_bursts: Vec<usize> = wpm_by_segment.iter().enumerate().filter(|(_, w)| **w >= wpm_mean + wpm_std).map(|(i, _)| i).collect();

    let max_wpm = wpm_by_segment.iter().cloned().fold(0.0_f64, f64::max).max(1.0);
    let energy_level_windows: Vec<f64> = wpm_by_segment.iter().map(|w| w / max_wpm).collect();

    let gesture_times: Vec<f64> = timeline.by_modality(Modality::Gesture).map(|e| e.start.seconds()).collect();
    let stressed_words: Vec<f64> = spans
        .iter()
        .filter_map(|s| s.words.as_ref())
        .flatten()
        .filter(|w| w.confidence >= 0.8)
        .map(|w| w.start)
        .collect();
    let gesture_sync_ratio = if stressed_words.is_empty() {
        0.0
    } else {
        stressed_words.iter().filter(|t| gesture_times.iter().any(|g| (g - *t).abs() <= 0.3)).count() as f64 / stressed_words.len() as f64
    };

    json!({
        "word_count": word_count,
        "speech_density": speech_density,
        "speech_coverage": speech_coverage,
        "speech_rate_wpm": speech_rate_wpm,
        "wpm_by_segment": wpm_by_segment,
        "pause_analysis": pause_analysis,
        "filler_word_ratio": filler_word_ratio,
        "hook_phrases": hook_phrases,
        "cta_phrases": cta_phrases,
        "repetition_patterns": repetition_patterns,
        "speech_bursts": speech_bursts,
        "energy_level_windows": energy_level_windows,
        "gesture_sync_ratio": gesture_sync_ratio,
    })
}

fn pause_analysis(spans: &[SpeechSpan]) -> serde_json::Value {
    let mut sorted: Vec<&SpeechSpan> = spans.iter().collect();
    sorted.sort_by(|a, b| a.start.partial_cmp(&b.start).unwrap());

    let mut dramatic = 0u32;
    let mut strategic = 0u32;
    let mut breath = 0u32;
    for w in sorted.windows(2) {
        let gap = w[1].start - w[0].end;
        if gap > 2.0 {
            dramatic += 1;
        } else if gap >= 1.0 {
            strategic += 1;
        } else if gap >= 0.5 {
            breath += 1;
        }
    }
    json!({ "dramatic": dramatic, "strategic": strategic, "breath": breath })
}

/// Phrases of 2-5 words repeated at least twice in `text`.
fn repetition_patterns(text: &str) -> Vec<String> {
    let words: Vec<&str> = text.split_whitespace().collect();
    let mut counts = std::collections::HashMap::new();
    for n in 2..=5 {
        if words.len() < n {
            continue;
        }
        for window in words.windows(n) {
            let phrase = window.join(" ").to_lowercase();
            *counts.entry(phrase).or_insert(0) += 1;
        }
    }
    counts.into_iter().filter(|(_, c)| *c >= 2).map(|(p, _)| p).collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Utc;
    use rumi_core::video::Stats;
    use rumi_core::{SpeechPayload, TimelineEntry, Timestamp};

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
    fn e1_minimal_video_speech_metrics() {
        let mut timeline = Timeline::new();
        timeline.push(TimelineEntry {
            start: Timestamp::from_seconds(1.0).unwrap(),
            end: Some(Timestamp::from_seconds(3.0).unwrap()),
            payload: Payload::Speech(SpeechPayload { text: "hello world".into(), language: "en".into(), confidence: 0.9, words: None }),
        });
        timeline.sort();
        let bundle = extract(&timeline, &meta(10.0));
        assert_eq!(bundle.metrics["word_count"], 2);
        assert_eq!(bundle.metrics["speech_coverage"], 0.2);
    }
}
