//! Analysis 2: emotional journey (§4.5.2).

use std::panic::{catch_unwind, AssertUnwindSafe};

use rumi_core::timeline::Modality;
use rumi_core::{FeatureBundle, Payload, Timeline, VideoMetadata};
use serde_json::json;

use crate::stats;

pub const NAME: &str = "emotional_journey";
const WINDOW_SECS: f64 = 5.0;

struct ExpressionPoint {
    time: f64,
    emotion: String,
    valence: f64,
    intensity: f64,
}

pub fn extract(timeline: &Timeline, metadata: &VideoMetadata) -> FeatureBundle {
    let duration = metadata.duration_seconds;
    match catch_unwind(AssertUnwindSafe(|| compute(timeline, duration))) {
        Ok(metrics) => FeatureBundle::new(NAME, metrics),
        Err(_) => FeatureBundle::fallback(NAME, "emotional journey extraction panicked", json!({ "entry_count": timeline.len() })),
    }
}

fn compute(timeline: &Timeline, duration: f64) -> serde_json::Value {
    let points: Vec<ExpressionPoint> = timeline
        .by_modality(Modality::Expression)
        .filter_map(|e| match &e.payload {
            Payload::Expression(p) => Some(ExpressionPoint { time: e.start.seconds(), emotion: p.emotion.clone(), valence: p.valence, intensity: p.intensity }),
            _ => None,
        })
        .collect();

    let n_windows = (duration / WINDOW_SECS).ceil().max(1.0) as usize;
    let mut window_points: Vec<Vec<&ExpressionPoint>> = vec![Vec::new(); n_windows];
    for p in &points {
        let idx = ((p.time / WINDOW_SECS) as usize).min(n_windows.saturating_sub(1));
        window_points[idx].push(p);
    }

    let emotion_sequence: Vec<String> = window_points.iter().map(|w| dominant_emotion(w)).collect();
    let valence_curve: Vec<f64> = window_points
        .iter()
        .map(|w| stats::mean(&w.iter().map(|p| p.valence).collect::<Vec<_>>()))
        .collect();

    let emotion_variability = stats::stdev(&valence_curve);

    let transitions = emotion_sequence.windows(2).filter(|w| w[0] != w[1]).count();
    let emotion_change_rate = if n_windows > 0 { transitions as f64 / n_windows as f64 } else { 0.0 };

    let total = points.len().max(1);
    let positive = points.iter().filter(|p| p.valence > 0.2).count();
    let negative = points.iter().filter(|p| p.valence < -0.2).count();
    let neutral = total - positive - negative;

    let mut scored: Vec<(f64, &ExpressionPoint)> = points.iter().map(|p| (p.valence.abs(), p)).collect();
    scored.sort_by(|a, b| b.0.partial_cmp(&a.0).unwrap_or(std::cmp::Ordering::Equal));
    let emotional_peaks: Vec<serde_json::Value> = scored.iter().take(5).map(|(_, p)| json!({ "time": p.time, "valence": p.valence, "emotion": p.emotion })).collect();

    let transition_matrix_counts = stats::transition_counts(&emotion_sequence);
    let emotion_transition_matrix: serde_json::Map<String, serde_json::Value> = transition_matrix_counts
        .into_iter()
        .map(|((from, to), count)| (format!("{from}->{to}"), json!(count)))
        .collect();

    let peak_times: Vec<f64> = scored.iter().take(5).map(|(_, p)| p.time).collect();
    let peak_rhythm = peak_rhythm(peak_times);

    let gesture_times: Vec<f64> = timeline
        .by_modality(Modality::Gesture)
        .map(|e| e.start.seconds())
        .collect();
    let aligned = scored
        .iter()
        .take(5)
        .filter(|(_, p)| gesture_times.iter().any(|g| (g - p.time).abs() <= 1.0))
        .count();
    let emotion_gesture_alignment = if scored.is_empty() { 0.0 } else { aligned as f64 / scored.len().min(5) as f64 };

    let emotional_trajectory = trajectory(&valence_curve);

    json!({
        "emotion_sequence": emotion_sequence,
        "emotion_variability": emotion_variability,
        "emotion_change_rate": emotion_change_rate,
        "positive_ratio": positive as f64 / total as f64,
        "negative_ratio": negative as f64 / total as f64,
        "neutral_ratio": neutral as f64 / total as f64,
        "emotion_valence_curve": valence_curve,
        "emotional_peaks": emotional_peaks,
        "emotion_transition_matrix": emotion_transition_matrix,
        "peak_rhythm": peak_rhythm,
        "emotion_gesture_alignment": emotion_gesture_alignment,
        "emotional_trajectory": emotional_trajectory,
    })
}

fn dominant_emotion(points: &[&ExpressionPoint]) -> String {
    if points.is_empty() {
        return "neutral".to_string();
    }
    points
        .iter()
        .max_by(|a, b| a.intensity.partial_cmp(&b.intensity).unwrap_or(std::cmp::Ordering::Equal))
        .map(|p| p.emotion.clone())
        .unwrap_or_else(|| "neutral".to_string())
}

fn peak_rhythm(mut times: Vec<f64>) -> serde_json::Value {
    times.sort_by(|a, b| a.partial_cmp(b).unwrap());
    let intervals = stats::inter_event_intervals(times);
    let mean = stats::mean(&intervals);
    let variance = stats::variance(&intervals);
    let regularity = if mean > 0.0 { 1.0 / (1.0 + variance / mean) } else { 0.0 };
    json!({ "mean": mean, "variance": variance, "regularity": regularity })
}

fn trajectory(curve: &[f64]) -> &'static str {
    if curve.len() < 2 {
        return "flat";
    }
    let slope = stats::linear_slope(curve);
    let n = curve.len();
    let first = curve[0];
    let mid = curve[n / 2];
    let last = curve[n - 1];

    if mid < first - 0.1 && mid < last - 0.1 {
        return "u-shaped";
    }
    if slope > 0.05 {
        "ascending"
    } else if slope < -0.05 {
        "descending"
    } else {
        "flat"
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
    fn empty_timeline_yields_flat_trajectory() {
        let bundle = extract(&Timeline::new(), &meta(10.0));
        assert_eq!(bundle.metrics["emotional_trajectory"], "flat");
    }
}
