//! Analysis 4: scene pacing (§4.5.4).

use std::panic::{catch_unwind, AssertUnwindSafe};

use rumi_core::timeline::Modality;
use rumi_core::{FeatureBundle, Timeline, VideoMetadata};
use serde_json::json;

use crate::stats;

pub const NAME: &str = "scene_pacing";
const WINDOW_SECS: f64 = 10.0;

pub fn extract(timeline: &Timeline, metadata: &VideoMetadata) -> FeatureBundle {
    let duration = metadata.duration_seconds;
    match catch_unwind(AssertUnwindSafe(|| compute(timeline, duration))) {
        Ok(metrics) => FeatureBundle::new(NAME, metrics),
        Err(_) => FeatureBundle::fallback(NAME, "scene pacing extraction panicked", json!({ "entry_count": timeline.len() })),
    }
}

fn compute(timeline: &Timeline, duration: f64) -> serde_json::Value {
    let mut shot_starts: Vec<f64> = timeline.by_modality(Modality::SceneChange).map(|e| e.start.seconds()).collect();
    shot_starts.sort_by(|a, b| a.partial_cmp(b).unwrap());

    let total_shots = shot_starts.len();
    if total_shots == 0 {
        return json!({
            "total_shots": 0,
            "avg_shot_duration": duration,
            "min_shot_duration": duration,
            "max_shot_duration": duration,
            "shot_duration_variance": 0.0,
            "shots_per_minute": 0.0,
            "pacing_classification": pacing_classification(duration),
            "rhythm_consistency": "consistent",
            "acceleration_score": 0.0,
            "pacing_curve": stats::windowed_counts(std::iter::empty::<f64>(), duration, WINDOW_SECS),
            "cut_density_zones": Vec::<usize>::new(),
            "montage_segments": Vec::<usize>::new(),
        });
    }

    let mut durations: Vec<f64> = shot_starts.windows(2).map(|w| w[1] - w[0]).collect();
    durations.push((duration - shot_starts[total_shots - 1]).max(0.0));

    let avg_shot_duration = stats::mean(&durations);
    let min_shot_duration = durations.iter().cloned().fold(f64::INFINITY, f64::min);
    let max_shot_duration = durations.iter().cloned().fold(f64::NEG_INFINITY, f64::max);
    let shot_duration_variance = stats::variance(&durations);
    let shots_per_minute = total_shots as f64 / (duration / 60.0).max(1e-9);

    let pacing_classification = pacing_classification(avg_shot_duration);
    let rhythm_consistency = if shot_duration_variance < 1.0 {
        "consistent"
    } else if shot_duration_variance < 4.0 {
        "moderate"
    } else {
        "erratic"
    };

    let cuts_per_window = stats::windowed_counts(shot_starts.iter().copied(), duration, WINDOW_SECS);
    let acceleration_score = stats::linear_slope(&cuts_per_window.iter().map(|c| *c as f64).collect::<Vec<_>>());

    let cut_mean = stats::mean_u32(&cuts_per_window);
    let cut_std = stats::stdev_u32(&cuts_per_window);
    let cut_density_zones: Vec<usize> = cuts_per_window
        .iter()
        .enumerate()
        .filter(|(_, c)| **c as f64 >= cut_mean + cut_std)
        .map(|(i, _)| i)
        .collect();

    let n_windows = cuts_per_window.len();
    let mut window_avg_shot: Vec<f64> = vec![0.0; n_windows];
    let mut window_shot_counts: Vec<u32> = vec![0; n_windows];
    for (start, dur) in shot_starts.iter().zip(durations.iter()) {
        let idx = ((*start / WINDOW_SECS) as usize).min(n_windows.saturating_sub(1));
        window_avg_shot[idx] += dur;
        window_shot_counts[idx] += 1;
    }
    for i in 0..n_windows {
        if window_shot_counts[i] > 0 {
            window_avg_shot[i] /= window_shot_counts[i] as f64;
        } else {
            window_avg_shot[i] = WINDOW_SECS;
        }
    }
    let montage_segments = contiguous_runs(&window_avg_shot, |v| v < 1.5);

    json!({
        "total_shots": total_shots,
        "avg_shot_duration": avg_shot_duration,
        "min_shot_duration": min_shot_duration,
        "max_shot_duration": max_shot_duration,
        "shot_duration_variance": shot_duration_variance,
        "shots_per_minute": shots_per_minute,
        "pacing_classification": pacing_classification,
        "rhythm_consistency": rhythm_consistency,
        "acceleration_score": acceleration_score,
        "pacing_curve": cuts_per_window,
        "cut_density_zones": cut_density_zones,
        "montage_segments": montage_segments,
    })
}

fn pacing_classification(avg_shot_duration: f64) -> &'static str {
    if avg_shot_duration < 2.0 {
        "rapid"
    } else if avg_shot_duration < 4.0 {
        "fast"
    } else if avg_shot_duration < 8.0 {
        "moderate"
    } else {
        "slow"
    }
}

/// Contiguous `[start_window, end_window)` ranges where `pred` holds.
fn contiguous_runs(values: &[f64], pred: impl Fn(f64) -> bool) -> Vec<(usize, usize)> {
    let mut runs = Vec::new();
    let mut start: Option<usize> = None;
    for (i, v) in values.iter().enumerate() {
        if pred(*v) {
            if start.is_none() {
                start = Some(i);
            }
        } else if let Some(s) = start.take() {
            runs.push((s, i));
        }
    }
    if let Some(s) = start {
        runs.push((s, values.len()));
    }
    runs
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Utc;
    use rumi_core::timeline::{SceneChangeKind, SceneChangePayload};
    use rumi_core::video::Stats;
    use rumi_core::{Payload, TimelineEntry, Timestamp};

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
    fn no_shots_reports_full_duration_as_single_shot() {
        let bundle = extract(&Timeline::new(), &meta(10.0));
        assert_eq!(bundle.metrics["total_shots"], 0);
        assert_eq!(bundle.metrics["avg_shot_duration"], 10.0);
    }

    #[test]
    fn rapid_pacing_from_frequent_cuts() {
        let mut timeline = Timeline::new();
        for i in 0..10 {
            timeline.push(TimelineEntry {
                start: Timestamp::from_seconds(i as f64).unwrap(),
                end: None,
                payload: Payload::SceneChange(SceneChangePayload { kind: SceneChangeKind::Cut, shot_id: i.to_string() }),
            });
        }
        timeline.sort();
        let bundle = extract(&timeline, &meta(10.0));
        assert_eq!(bundle.metrics["total_shots"], 10);
        assert_eq!(bundle.metrics["pacing_classification"], "rapid");
    }
}
