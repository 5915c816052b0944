//! Analysis 3: person framing (§4.5.3).
//!
//! The data model has no standalone "face" modality: face presence is
//! inferred from `expression` entries (the human analyzer's face/expression
//! fields share a detection), and person presence from `object` entries
//! with `class == "person"`.

use std::panic::{catch_unwind, AssertUnwindSafe};

use rumi_core::timeline::Modality;
use rumi_core::{FeatureBundle, Payload, Timeline, VideoMetadata};
use serde_json::json;

use crate::stats;

pub const NAME: &str = "person_framing";

#[derive(Clone, Copy, PartialEq, Debug)]
enum ShotType {
    Close,
    Medium,
    Far,
}

impl ShotType {
    fn from_area(area: f64) -> Self {
        if area > 0.35 {
            ShotType::Close
        } else if area >= 0.1 {
            ShotType::Medium
        } else {
            ShotType::Far
        }
    }

    fn label(self) -> &'static str {
        match self {
            ShotType::Close => "close",
            ShotType::Medium => "medium",
            ShotType::Far => "far",
        }
    }
}

pub fn extract(timeline: &Timeline, metadata: &VideoMetadata) -> FeatureBundle {
    let duration = metadata.duration_seconds;
    match catch_unwind(AssertUnwindSafe(|| compute(timeline, duration))) {
        Ok(metrics) => FeatureBundle::new(NAME, metrics),
        Err(_) => FeatureBundle::fallback(NAME, "person framing extraction panicked", json!({ "entry_count": timeline.len() })),
    }
}

fn compute(timeline: &Timeline, duration: f64) -> serde_json::Value {
    let n_seconds = duration.ceil().max(1.0) as usize;

    let mut face_seconds = vec![false; n_seconds];
    for e in timeline.by_modality(Modality::Expression) {
        let idx = (e.start.seconds() as usize).min(n_seconds.saturating_sub(1));
        face_seconds[idx] = true;
    }

    let mut person_seconds = vec![false; n_seconds];
    let mut shot_types: Vec<(f64, ShotType)> = Vec::new();
    for e in timeline.by_modality(Modality::Object) {
        let Payload::Object(p) = &e.payload else { continue };
        if p.class != "person" {
            continue;
        }
        let idx = (e.start.seconds() as usize).min(n_seconds.saturating_sub(1));
        person_seconds[idx] = true;
        if let Some(bbox) = p.bbox {
            shot_types.push((e.start.seconds(), ShotType::from_area(bbox.area())));
        }
    }

    let face_screen_time_ratio = face_seconds.iter().filter(|v| **v).count() as f64 / n_seconds as f64;
    let person_screen_time_ratio = person_seconds.iter().filter(|v| **v).count() as f64 / n_seconds as f64;

    let mut close = 0u32;
    let mut medium = 0u32;
    let mut far = 0u32;
    for (_, st) in &shot_types {
        match st {
            ShotType::Close => close += 1,
            ShotType::Medium => medium += 1,
            ShotType::Far => far += 1,
        }
    }
    let shot_total = shot_types.len().max(1) as f64;
    let shot_type_distribution = json!({
        "close": close as f64 / shot_total,
        "medium": medium as f64 / shot_total,
        "far": far as f64 / shot_total,
    });

    let transitions = shot_types.windows(2).filter(|w| w[0].1 != w[1].1).count();
    let framing_volatility = transitions as f64 / duration.max(1e-9);

    let present: Vec<bool> = (0..n_seconds).map(|i| face_seconds[i] || person_seconds[i]).collect();
    let (subject_absence_count, longest_absence_duration) = absence_runs(&present);

    // No gaze signal exists in the data model; bucketed from the variance
    // of pose detection confidence as the nearest available proxy.
    let pose_confidences: Vec<f64> = timeline
        .by_modality(Modality::Pose)
        .filter_map(|e| match &e.payload {
            Payload::Pose(p) => Some(p.confidence),
            _ => None,
        })
        .collect();
    let gaze_variance = stats::variance(&pose_confidences);
    let gaze_steadiness = if gaze_variance < 0.01 {
        "steady"
    } else if gaze_variance < 0.05 {
        "moderate"
    } else {
        "unsteady"
    };

    let temporal_evolution = temporal_evolution(&shot_types);

    json!({
        "face_screen_time_ratio": face_screen_time_ratio,
        "person_screen_time_ratio": person_screen_time_ratio,
        "shot_type_distribution": shot_type_distribution,
        "framing_volatility": framing_volatility,
        "subject_absence_count": subject_absence_count,
        "longest_absence_duration": longest_absence_duration,
        "gaze_steadiness": gaze_steadiness,
        "temporal_evolution": temporal_evolution,
    })
}

fn absence_runs(present: &[bool]) -> (u32, f64) {
    let mut count = 0u32;
    let mut longest = 0u32;
    let mut current = 0u32;
    for p in present {
        if *p {
            if current > 0 {
                count += 1;
            }
            longest = longest.max(current);
            current = 0;
        } else {
            current += 1;
        }
    }
    if current > 0 {
        count += 1;
    }
    longest = longest.max(current);
    (count, longest as f64)
}

const NEAR_FAR: f64 = 0.3;
const NEAR_CLOSE: f64 = 1.7;
const STABLE_DELTA: f64 = 0.3;

fn temporal_evolution(shot_types: &[(f64, ShotType)]) -> &'static str {
    if shot_types.len() < 2 {
        return "consistent_approach";
    }
    let third = (shot_types.len() as f64 / 3.0).ceil() as usize;
    let third = third.min(shot_types.len());
    let first_third = &shot_types[..third];
    let last_third = &shot_types[shot_types.len().saturating_sub(third)..];
    let middle_third = &shot_types[third..shot_types.len().saturating_sub(third)];

    let closeness = |st: ShotType| match st {
        ShotType::Close => 2,
        ShotType::Medium => 1,
        ShotType::Far => 0,
    };
    let avg = |s: &[(f64, ShotType)]| stats::mean(&s.iter().map(|(_, st)| closeness(*st) as f64).collect::<Vec<_>>());
    let first_avg = avg(first_third);
    let last_avg = avg(last_third);

    if first_avg <= NEAR_FAR && last_avg >= NEAR_CLOSE {
        return "product_to_person";
    }
    if first_avg >= NEAR_CLOSE && last_avg <= NEAR_FAR {
        return "person_to_product";
    }
    if !middle_third.is_empty() {
        let mid_avg = avg(middle_third);
        let ends_agree = (first_avg - last_avg).abs() < STABLE_DELTA;
        let middle_diverges = (mid_avg - first_avg).abs() >= STABLE_DELTA && (mid_avg - last_avg).abs() >= STABLE_DELTA;
        if ends_agree && middle_diverges {
            return "bookend_pattern";
        }
    }

    if (first_avg - last_avg).abs() < STABLE_DELTA {
        "consistent_approach"
    } else if last_avg > first_avg {
        "increasing_intimacy"
    } else {
        "decreasing_intimacy"
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
    fn shot_type_thresholds() {
        assert_eq!(ShotType::from_area(0.4), ShotType::Close);
        assert_eq!(ShotType::from_area(0.2), ShotType::Medium);
        assert_eq!(ShotType::from_area(0.05), ShotType::Far);
    }

    #[test]
    fn empty_timeline_reports_zero_ratios() {
        let bundle = extract(&Timeline::new(), &meta(10.0));
        assert_eq!(bundle.metrics["face_screen_time_ratio"], 0.0);
        assert_eq!(bundle.metrics["person_screen_time_ratio"], 0.0);
    }

    fn shots(n: usize, st: ShotType) -> Vec<(f64, ShotType)> {
        (0..n).map(|i| (i as f64, st)).collect()
    }

    #[test]
    fn temporal_evolution_consistent_approach() {
        let v = shots(9, ShotType::Medium);
        assert_eq!(temporal_evolution(&v), "consistent_approach");
    }

    #[test]
    fn temporal_evolution_increasing_intimacy() {
        let mut v = shots(3, ShotType::Medium);
        v.extend(shots(3, ShotType::Medium));
        v.extend(shots(3, ShotType::Close));
        assert_eq!(temporal_evolution(&v), "increasing_intimacy");
    }

    #[test]
    fn temporal_evolution_decreasing_intimacy() {
        let mut v = shots(3, ShotType::Close);
        v.extend(shots(3, ShotType::Medium));
        v.extend(shots(3, ShotType::Medium));
        assert_eq!(temporal_evolution(&v), "decreasing_intimacy");
    }

    #[test]
    fn temporal_evolution_product_to_person() {
        let mut v = shots(3, ShotType::Far);
        v.extend(shots(3, ShotType::Medium));
        v.extend(shots(3, ShotType::Close));
        assert_eq!(temporal_evolution(&v), "product_to_person");
    }

    #[test]
    fn temporal_evolution_person_to_product() {
        let mut v = shots(3, ShotType::Close);
        v.extend(shots(3, ShotType::Medium));
        v.extend(shots(3, ShotType::Far));
        assert_eq!(temporal_evolution(&v), "person_to_product");
    }

    #[test]
    fn temporal_evolution_bookend_pattern() {
        let mut v = shots(3, ShotType::Medium);
        v.extend(shots(3, ShotType::Close));
        v.extend(shots(3, ShotType::Medium));
        assert_eq!(temporal_evolution(&v), "bookend_pattern");
    }
}
