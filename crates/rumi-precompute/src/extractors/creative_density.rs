//! Analysis 1: creative density (§4.5.1).

use std::panic::{catch_unwind, AssertUnwindSafe};

use rumi_core::timeline::Modality;
use rumi_core::{FeatureBundle, Timeline, VideoMetadata};
use serde_json::json;

use crate::stats;

pub const NAME: &str = "creative_density";

const DENSITY_MODALITIES: [Modality; 4] = [Modality::TextOverlay, Modality::Sticker, Modality::SceneChange, Modality::Object];

pub fn extract(timeline: &Timeline, metadata: &VideoMetadata) -> FeatureBundle {
    let duration = metadata.duration_seconds;
    match catch_unwind(AssertUnwindSafe(|| compute(timeline, duration))) {
        Ok(metrics) => FeatureBundle::new(NAME, metrics),
        Err(_) => FeatureBundle::fallback(NAME, "creative density extraction panicked", json!({ "entry_count": timeline.len() })),
    }
}

fn compute(timeline: &Timeline, duration: f64) -> serde_json::Value {
    let n_seconds = duration.ceil().max(1.0) as usize;
    let mut per_second_modalities: Vec<Vec<Modality>> = vec![Vec::new(); n_seconds];

    for entry in timeline.entries() {
        let m = entry.modality();
        if !DENSITY_MODALITIES.contains(&m) {
            continue;
        }
        let idx = (entry.start.seconds() as usize).min(n_seconds.saturating_sub(1));
        per_second_modalities[idx].push(m);
    }

    let counts: Vec<u32> = per_second_modalities.iter().map(|v| v.len() as u32).collect();
    let counts_f: Vec<f64> = counts.iter().map(|c| *c as f64).collect();

    let avg = stats::mean(&counts_f);
    let max = counts.iter().copied().max().unwrap_or(0);
    let min = counts.iter().copied().min().unwrap_or(0);
    let std = stats::stdev(&counts_f);
    let volatility = if avg > 0.0 { std / avg } else { 0.0 };

    let density_curve: Vec<Option<String>> = per_second_modalities
        .iter()
        .map(|mods| dominant_modality(mods).map(|m| format!("{m:?}")))
        .collect();

    let empty_seconds = counts.iter().filter(|c| **c == 0).count();
    let total_events: u32 = counts.iter().sum();
    let elements_per_sec = total_events as f64 / duration.max(1e-9);

    let density_classification = if elements_per_sec < 0.5 {
        "minimal"
    } else if elements_per_sec <= 1.5 {
        "medium"
    } else {
        "heavy"
    };

    let multi_modal_peaks = per_second_modalities
        .iter()
        .filter(|mods| {
            let unique: std::collections::HashSet<Modality> = mods.iter().copied().collect();
            unique.len() >= 3
        })
        .count();

    let acceleration_pattern = acceleration_pattern(&counts);
    let structural_patterns = structural_patterns(&counts);

    json!({
        "avg": avg,
        "max": max,
        "min": min,
        "std": std,
        "volatility": volatility,
        "density_curve": density_curve,
        "acceleration_pattern": acceleration_pattern,
        "multi_modal_peaks": multi_modal_peaks,
        "empty_seconds": empty_seconds,
        "density_classification": density_classification,
        "structural_patterns": structural_patterns,
    })
}

fn dominant_modality(mods: &[Modality]) -> Option<Modality> {
    if mods.is_empty() {
        return None;
    }
    let mut counts: std::collections::HashMap<Modality, u32> = std::collections::HashMap::new();
    for m in mods {
        *counts.entry(*m).or_insert(0) += 1;
    }
    counts
        .into_iter()
        .max_by(|a, b| a.1.cmp(&b.1).then(b.0.fixed_order().cmp(&a.0.fixed_order())))
        .map(|(m, _)| m)
}

fn acceleration_pattern(counts: &[u32]) -> &'static str {
    let n = counts.len();
    if n < 3 {
        return "even";
    }
    let third = (n as f64 / 3.0).ceil() as usize;
    let first: u32 = counts[..third.min(n)].iter().sum();
    let last: u32 = counts[n.saturating_sub(third)..].iter().sum();
    let mid_start = third.min(n);
    let mid_end = n.saturating_sub(third).max(mid_start);
    let mid: u32 = counts[mid_start..mid_end].iter().sum();

    let first_f = first as f64;
    let mid_f = mid as f64;
    let last_f = last as f64;

    if mid_f > first_f * 1.2 && mid_f > last_f * 1.2 {
        "oscillating"
    } else if first_f > last_f * 1.2 {
        "front_loaded"
    } else if last_f > first_f * 1.2 {
        "back_loaded"
    } else {
        "even"
    }
}

fn structural_patterns(counts: &[u32]) -> serde_json::Value {
    let strong_opening_hook = counts.iter().take(2).sum::<u32>() >= 4;

    let mut crescendo = false;
    let mut run = 1;
    for w in counts.windows(2) {
        if w[1] >= w[0] {
            run += 1;
            if run >= 5 {
                crescendo = true;
                break;
            }
        } else {
            run = 1;
        }
    }

    let total: u32 = counts.iter().sum();
    let third = (counts.len() as f64 / 3.0).ceil() as usize;
    let first_third: u32 = counts[..third.min(counts.len())].iter().sum();
    let front_loaded = total > 0 && (first_third as f64 / total as f64) >= 0.5;

    json!({
        "strong_opening_hook": strong_opening_hook,
        "crescendo": crescendo,
        "front_loaded": front_loaded,
    })
}
