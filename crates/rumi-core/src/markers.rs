//! `TemporalMarkers`: the bounded early/late-video summary handed to the
//! LLM orchestrator (§3, §4.4).

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Hard cap on serialized `TemporalMarkers` size.
pub const HARD_CAP_BYTES: usize = 180 * 1024;
/// Soft target; extraction keeps trying to shrink below this before
/// settling.
pub const SOFT_TARGET_BYTES: usize = 100 * 1024;

#[derive(Debug, Clone, Serialize, Deserialize, schemars::JsonSchema)]
pub struct TextMoment {
    pub time: f64,
    pub text: String,
    pub size_class: String,
    pub confidence: f64,
}

#[derive(Debug, Clone, Serialize, Deserialize, schemars::JsonSchema)]
pub struct GestureMoment {
    pub time: f64,
    pub label: String,
    pub confidence: f64,
}

#[derive(Debug, Clone, Serialize, Deserialize, schemars::JsonSchema)]
pub struct ObjectAppearance {
    pub time: f64,
    pub class: String,
    pub confidence: f64,
    pub is_first_appearance: bool,
}

#[derive(Debug, Clone, Serialize, Deserialize, schemars::JsonSchema)]
pub struct FirstFiveSeconds {
    /// Per-second event count for seconds `[0,5)`, capped at 10. Always
    /// length 5 (testable property 3).
    pub density_progression: [u32; 5],
    pub text_moments: Vec<TextMoment>,
    /// Dominant emotion per second, always length 5.
    pub emotion_sequence: [String; 5],
    pub gesture_moments: Vec<GestureMoment>,
    pub object_appearances: Vec<ObjectAppearance>,
}

impl FirstFiveSeconds {
    pub fn empty() -> Self {
        Self {
            density_progression: [0; 5],
            text_moments: Vec::new(),
            emotion_sequence: std::array::from_fn(|_| "neutral".to_string()),
            gesture_moments: Vec::new(),
            object_appearances: Vec::new(),
        }
    }
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, schemars::JsonSchema)]
pub struct TimeRange {
    pub start: f64,
    pub end: f64,
}

#[derive(Debug, Clone, Serialize, Deserialize, schemars::JsonSchema)]
pub struct CtaAppearance {
    pub time: f64,
    pub text: String,
    pub matched_lexicon: bool,
}

#[derive(Debug, Clone, Serialize, Deserialize, schemars::JsonSchema)]
pub struct CtaWindow {
    pub time_range: TimeRange,
    pub cta_appearances: Vec<CtaAppearance>,
    /// Per-gesture-label flag: did a gesture with this label fall within
    /// ±0.5s of a CTA appearance.
    pub gesture_sync: std::collections::HashMap<String, bool>,
    /// Object classes seen within the CTA window, by descending confidence.
    pub object_focus: Vec<ObjectAppearance>,
}

impl CtaWindow {
    pub fn empty(duration: f64) -> Self {
        let (start, end) = cta_window_bounds(duration);
        Self {
            time_range: TimeRange { start, end },
            cta_appearances: Vec::new(),
            gesture_sync: std::collections::HashMap::new(),
            object_focus: Vec::new(),
        }
    }
}

/// `[max(0, duration*0.85), duration]`, widened to at least 3s and capped at
/// 15s (§4.4 step 3).
pub fn cta_window_bounds(duration: f64) -> (f64, f64) {
    let raw_start = (duration * 0.85).max(0.0);
    let mut start = raw_start;
    let width = duration - start;
    if width < 3.0 {
        start = (duration - 3.0).max(0.0);
    } else if width > 15.0 {
        start = duration - 15.0;
    }
    (start, duration)
}

#[derive(Debug, Clone, Serialize, Deserialize, schemars::JsonSchema)]
pub struct MarkersMetadata {
    pub video_id: String,
    pub duration: f64,
    pub generated_at: DateTime<Utc>,
}

/// Bounded structure: hard cap 180KB serialized, soft target 100KB.
#[derive(Debug, Clone, Serialize, Deserialize, schemars::JsonSchema)]
pub struct TemporalMarkers {
    pub first_5_seconds: FirstFiveSeconds,
    pub cta_window: CtaWindow,
    pub metadata: MarkersMetadata,
}

impl TemporalMarkers {
    /// The canonical empty-but-valid structure emitted on any extraction
    /// failure or persistent size overflow (§4.4 step 4).
    pub fn empty(video_id: impl Into<String>, duration: f64) -> Self {
        Self {
            first_5_seconds: FirstFiveSeconds::empty(),
            cta_window: CtaWindow::empty(duration),
            metadata: MarkersMetadata {
                video_id: video_id.into(),
                duration,
                generated_at: Utc::now(),
            },
        }
    }

    /// Compact JSON size in bytes, used against [`HARD_CAP_BYTES`] and
    /// [`SOFT_TARGET_BYTES`].
    pub fn serialized_size(&self) -> usize {
        serde_json::to_vec(self).map(|v| v.len()).unwrap_or(usize::MAX)
    }

    pub fn fits_hard_cap(&self) -> bool {
        self.serialized_size() <= HARD_CAP_BYTES
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn cta_window_widens_short_tail() {
        // duration 10: raw start = 8.5, width 1.5 < 3 -> start = 7.0
        let (start, end) = cta_window_bounds(10.0);
        assert_eq!(start, 7.0);
        assert_eq!(end, 10.0);
    }

    #[test]
    fn cta_window_caps_long_tail() {
        // duration 200: raw start = 170, width 30 > 15 -> start = 185
        let (start, end) = cta_window_bounds(200.0);
        assert_eq!(start, 185.0);
        assert_eq!(end, 200.0);
    }

    #[test]
    fn cta_window_normal_case() {
        // duration 60: raw start = 51, width 9, within [3,15]
        let (start, end) = cta_window_bounds(60.0);
        assert_eq!(start, 51.0);
        assert_eq!(end, 60.0);
    }

    #[test]
    fn empty_structure_has_five_length_arrays() {
        let m = TemporalMarkers::empty("v1", 10.0);
        assert_eq!(m.first_5_seconds.density_progression.len(), 5);
        assert_eq!(m.first_5_seconds.emotion_sequence.len(), 5);
        assert!(m.fits_hard_cap());
    }
}
