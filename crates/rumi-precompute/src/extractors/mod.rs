//! The seven independent C5 feature extractors (§4.5).

pub mod creative_density;
pub mod emotional_journey;
pub mod metadata_analysis;
pub mod person_framing;
pub mod scene_pacing;
pub mod speech_analysis;
pub mod visual_overlay;

use rumi_core::{FeatureBundle, Timeline, VideoMetadata};

/// One entry per extractor, in the fixed order extractors run and results
/// are reported.
pub const ANALYSES: &[&str] = &[
    creative_density::NAME,
    emotional_journey::NAME,
    person_framing::NAME,
    scene_pacing::NAME,
    speech_analysis::NAME,
    visual_overlay::NAME,
    metadata_analysis::NAME,
];

pub fn run(name: &str, timeline: &Timeline, metadata: &VideoMetadata) -> FeatureBundle {
    match name {
        creative_density::NAME => creative_density::extract(timeline, metadata),
        emotional_journey::NAME => emotional_journey::extract(timeline, metadata),
        person_framing::NAME => person_framing::extract(timeline, metadata),
        scene_pacing::NAME => scene_pacing::extract(timeline, metadata),
        speech_analysis::NAME => speech_analysis::extract(timeline, metadata),
        visual_overlay::NAME => visual_overlay::extract(timeline, metadata),
        metadata_analysis::NAME => metadata_analysis::extract(timeline, metadata),
        other => FeatureBundle::fallback(other, "unknown analysis name", serde_json::json!({})),
    }
}
