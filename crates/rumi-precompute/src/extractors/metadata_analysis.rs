//! Analysis 7: metadata analysis (§4.5.7).

use std::panic::{catch_unwind, AssertUnwindSafe};

use chrono::{Datelike, Timelike};
use rumi_core::lexicons::urgency_level;
use rumi_core::{FeatureBundle, Timeline, VideoMetadata};
use serde_json::json;

pub const NAME: &str = "metadata_analysis";

const VIRAL_WEIGHT_ENGAGEMENT: f64 = 0.5;
const VIRAL_WEIGHT_HOOK: f64 = 0.3;
const VIRAL_WEIGHT_HASHTAG: f64 = 0.2;

pub fn extract(timeline: &Timeline, metadata: &VideoMetadata) -> FeatureBundle {
    match catch_unwind(AssertUnwindSafe(|| compute(timeline, metadata))) {
        Ok(metrics) => FeatureBundle::new(NAME, metrics),
        Err(_) => FeatureBundle::fallback(NAME, "metadata analysis extraction panicked", json!({})),
    }
}

fn compute(timeline: &Timeline, metadata: &VideoMetadata) -> serde_json::Value {
    let caption = &metadata.description;
    let caption_length = caption.chars().count();
    let word_count = caption.split_whitespace().count();

    let hashtags: Vec<String> = caption.split_whitespace().filter(|w| w.starts_with('#')).map(|w| w.to_string()).collect();
    let mentions: Vec<String> = caption.split_whitespace().filter(|w| w.starts_with('@')).map(|w| w.to_string()).collect();
    let emoji_count = caption.chars().filter(|c| is_emoji(*c)).count();

    let engagement_rate = metadata.engagement_rate();

    let publish_hour = metadata.created_at.hour();
    let publish_day_of_week = metadata.created_at.weekday().num_days_from_monday();

    let hashtag_count = hashtags.len();
    let hashtag_strategy = if hashtag_count < 3 {
        "minimal"
    } else if hashtag_count <= 7 {
        "moderate"
    } else if hashtag_count <= 15 {
        "heavy"
    } else {
        "spam"
    };

    let caption_style = caption_style(caption);
    let urgency = format!("{:?}", urgency_level(caption)).to_lowercase();

    let opening_density = opening_density(timeline);
    let viral_formula = viral_formula(caption, opening_density);

    let hook_strength = opening_density.min(1.0);
    let hashtag_relevance = (hashtag_count.min(10) as f64) / 10.0;
    let viral_potential_score = VIRAL_WEIGHT_ENGAGEMENT * engagement_rate.min(1.0) + VIRAL_WEIGHT_HOOK * hook_strength + VIRAL_WEIGHT_HASHTAG * hashtag_relevance;

    json!({
        "caption_length": caption_length,
        "word_count": word_count,
        "hashtag_count": hashtag_count,
        "hashtags": hashtags,
        "mention_count": mentions.len(),
        "mentions": mentions,
        "emoji_count": emoji_count,
        "engagement_rate": engagement_rate,
        "publish_hour": publish_hour,
        "publish_day_of_week": publish_day_of_week,
        "hashtag_strategy": hashtag_strategy,
        "caption_style": caption_style,
        "urgency_level": urgency,
        "viral_formula": viral_formula,
        "viral_potential_score": viral_potential_score,
    })
}

fn is_emoji(c: char) -> bool {
    let code = c as u32;
    (0x1F300..=0x1FAFF).contains(&code) || (0x2600..=0x27BF).contains(&code)
}

fn caption_style(caption: &str) -> &'static str {
    let trimmed = caption.trim();
    if trimmed.is_empty() {
        return "minimal";
    }
    if trimmed.ends_with('?') || trimmed.contains('?') {
        return "question";
    }
    let sentence_count = trimmed.matches(['.', '!', '?']).count().max(1);
    let bullet_markers = trimmed.lines().filter(|l| l.trim_start().starts_with(['-', '*', '•'])).count();
    if bullet_markers >= 2 {
        "list"
    } else if sentence_count >= 3 {
        "storytelling"
    } else if trimmed.split_whitespace().count() <= 6 {
        "minimal"
    } else {
        "direct"
    }
}

/// A density proxy for the first 10 seconds of the timeline, used as the
/// "hook strength" and "density pattern" inputs to `viral_formula`/`
/// viral_potential_score`. Self-contained (does not depend on the creative
/// density analysis) because the seven C5 extractors are independent pure
/// functions (§4.5).
fn opening_density(timeline: &Timeline) -> f64 {
    let count = timeline.in_range(rumi_core::Timestamp::ZERO, rumi_core::Timestamp::from_seconds(10.0).unwrap()).count();
    count as f64 / 10.0
}

fn viral_formula(caption: &str, opening_density: f64) -> &'static str {
    let lower = caption.to_lowercase();
    if lower.contains("how to") || lower.contains("tutorial") || lower.contains("step") {
        "tutorial"
    } else if lower.contains("challenge") {
        "challenge"
    } else if lower.contains("reacting") || lower.contains("reaction") {
        "reaction"
    } else if opening_density >= 1.0 && (lower.contains("wait") || lower.contains("until")) {
        "hook_payoff"
    } else if lower.contains("story") || lower.contains("happened") {
        "story_arc"
    } else {
        "other"
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{TimeZone, Utc};
    use rumi_core::video::Stats;

    fn meta(description: &str, stats: Stats) -> VideoMetadata {
        VideoMetadata {
            video_id: "v1".into(),
            url: "u".into(),
            duration_seconds: 10.0,
            original_fps: Some(30.0),
            frame_count: None,
            width: None,
            height: None,
            description: description.to_string(),
            author: String::new(),
            stats,
            created_at: Utc.with_ymd_and_hms(2024, 3, 15, 14, 30, 0).unwrap(),
        }
    }

    #[test]
    fn hashtag_strategy_thresholds() {
        let m = meta("#a #b #c #d", Stats::default());
        let bundle = extract(&Timeline::new(), &m);
        assert_eq!(bundle.metrics["hashtag_strategy"], "moderate");
    }

    #[test]
    fn engagement_rate_matches_video_metadata() {
        let stats = Stats { views: 100, likes: 10, comments: 5, shares: 3, saves: 2 };
        let m = meta("hello", stats);
        let bundle = extract(&Timeline::new(), &m);
        assert_eq!(bundle.metrics["engagement_rate"], 0.2);
    }
}
