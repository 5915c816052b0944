//! Fixed, extensible phrase lexicons (§6) shared by C4's CTA-window
//! detection, C5's speech/visual-overlay analyses, and C6's prompt context.
//!
//! Kept in `rumi-core` rather than `rumi-llm` because both
//! `rumi-precompute` and `rumi-llm` need them and neither depends on the
//! other.

pub const CTA_LEXICON: &[&str] = &[
    "follow", "like", "comment", "share", "subscribe", "tap", "click", "swipe", "hit the",
    "don't forget to", "make sure to", "check out", "link in bio", "dm me", "tag",
];

pub const HOOK_LEXICON: &[&str] = &[
    "wait for it", "watch this", "you won't believe", "check this out", "stay tuned",
    "here's what happened", "this is crazy", "no way",
];

pub const FILLER_LEXICON: &[&str] = &["um", "uh", "like", "you know", "basically", "literally", "so"];

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum UrgencyLevel {
    None,
    Low,
    Medium,
    High,
}

pub const URGENCY_HIGH: &[&str] = &["now", "today", "last chance", "ends soon"];
pub const URGENCY_MEDIUM: &[&str] = &["limited", "don't miss", "hurry"];
pub const URGENCY_LOW: &[&str] = &["soon", "coming"];

/// Whether `haystack` contains any phrase from `lexicon`, case-insensitively.
pub fn matches_any(haystack: &str, lexicon: &[&str]) -> bool {
    let lower = haystack.to_lowercase();
    lexicon.iter().any(|phrase| lower.contains(phrase))
}

/// The highest urgency tier whose lexicon matches `haystack`, `None` if
/// none match.
pub fn urgency_level(haystack: &str) -> UrgencyLevel {
    if matches_any(haystack, URGENCY_HIGH) {
        UrgencyLevel::High
    } else if matches_any(haystack, URGENCY_MEDIUM) {
        UrgencyLevel::Medium
    } else if matches_any(haystack, URGENCY_LOW) {
        UrgencyLevel::Low
    } else {
        UrgencyLevel::None
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn detects_cta_phrase() {
        assert!(matches_any("don't forget to follow for more", CTA_LEXICON));
    }

    #[test]
    fn urgency_level_prefers_highest_tier() {
        assert_eq!(urgency_level("last chance, hurry up"), UrgencyLevel::High);
        assert_eq!(urgency_level("hurry, limited stock"), UrgencyLevel::Medium);
        assert_eq!(urgency_level("more coming soon"), UrgencyLevel::Low);
        assert_eq!(urgency_level("nothing special here"), UrgencyLevel::None);
    }
}
