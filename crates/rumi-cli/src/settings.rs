//! Runtime configuration for the `runner` binary (§6 "Environment inputs"):
//! every variable is optional, falls back to a documented default, and a
//! bad value is treated as absent rather than fatal.

use std::time::Duration;

/// Output schema version negotiated with downstream consumers of the final
/// JSON summary and persisted insight results.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OutputFormatVersion {
    V1,
    V2,
}

impl OutputFormatVersion {
    fn from_str(s: &str) -> Option<Self> {
        match s {
            "v1" => Some(Self::V1),
            "v2" => Some(Self::V2),
            _ => None,
        }
    }
}

#[derive(Debug, Clone)]
pub struct Settings {
    pub claude_api_key: Option<String>,
    pub apify_api_token: Option<String>,
    pub use_ml_precompute: bool,
    pub use_claude_sonnet: bool,
    pub output_format_version: OutputFormatVersion,
    pub prompt_delay: Duration,
    pub max_video_duration: f64,
    pub strict_mode: bool,
}

impl Settings {
    pub fn from_env() -> Self {
        Self {
            claude_api_key: std::env::var("CLAUDE_API_KEY").ok().filter(|s| !s.is_empty()),
            apify_api_token: std::env::var("APIFY_API_TOKEN").ok().filter(|s| !s.is_empty()),
            use_ml_precompute: env_bool("USE_ML_PRECOMPUTE", true),
            use_claude_sonnet: env_bool("USE_CLAUDE_SONNET", false),
            output_format_version: std::env::var("OUTPUT_FORMAT_VERSION").ok().and_then(|s| OutputFormatVersion::from_str(&s)).unwrap_or(OutputFormatVersion::V2),
            prompt_delay: Duration::from_secs(std::env::var("PROMPT_DELAY").ok().and_then(|s| s.parse().ok()).unwrap_or(5)),
            max_video_duration: std::env::var("MAX_VIDEO_DURATION").ok().and_then(|s| s.parse().ok()).unwrap_or(180.0),
            strict_mode: env_bool("RUMIAI_STRICT_MODE", false),
        }
    }
}

fn env_bool(name: &str, default: bool) -> bool {
    match std::env::var(name) {
        Ok(v) => matches!(v.trim().to_ascii_lowercase().as_str(), "1" | "true" | "yes" | "on"),
        Err(_) => default,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn output_format_version_defaults_to_v2_on_bad_value() {
        assert_eq!(OutputFormatVersion::from_str("bogus"), None);
    }

    #[test]
    fn env_bool_accepts_common_truthy_spellings() {
        std::env::set_var("RUMI_CLI_TEST_FLAG", "True");
        assert!(env_bool("RUMI_CLI_TEST_FLAG", false));
        std::env::remove_var("RUMI_CLI_TEST_FLAG");
    }

    #[test]
    fn env_bool_falls_back_to_default_when_unset() {
        std::env::remove_var("RUMI_CLI_TEST_FLAG_UNSET");
        assert!(!env_bool("RUMI_CLI_TEST_FLAG_UNSET", false));
        assert!(env_bool("RUMI_CLI_TEST_FLAG_UNSET", true));
    }
}
