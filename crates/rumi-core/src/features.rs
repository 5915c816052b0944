//! `FeatureBundle`: the typed output of one C5 precompute function.
//!
//! Each of the seven analyses (§4.5) derives dozens of differently-shaped
//! metrics; rather than one fixed struct per analysis this module defines
//! the common envelope every bundle shares (a confidence score and
//! fallback/error flags) while the metrics themselves are a typed
//! `serde_json::Value` tree built by `rumi-precompute`. This mirrors the
//! shape §6's block schemas expect when a bundle later becomes prompt
//! context: a name, a confidence, and a metrics object.

use serde::{Deserialize, Serialize};
use serde_json::Value;

/// Per-analysis feature output. `confidence` is always in `[0,1]`.
#[derive(Debug, Clone, Serialize, Deserialize, schemars::JsonSchema)]
pub struct FeatureBundle {
    pub analysis: String,
    pub confidence: f64,
    pub metrics: Value,
    /// Set when the extractor failed and this bundle carries only minimal
    /// counts derived from raw timeline sizes (§4.5 failure semantics).
    #[serde(default)]
    pub fallback: bool,
    pub error: Option<String>,
}

impl FeatureBundle {
    pub fn new(analysis: impl Into<String>, metrics: Value) -> Self {
        Self {
            analysis: analysis.into(),
            confidence: 1.0,
            metrics,
            fallback: false,
            error: None,
        }
    }

    /// The `{error, fallback: true}` bundle emitted when an extractor raises
    /// (§4.5 failure semantics). `minimal` should hold whatever counts could
    /// be derived from raw timeline sizes without running the full
    /// algorithm.
    pub fn fallback(analysis: impl Into<String>, error: impl Into<String>, minimal: Value) -> Self {
        Self {
            analysis: analysis.into(),
            confidence: 0.0,
            metrics: minimal,
            fallback: true,
            error: Some(error.into()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn fallback_bundle_is_flagged() {
        let b = FeatureBundle::fallback("speech_analysis", "boom", serde_json::json!({"word_count": 0}));
        assert!(b.fallback);
        assert_eq!(b.confidence, 0.0);
        assert!(b.error.is_some());
    }
}
