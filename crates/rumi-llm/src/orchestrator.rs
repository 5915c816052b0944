//! C7: LLM orchestrator (§4.7). Runs the seven analyses in a fixed
//! sequence, in-process and sequentially, with per-call isolation.

use std::collections::HashMap;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::time::Duration;

use rumi_core::{FeatureBundle, Timeline, VideoMetadata};
use serde::Serialize;

use crate::context::build_context;
use crate::send_prompt::SendPrompt;
use crate::validator::{validate, ValidatedResponse};

/// Fixed order the seven analyses run in and are persisted in.
pub const ANALYSIS_ORDER: &[&str] = &[
    "creative_density",
    "emotional_journey",
    "person_framing",
    "scene_pacing",
    "speech_analysis",
    "visual_overlay",
    "metadata_analysis",
];

const DEFAULT_PROMPT_DELAY_SECS: u64 = 5;
const DEFAULT_TIMEOUT_SECS: u64 = 60;

/// One analysis's persisted LLM result, matching the on-disk
/// `insights/<video_id>/<analysis>/<analysis>_result.json` shape (§6).
#[derive(Debug, Clone, Serialize)]
pub struct AnalysisResult {
    pub analysis: String,
    pub success: bool,
    pub blocks_present: Vec<String>,
    pub blocks_missing: Vec<String>,
    pub data: serde_json::Value,
    pub usage: Option<serde_json::Value>,
    pub error: Option<String>,
}

/// Shared handle the caller can flip to stop the orchestrator between
/// analyses (§5: "a single cancel signal halts further analyses but
/// preserves already-persisted results").
#[derive(Clone, Default)]
pub struct CancellationToken(Arc<AtomicBool>);

impl CancellationToken {
    pub fn new() -> Self {
        Self(Arc::new(AtomicBool::new(false)))
    }

    pub fn cancel(&self) {
        self.0.store(true, Ordering::SeqCst);
    }

    pub fn is_cancelled(&self) -> bool {
        self.0.load(Ordering::SeqCst)
    }
}

pub struct Orchestrator<C: SendPrompt, P: Fn(&AnalysisResult)> {
    capability: C,
    prompt_delay: Duration,
    timeout_s: u64,
    on_persist: P,
}

impl<C: SendPrompt, P: Fn(&AnalysisResult)> Orchestrator<C, P> {
    pub fn new(capability: C, on_persist: P) -> Self {
        Self { capability, prompt_delay: Duration::from_secs(DEFAULT_PROMPT_DELAY_SECS), timeout_s: DEFAULT_TIMEOUT_SECS, on_persist }
    }

    pub fn with_prompt_delay(mut self, delay: Duration) -> Self {
        self.prompt_delay = delay;
        self
    }

    pub fn with_timeout_secs(mut self, timeout_s: u64) -> Self {
        self.timeout_s = timeout_s;
        self
    }

    /// Runs all seven analyses. `prompt_templates` maps analysis name to
    /// its prompt template text; `bundles` maps analysis name to its
    /// precomputed `FeatureBundle` from C5. `on_persist` is invoked
    /// synchronously after each analysis's result is validated, standing
    /// in for C9 so the orchestrator itself never touches the filesystem.
    pub async fn run(
        &self,
        prompt_templates: &HashMap<String, String>,
        bundles: &HashMap<String, FeatureBundle>,
        timeline: &Timeline,
        metadata: &VideoMetadata,
        cancellation: &CancellationToken,
    ) -> Vec<AnalysisResult> {
        let mut results = Vec::with_capacity(ANALYSIS_ORDER.len());

        for (i, analysis) in ANALYSIS_ORDER.iter().enumerate() {
            if cancellation.is_cancelled() {
                tracing::info!(analysis, "orchestrator cancelled, halting before this analysis");
                break;
            }

            let result = self.run_one(analysis, prompt_templates, bundles, timeline, metadata).await;
            (self.on_persist)(&result);
            results.push(result);

            let is_last = i == ANALYSIS_ORDER.len() - 1;
            if !is_last && !cancellation.is_cancelled() {
                tokio::time::sleep(self.prompt_delay).await;
            }
        }

        results
    }

    async fn run_one(
        &self,
        analysis: &str,
        prompt_templates: &HashMap<String, String>,
        bundles: &HashMap<String, FeatureBundle>,
        timeline: &Timeline,
        metadata: &VideoMetadata,
    ) -> AnalysisResult {
        let empty_bundle = FeatureBundle::fallback(analysis, "no precomputed bundle available", serde_json::json!({}));
        let bundle = bundles.get(analysis).unwrap_or(&empty_bundle);
        let context = build_context(analysis, bundle, timeline, metadata);

        let template = match prompt_templates.get(analysis) {
            Some(t) => t.clone(),
            None => {
                tracing::warn!(analysis, "no prompt template configured, using a minimal default");
                format!("Analyze the {analysis} signals and return the six canonical blocks.")
            }
        };

        let context_json = match serde_json::to_value(&context) {
            Ok(v) => v,
            Err(err) => {
                tracing::error!(analysis, error = %err, "failed to serialize prompt context");
                return AnalysisResult {
                    analysis: analysis.to_string(),
                    success: false,
                    blocks_present: Vec::new(),
                    blocks_missing: crate::validator::CANONICAL_BLOCKS.iter().map(|s| s.to_string()).collect(),
                    data: serde_json::json!({}),
                    usage: None,
                    error: Some(format!("context serialization failed: {err}")),
                };
            }
        };

        let outcome = tokio::time::timeout(Duration::from_secs(self.timeout_s), self.capability.send_prompt(&template, &context_json, self.timeout_s)).await;

        match outcome {
            Err(_) => {
                tracing::warn!(analysis, "LLM call timed out");
                AnalysisResult {
                    analysis: analysis.to_string(),
                    success: false,
                    blocks_present: Vec::new(),
                    blocks_missing: crate::validator::CANONICAL_BLOCKS.iter().map(|s| s.to_string()).collect(),
                    data: serde_json::json!({}),
                    usage: None,
                    error: Some("timeout".to_string()),
                }
            }
            Ok(send_result) if send_result.success => {
                let ValidatedResponse { blocks_present, blocks_missing, data } = validate(send_result.response_text.as_deref().unwrap_or(""));
                AnalysisResult {
                    analysis: analysis.to_string(),
                    success: true,
                    blocks_present,
                    blocks_missing,
                    data,
                    usage: send_result.usage,
                    error: None,
                }
            }
            Ok(send_result) => {
                tracing::warn!(analysis, error = ?send_result.error, "LLM call failed");
                AnalysisResult {
                    analysis: analysis.to_string(),
                    success: false,
                    blocks_present: Vec::new(),
                    blocks_missing: crate::validator::CANONICAL_BLOCKS.iter().map(|s| s.to_string()).collect(),
                    data: serde_json::json!({}),
                    usage: None,
                    error: send_result.error,
                }
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use async_trait::async_trait;
    use chrono::Utc;
    use rumi_core::video::Stats;
    use std::sync::Mutex;

    struct StubCapability {
        response: String,
    }

    #[async_trait]
    impl SendPrompt for StubCapability {
        async fn send_prompt(&self, _prompt: &str, _context: &serde_json::Value, _timeout_s: u64) -> crate::send_prompt::SendPromptResult {
            crate::send_prompt::SendPromptResult::ok(self.response.clone(), None)
        }
    }

    fn meta() -> VideoMetadata {
        VideoMetadata {
            video_id: "v1".into(),
            url: "u".into(),
            duration_seconds: 10.0,
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

    #[tokio::test]
    async fn runs_all_seven_in_fixed_order() {
        let capability = StubCapability { response: "{\"CoreMetrics\":{\"confidence\":0.9}}".to_string() };
        let persisted = Mutex::new(Vec::new());
        let orchestrator = Orchestrator::new(capability, |r: &AnalysisResult| persisted.lock().unwrap().push(r.analysis.clone()))
            .with_prompt_delay(Duration::from_millis(1));

        let results = orchestrator.run(&HashMap::new(), &HashMap::new(), &Timeline::new(), &meta(), &CancellationToken::new()).await;

        assert_eq!(results.len(), 7);
        assert_eq!(results.iter().map(|r| r.analysis.as_str()).collect::<Vec<_>>(), ANALYSIS_ORDER);
        assert_eq!(persisted.into_inner().unwrap(), ANALYSIS_ORDER.to_vec());
    }

    #[tokio::test]
    async fn cancellation_before_first_call_runs_nothing() {
        let capability = StubCapability { response: "{}".to_string() };
        let cancellation = CancellationToken::new();
        cancellation.cancel();

        let orchestrator = Orchestrator::new(capability, |_: &AnalysisResult| {}).with_prompt_delay(Duration::from_millis(1));
        let results = orchestrator.run(&HashMap::new(), &HashMap::new(), &Timeline::new(), &meta(), &cancellation).await;
        assert!(results.is_empty());
    }
}
