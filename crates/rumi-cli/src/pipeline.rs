//! End-to-end wiring: C2 output -> C3 assembler -> C4 markers -> C5
//! precompute -> C6/C7 LLM orchestration -> C9 persistence. This is the
//! part of `runner` neither spec.md nor its component design own — every
//! piece here is already built in `rumi-adapters`/`rumi-precompute`/
//! `rumi-llm`/`rumi-store`; this module only sequences them the way §4.7's
//! narrative describes the orchestrator's surrounding pipeline.

use std::collections::HashMap;
use std::path::Path;

use rumi_adapters::assemble;
use rumi_core::{FeatureBundle, MLAnalysisResult, UnifiedAnalysis, VideoMetadata, WarningCounters};
use rumi_llm::{AnalysisResult, CancellationToken, Orchestrator, SendPrompt};
use rumi_store::{persist_insight_result, persist_temporal_markers, persist_unified_analysis};
use serde::Serialize;
use serde_json::Value;

use crate::error::CliResult;
use crate::prompts::load_prompt_templates;
use crate::settings::Settings;

/// Fixed stdout progress markers (§6): `📊` during a step, `✅`/`❌` on its
/// completion. Kept on stdout so a consumer parsing the final JSON summary
/// line is never interrupted by informational logging, which goes to
/// stderr via `tracing` instead.
pub fn progress(step: &str, pct: u8) {
    println!("📊 {step}... ({pct}%)");
}

pub fn progress_done(msg: &str) {
    println!("✅ {msg}");
}

pub fn progress_failed(step: &str, reason: &str) {
    println!("❌ {step} failed: {reason}");
}

#[derive(Debug, Serialize)]
pub struct AnalysisSummary {
    pub analysis: String,
    pub success: bool,
    pub blocks_present: Vec<String>,
    pub blocks_missing: Vec<String>,
}

impl From<&AnalysisResult> for AnalysisSummary {
    fn from(r: &AnalysisResult) -> Self {
        Self {
            analysis: r.analysis.clone(),
            success: r.success,
            blocks_present: r.blocks_present.clone(),
            blocks_missing: r.blocks_missing.clone(),
        }
    }
}

#[derive(Debug, Serialize)]
pub struct PipelineSummary {
    pub video_id: String,
    pub success: bool,
    pub analyses: Vec<AnalysisSummary>,
    pub warnings: HashMap<String, u32>,
    pub warning_total: u32,
}

/// Runs the full pipeline for one video's already-assembled metadata and
/// analyzer outputs. Shared by both `runner <video_id>` (inputs loaded from
/// the conventional on-disk raw layout) and `runner <video_url>` (inputs
/// supplied by an `Acquisition` implementation). `capability` is injected
/// rather than constructed here so tests can run the whole wiring against a
/// stub instead of the network.
pub async fn run<C: SendPrompt + 'static>(
    base_dir: &Path,
    settings: &Settings,
    metadata: VideoMetadata,
    ml_results: HashMap<String, MLAnalysisResult>,
    mut warnings: WarningCounters,
    capability: C,
) -> CliResult<PipelineSummary> {
    metadata.validate()?;

    let video_id = metadata.video_id.clone();
    let fps = metadata.original_fps.unwrap_or(rumi_core::FpsContext::DEFAULT.original_fps);

    progress("assembling unified timeline", 10);
    let (timeline, assemble_warnings) = assemble(&metadata, &ml_results, fps);
    warnings.merge(&assemble_warnings);

    let mut ua = UnifiedAnalysis::new(metadata, timeline, ml_results, warnings);
    let markers = rumi_precompute::extract_markers(&ua);
    ua = ua.with_markers(markers.clone());

    persist_unified_analysis(base_dir, &ua).await?;
    persist_temporal_markers(base_dir, &video_id, &markers).await?;
    progress_done("unified analysis and temporal markers persisted");

    progress("running precompute extractors", 40);
    let bundles: HashMap<String, FeatureBundle> = if settings.use_ml_precompute {
        rumi_precompute::run_all_extractors(&ua.timeline, &ua.metadata).into_iter().map(|b| (b.analysis.clone(), b)).collect()
    } else {
        tracing::info!("USE_ML_PRECOMPUTE disabled, LLM calls proceed with fallback bundles only");
        HashMap::new()
    };
    progress_done("precompute extractors complete");

    progress("running LLM orchestrator", 60);
    let prompt_templates = load_prompt_templates(Path::new("prompts")).await;

    // `on_persist` stands in for C9 inside the orchestrator (§4.7's own
    // design keeps the orchestrator filesystem-free); it only records each
    // validated result in order here. The actual atomic writes happen right
    // below, immediately after `run` returns, sequentially in the same
    // fixed order the orchestrator produced them in, since `on_persist`
    // itself must stay synchronous and this crate's runtime may be
    // single-threaded under test.
    let collected = std::sync::Mutex::new(Vec::with_capacity(rumi_llm::ANALYSIS_ORDER.len()));
    let on_persist = |result: &AnalysisResult| collected.lock().expect("collected-results lock poisoned").push(insight_result_value(result));

    let orchestrator = Orchestrator::new(capability, on_persist).with_prompt_delay(settings.prompt_delay).with_timeout_secs(60);
    let cancellation = CancellationToken::new();
    let results = orchestrator.run(&prompt_templates, &bundles, &ua.timeline, &ua.metadata, &cancellation).await;

    for (analysis, value) in results.iter().map(|r| r.analysis.as_str()).zip(collected.into_inner().expect("collected-results lock poisoned")) {
        if let Err(err) = persist_insight_result(base_dir, &video_id, analysis, &value).await {
            tracing::error!(analysis, error = %err, "failed to persist insight result");
        }
    }
    progress_done("LLM orchestration complete");

    let success = results.iter().all(|r| r.success);
    let warning_counts = flatten_warnings(&ua.warnings);
    let warning_total = ua.warnings.total();

    Ok(PipelineSummary {
        video_id,
        success,
        analyses: results.iter().map(AnalysisSummary::from).collect(),
        warnings: warning_counts,
        warning_total,
    })
}

fn insight_result_value(result: &AnalysisResult) -> Value {
    serde_json::json!({
        "success": result.success,
        "blocks_present": result.blocks_present,
        "blocks_missing": result.blocks_missing,
        "data": result.data,
        "usage": result.usage,
        "error": result.error,
    })
}

fn flatten_warnings(warnings: &WarningCounters) -> HashMap<String, u32> {
    use rumi_core::WarningKind::*;
    let kinds = [
        ("InputShape", InputShape),
        ("TimestampParse", TimestampParse),
        ("Clamp", Clamp),
        ("MissingModality", MissingModality),
        ("PrecomputeFailure", PrecomputeFailure),
        ("LlmTimeout", LlmTimeout),
        ("LlmTransport", LlmTransport),
        ("SchemaViolation", SchemaViolation),
        ("SizeOverflow", SizeOverflow),
        ("PersistenceFailure", PersistenceFailure),
    ];
    kinds.into_iter().filter_map(|(name, kind)| { let c = warnings.count(kind); (c > 0).then(|| (name.to_string(), c)) }).collect()
}
