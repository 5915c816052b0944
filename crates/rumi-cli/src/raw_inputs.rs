//! Legacy-mode (`runner <video_id>`) raw input convention.
//!
//! §6 only fixes the layout of the three *outputs* C9 persists; the layout
//! of the raw per-analyzer inputs C2 consumes is left to the caller. This
//! module fixes that convention for the `runner` binary: one file per
//! expected model under `<base>/raw_ml_output/<video_id>/<model>.json`,
//! each holding an `MLAnalysisResult`-shaped JSON object (the same shape a
//! C2 adapter would itself have wrapped an analyzer's raw output in). A
//! video's metadata lives alongside it at
//! `<base>/raw_ml_output/<video_id>/metadata.json`.
//!
//! A missing or unreadable model file is not an error: it is reported to
//! the assembler as an absent analyzer, which already accounts for it as
//! `MissingModality` (§7).

use std::collections::HashMap;
use std::path::{Path, PathBuf};

use rumi_adapters::EXPECTED_MODELS;
use rumi_core::{MLAnalysisResult, VideoMetadata, WarningCounters, WarningKind};

pub fn raw_input_dir(base_dir: &Path, video_id: &str) -> PathBuf {
    base_dir.join("raw_ml_output").join(video_id)
}

fn metadata_path(base_dir: &Path, video_id: &str) -> PathBuf {
    raw_input_dir(base_dir, video_id).join("metadata.json")
}

fn model_path(base_dir: &Path, video_id: &str, model: &str) -> PathBuf {
    raw_input_dir(base_dir, video_id).join(format!("{model}.json"))
}

pub async fn load_metadata(base_dir: &Path, video_id: &str) -> Result<VideoMetadata, String> {
    let path = metadata_path(base_dir, video_id);
    let bytes = tokio::fs::read(&path).await.map_err(|err| format!("reading {}: {err}", path.display()))?;
    serde_json::from_slice(&bytes).map_err(|err| format!("parsing {}: {err}", path.display()))
}

/// Reads whatever pre-populated analyzer outputs exist for `video_id`. Every
/// expected model is attempted; a missing file is silently skipped (the
/// assembler treats an absent entry as `MissingModality`), while a present
/// but unparseable file is counted as `InputShape` and otherwise skipped.
pub async fn load_ml_results(base_dir: &Path, video_id: &str, warnings: &mut WarningCounters) -> HashMap<String, MLAnalysisResult> {
    let mut results = HashMap::new();

    for model in EXPECTED_MODELS {
        let path = model_path(base_dir, video_id, model);
        let bytes = match tokio::fs::read(&path).await {
            Ok(b) => b,
            Err(_) => continue,
        };
        match serde_json::from_slice::<MLAnalysisResult>(&bytes) {
            Ok(result) => {
                results.insert((*model).to_string(), result);
            }
            Err(err) => {
                tracing::warn!(model, path = %path.display(), error = %err, "raw analyzer output malformed, treating as absent");
                warnings.record(WarningKind::InputShape);
            }
        }
    }

    results
}
