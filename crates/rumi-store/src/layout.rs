//! On-disk layout path builders (§6, stable).

use std::path::{Path, PathBuf};

pub fn unified_analysis_path(base_dir: &Path, video_id: &str) -> PathBuf {
    base_dir.join("unified_analysis").join(format!("{video_id}.json"))
}

pub fn temporal_markers_path(base_dir: &Path, video_id: &str, timestamp: &str) -> PathBuf {
    base_dir.join("temporal_markers").join(format!("{video_id}_{timestamp}.json"))
}

pub fn insight_result_path(base_dir: &Path, video_id: &str, analysis: &str) -> PathBuf {
    base_dir.join("insights").join(video_id).join(analysis).join(format!("{analysis}_result.json"))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn builds_expected_relative_paths() {
        let base = Path::new("/data");
        assert_eq!(unified_analysis_path(base, "v1"), PathBuf::from("/data/unified_analysis/v1.json"));
        assert_eq!(temporal_markers_path(base, "v1", "20260101T000000Z"), PathBuf::from("/data/temporal_markers/v1_20260101T000000Z.json"));
        assert_eq!(insight_result_path(base, "v1", "speech_analysis"), PathBuf::from("/data/insights/v1/speech_analysis/speech_analysis_result.json"));
    }
}
