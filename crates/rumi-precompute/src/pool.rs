//! Bounded worker pool for the seven C5 feature extractors (§5).

use rumi_core::{FeatureBundle, Timeline, VideoMetadata};

use crate::extractors;

const MAX_WORKERS: usize = 4;

/// Runs all seven extractors, with at most `min(num_cpus, MAX_WORKERS)`
/// running concurrently. Each extractor is independent and never raises
/// (panics are caught per-extractor), so a single failing analysis cannot
/// take down the others.
pub fn run_all(timeline: &Timeline, metadata: &VideoMetadata) -> Vec<FeatureBundle> {
    let workers = num_cpus::get().min(MAX_WORKERS).max(1);
    let pool = match rayon::ThreadPoolBuilder::new().num_threads(workers).build() {
        Ok(pool) => pool,
        Err(err) => {
            tracing::warn!(error = %err, "failed to build bounded thread pool, falling back to sequential extraction");
            return extractors::ANALYSES.iter().map(|name| extractors::run(name, timeline, metadata)).collect();
        }
    };

    pool.install(|| {
        use rayon::prelude::*;
        extractors::ANALYSES.par_iter().map(|name| extractors::run(name, timeline, metadata)).collect()
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Utc;
    use rumi_core::video::Stats;

    #[test]
    fn runs_all_seven_analyses() {
        let metadata = VideoMetadata {
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
        };
        let bundles = run_all(&Timeline::new(), &metadata);
        assert_eq!(bundles.len(), extractors::ANALYSES.len());
    }
}
