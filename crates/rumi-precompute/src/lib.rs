//! Temporal-marker extraction (C4) and the seven C5 feature analyses for
//! the rumi video fusion engine.

pub mod extractors;
pub mod markers;
pub mod pool;
pub mod stats;

pub use markers::extract as extract_markers;
pub use pool::run_all as run_all_extractors;
