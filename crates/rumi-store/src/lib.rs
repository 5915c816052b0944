//! Atomic JSON persistence (C9) and on-disk layout (§6) for the rumi
//! video fusion engine.

pub mod atomic;
pub mod error;
pub mod layout;
pub mod persistence;

pub use atomic::{atomic_write_json, load_if_current};
pub use error::{StoreError, StoreResult};
pub use layout::{insight_result_path, temporal_markers_path, unified_analysis_path};
pub use persistence::{load_if_current_unified_analysis, persist_insight_result, persist_temporal_markers, persist_unified_analysis};
