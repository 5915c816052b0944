//! The pre-validation entry shape every adapter's `build_entries` emits.
//!
//! Adapters work in raw seconds, not [`rumi_core::Timestamp`], because the
//! clamp/drop/swap edge cases of §4.3 are the assembler's job, not the
//! adapter's: an adapter that rejected an out-of-range start itself would
//! duplicate that policy per modality instead of once in the assembler.

use rumi_core::Payload;

pub struct RawEntry {
    pub start: f64,
    pub end: Option<f64>,
    pub payload: Payload,
}

impl RawEntry {
    pub fn new(start: f64, end: Option<f64>, payload: Payload) -> Self {
        Self { start, end, payload }
    }
}
