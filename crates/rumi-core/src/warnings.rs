//! The recovered-condition taxonomy and its counters.
//!
//! Every kind of condition the core recovers from rather than raising (§7)
//! is named here. No recovery is silent: each one increments a counter that
//! is threaded through to the final CLI summary.

use std::collections::HashMap;

use serde::{Deserialize, Serialize};

/// A kind of recovered condition. Variant names describe the condition, not
/// a type or module that raised it.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, schemars::JsonSchema)]
pub enum WarningKind {
    /// Malformed analyzer output structure.
    InputShape,
    /// Unparseable timestamp.
    TimestampParse,
    /// Out-of-range timestamp, clamped to `[0, duration]`.
    Clamp,
    /// An entire analyzer's output was absent.
    MissingModality,
    /// An exception inside a C5 feature extractor.
    PrecomputeFailure,
    /// An LLM call exceeded its per-call timeout.
    LlmTimeout,
    /// An LLM call failed at the transport level.
    LlmTransport,
    /// LLM output was missing blocks or malformed JSON.
    SchemaViolation,
    /// Context or markers exceeded their size limit.
    SizeOverflow,
    /// A disk write failed.
    PersistenceFailure,
}

/// A counted tally of every recovered condition seen while processing one
/// video.
#[derive(Debug, Clone, Default, Serialize, Deserialize, schemars::JsonSchema)]
#[serde(transparent)]
pub struct WarningCounters(HashMap<WarningKind, u32>);

impl WarningCounters {
    pub fn new() -> Self {
        Self::default()
    }

    /// Record one occurrence of `kind`.
    pub fn record(&mut self, kind: WarningKind) {
        *self.0.entry(kind).or_insert(0) += 1;
    }

    /// Count recorded for a given kind.
    pub fn count(&self, kind: WarningKind) -> u32 {
        self.0.get(&kind).copied().unwrap_or(0)
    }

    /// Total recovered conditions across all kinds.
    pub fn total(&self) -> u32 {
        self.0.values().sum()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty() || self.total() == 0
    }

    /// Merge another counter set into this one.
    pub fn merge(&mut self, other: &WarningCounters) {
        for (kind, count) in &other.0 {
            *self.0.entry(*kind).or_insert(0) += count;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn records_and_totals() {
        let mut w = WarningCounters::new();
        w.record(WarningKind::Clamp);
        w.record(WarningKind::Clamp);
        w.record(WarningKind::TimestampParse);
        assert_eq!(w.count(WarningKind::Clamp), 2);
        assert_eq!(w.count(WarningKind::TimestampParse), 1);
        assert_eq!(w.count(WarningKind::SizeOverflow), 0);
        assert_eq!(w.total(), 3);
    }

    #[test]
    fn merge_combines_counts() {
        let mut a = WarningCounters::new();
        a.record(WarningKind::Clamp);
        let mut b = WarningCounters::new();
        b.record(WarningKind::Clamp);
        b.record(WarningKind::PrecomputeFailure);
        a.merge(&b);
        assert_eq!(a.count(WarningKind::Clamp), 2);
        assert_eq!(a.count(WarningKind::PrecomputeFailure), 1);
    }
}
