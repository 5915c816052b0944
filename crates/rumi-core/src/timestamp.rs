//! Canonical timestamp type and parsing.
//!
//! Every analyzer speaks a different timestamp dialect (raw seconds, frame
//! ranges, clock strings). This module normalizes all of them into a single
//! non-negative `Timestamp` measured in seconds, and never raises: an
//! unparseable or negative value becomes `None` plus a logged warning,
//! letting the caller decide whether to drop the entry or substitute a
//! default.

use std::cmp::Ordering;

use tracing::warn;

/// An immutable, non-negative point in time measured in seconds.
///
/// Ordering is total: timestamps are always finite and non-negative, so
/// `PartialOrd`/`Ord` never hit the `NaN` case that makes `f64` only
/// partially ordered.
#[derive(Debug, Clone, Copy, PartialEq, serde::Serialize, serde::Deserialize, schemars::JsonSchema)]
#[serde(transparent)]
pub struct Timestamp(f64);

impl Timestamp {
    /// Construct a timestamp from a non-negative number of seconds.
    ///
    /// Returns `None` for negative or non-finite input.
    pub fn from_seconds(seconds: f64) -> Option<Self> {
        if seconds.is_finite() && seconds >= 0.0 {
            Some(Self(seconds))
        } else {
            None
        }
    }

    /// The zero timestamp.
    pub const ZERO: Timestamp = Timestamp(0.0);

    /// Seconds as `f64`.
    pub fn seconds(self) -> f64 {
        self.0
    }

    /// Clamp this timestamp into `[0, max]`, returning whether clamping
    /// actually changed the value (used to decide whether to log a warning).
    pub fn clamp(self, max: Timestamp) -> (Timestamp, bool) {
        if self.0 > max.0 {
            (max, true)
        } else {
            (self, false)
        }
    }
}

impl Eq for Timestamp {}

impl PartialOrd for Timestamp {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl Ord for Timestamp {
    fn cmp(&self, other: &Self) -> Ordering {
        self.0.total_cmp(&other.0)
    }
}

impl std::fmt::Display for Timestamp {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{:.3}s", self.0)
    }
}

/// Parse a timestamp string accepting every format an analyzer is known to
/// emit:
///
/// - a bare real number: `"12.5"`
/// - a bare integer: `"12"`
/// - `"<n>s"`: `"12s"`
/// - `"<a>-<b>s"` (a range; the start is used): `"0-1s"`
/// - `"MM:SS"`: `"01:30"`
/// - `"HH:MM:SS"`: `"00:01:30"`
///
/// Empty strings, unparseable strings, and negative values all return
/// `None` and log a warning rather than raising.
pub fn parse(raw: &str) -> Option<Timestamp> {
    let trimmed = raw.trim();
    if trimmed.is_empty() {
        warn!("timestamp parse: empty input");
        return None;
    }

    let parsed = parse_range(trimmed)
        .or_else(|| parse_suffixed_seconds(trimmed))
        .or_else(|| parse_clock(trimmed))
        .or_else(|| trimmed.parse::<f64>().ok());

    match parsed.and_then(Timestamp::from_seconds) {
        Some(ts) => Some(ts),
        None => {
            warn!(input = %raw, "timestamp parse: unrecognized or negative format");
            None
        }
    }
}

/// `"<a>-<b>s"` — use `a`.
fn parse_range(s: &str) -> Option<f64> {
    let s = s.strip_suffix('s')?;
    let (a, _b) = s.split_once('-')?;
    a.parse::<f64>().ok()
}

/// `"<n>s"`.
fn parse_suffixed_seconds(s: &str) -> Option<f64> {
    let s = s.strip_suffix('s')?;
    s.parse::<f64>().ok()
}

/// `"MM:SS"` or `"HH:MM:SS"`.
fn parse_clock(s: &str) -> Option<f64> {
    let parts: Vec<&str> = s.split(':').collect();
    match parts.len() {
        2 => {
            let minutes: f64 = parts[0].parse().ok()?;
            let seconds: f64 = parts[1].parse().ok()?;
            Some(minutes * 60.0 + seconds)
        }
        3 => {
            let hours: f64 = parts[0].parse().ok()?;
            let minutes: f64 = parts[1].parse().ok()?;
            let seconds: f64 = parts[2].parse().ok()?;
            Some(hours * 3600.0 + minutes * 60.0 + seconds)
        }
        _ => None,
    }
}

/// Convert a frame index to seconds under a given FPS.
///
/// Callers must always pass the *original* video FPS (never an
/// analyzer-local sampling rate) — see [`crate::fps`].
pub fn frame_to_seconds(frame: u64, fps: f64) -> f64 {
    frame as f64 / fps
}

/// Convert seconds to the nearest frame index under a given FPS.
pub fn seconds_to_frame(seconds: f64, fps: f64) -> u64 {
    (seconds * fps).round() as u64
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_bare_number_and_integer() {
        assert_eq!(parse("12.5").unwrap().seconds(), 12.5);
        assert_eq!(parse("12").unwrap().seconds(), 12.0);
    }

    #[test]
    fn parses_suffixed_seconds() {
        assert_eq!(parse("2s").unwrap().seconds(), 2.0);
    }

    #[test]
    fn parses_range_using_start() {
        assert_eq!(parse("0-1s").unwrap().seconds(), 0.0);
        assert_eq!(parse("4-6s").unwrap().seconds(), 4.0);
    }

    #[test]
    fn parses_mm_ss_and_hh_mm_ss() {
        assert_eq!(parse("0:03").unwrap().seconds(), 3.0);
        assert_eq!(parse("01:00:00").unwrap().seconds(), 3600.0);
    }

    #[test]
    fn rejects_empty_unparseable_and_negative() {
        assert!(parse("").is_none());
        assert!(parse("bad").is_none());
        assert!(parse("-1").is_none());
    }

    #[test]
    fn ordering_is_total() {
        let mut v = vec![
            parse("5s").unwrap(),
            parse("1s").unwrap(),
            parse("3s").unwrap(),
        ];
        v.sort();
        assert_eq!(v.iter().map(|t| t.seconds()).collect::<Vec<_>>(), vec![1.0, 3.0, 5.0]);
    }

    #[test]
    fn frame_seconds_round_trip() {
        for fps in [24.0, 29.97, 30.0, 60.0] {
            for frame in [0u64, 1, 17, 300] {
                let secs = frame_to_seconds(frame, fps);
                assert_eq!(seconds_to_frame(secs, fps), frame);
            }
        }
    }

    #[test]
    fn e2_timestamp_format_mix() {
        let inputs = ["0-1s", "2s", "2.5", "0:03", "bad"];
        let parsed: Vec<Option<Timestamp>> = inputs.iter().map(|s| parse(s)).collect();
        let kept: Vec<f64> = parsed.iter().flatten().map(|t| t.seconds()).collect();
        assert_eq!(kept, vec![0.0, 2.0, 2.5, 3.0]);
        assert!(parsed[4].is_none());
    }
}
