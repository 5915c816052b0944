//! Shared statistical toolkit used by every C5 extractor: per-second
//! counts, per-window means/variances, top-K peaks, inter-event intervals,
//! and Markov transition counts.

use std::collections::HashMap;
use std::hash::Hash;

/// Count events into fixed 1-second buckets covering `[0, duration)`.
pub fn per_second_counts(times: impl IntoIterator<Item = f64>, duration: f64) -> Vec<u32> {
    let n = duration.ceil().max(1.0) as usize;
    let mut buckets = vec![0u32; n];
    for t in times {
        let idx = (t as usize).min(n.saturating_sub(1));
        buckets[idx] += 1;
    }
    buckets
}

/// Count events into fixed-width windows of `window_secs` covering `[0,
/// duration)`.
pub fn windowed_counts(times: impl IntoIterator<Item = f64>, duration: f64, window_secs: f64) -> Vec<u32> {
    let n = (duration / window_secs).ceil().max(1.0) as usize;
    let mut buckets = vec![0u32; n];
    for t in times {
        let idx = ((t / window_secs) as usize).min(n.saturating_sub(1));
        buckets[idx] += 1;
    }
    buckets
}

pub fn mean(values: &[f64]) -> f64 {
    if values.is_empty() {
        0.0
    } else {
        values.iter().sum::<f64>() / values.len() as f64
    }
}

pub fn variance(values: &[f64]) -> f64 {
    if values.len() < 2 {
        return 0.0;
    }
    let m = mean(values);
    values.iter().map(|v| (v - m).powi(2)).sum::<f64>() / values.len() as f64
}

pub fn stdev(values: &[f64]) -> f64 {
    variance(values).sqrt()
}

/// Population standard deviation of a `u32` series, as `f64`.
pub fn stdev_u32(values: &[u32]) -> f64 {
    let as_f64: Vec<f64> = values.iter().map(|v| *v as f64).collect();
    stdev(&as_f64)
}

pub fn mean_u32(values: &[u32]) -> f64 {
    let as_f64: Vec<f64> = values.iter().map(|v| *v as f64).collect();
    mean(&as_f64)
}

/// Top-`k` indices by descending score, ties broken by ascending index
/// (first occurrence wins).
pub fn top_k_indices(scores: &[f64], k: usize) -> Vec<usize> {
    let mut idx: Vec<usize> = (0..scores.len()).collect();
    idx.sort_by(|&a, &b| scores[b].partial_cmp(&scores[a]).unwrap_or(std::cmp::Ordering::Equal).then(a.cmp(&b)));
    idx.truncate(k);
    idx
}

/// Gaps between consecutive sorted event times.
pub fn inter_event_intervals(mut times: Vec<f64>) -> Vec<f64> {
    times.sort_by(|a, b| a.partial_cmp(b).unwrap());
    times.windows(2).map(|w| w[1] - w[0]).collect()
}

/// First-order Markov transition counts: `counts[(from, to)]` for each
/// consecutive pair in `sequence`.
pub fn transition_counts<T: Eq + Hash + Clone>(sequence: &[T]) -> HashMap<(T, T), u32> {
    let mut counts = HashMap::new();
    for pair in sequence.windows(2) {
        *counts.entry((pair[0].clone(), pair[1].clone())).or_insert(0) += 1;
    }
    counts
}

/// Ordinary least-squares slope of `y` against `0..y.len()`, used for
/// acceleration/trend scoring.
pub fn linear_slope(y: &[f64]) -> f64 {
    let n = y.len();
    if n < 2 {
        return 0.0;
    }
    let xs: Vec<f64> = (0..n).map(|i| i as f64).collect();
    let x_mean = mean(&xs);
    let y_mean = mean(y);
    let mut num = 0.0;
    let mut den = 0.0;
    for i in 0..n {
        num += (xs[i] - x_mean) * (y[i] - y_mean);
        den += (xs[i] - x_mean).powi(2);
    }
    if den == 0.0 {
        0.0
    } else {
        num / den
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn per_second_counts_buckets_correctly() {
        let counts = per_second_counts([0.1, 0.9, 1.5, 4.9], 5.0);
        assert_eq!(counts, vec![2, 1, 0, 0, 1]);
    }

    #[test]
    fn top_k_breaks_ties_by_index() {
        let scores = [1.0, 3.0, 3.0, 2.0];
        assert_eq!(top_k_indices(&scores, 2), vec![1, 2]);
    }

    #[test]
    fn linear_slope_detects_rising_trend() {
        let y = [1.0, 2.0, 3.0, 4.0, 5.0];
        assert!((linear_slope(&y) - 1.0).abs() < 1e-9);
    }

    #[test]
    fn variance_of_constant_series_is_zero() {
        assert_eq!(variance(&[2.0, 2.0, 2.0]), 0.0);
    }
}
