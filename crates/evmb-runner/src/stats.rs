//! Timing summary

use serde::Serialize;

/// Summary of per-run timings, in milliseconds
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Summary {
    /// Number of samples
    pub runs: usize,
    /// Fastest run
    pub min: f64,
    /// Slowest run
    pub max: f64,
    /// Arithmetic mean
    pub mean: f64,
    /// Median (mean of the two middle samples for even counts)
    pub median: f64,
    /// 95th percentile, nearest-rank
    pub p95: f64,
}

impl Summary {
    /// Summarize `samples`; `None` when empty
    pub fn from_samples(samples: &[f64]) -> Option<Self> {
        if samples.is_empty() {
            return None;
        }
        let mut sorted = samples.to_vec();
        sorted.sort_by(f64::total_cmp);

        let n = sorted.len();
        let mean = sorted.iter().sum::<f64>() / n as f64;
        let median = if n % 2 == 0 {
            (sorted[n / 2 - 1] + sorted[n / 2]) / 2.0
        } else {
            sorted[n / 2]
        };
        let rank = ((n as f64) * 0.95).ceil() as usize;
        let p95 = sorted[rank.clamp(1, n) - 1];

        Some(Self {
            runs: n,
            min: sorted[0],
            max: sorted[n - 1],
            mean,
            median,
            p95,
        })
    }
}
