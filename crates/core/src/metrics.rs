//! Statistics collected per trial and reduced per mode.
//!
//! This module provides:
//! - Rate computation with an explicit zero-denominator rule
//! - Mean and sample standard deviation over per-run rates
//! - Verdict-reason histograms
//!
//! # Thread Safety
//!
//! Nothing here is synchronized. Each trial owns its tallies and the runner
//! merges them sequentially.

use crate::receiver::Reason;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// `numerator / denominator`, or 0.0 when nothing was attempted.
pub fn rate(numerator: u64, denominator: u64) -> f64 {
    if denominator == 0 {
        0.0
    } else {
        numerator as f64 / denominator as f64
    }
}

/// Arithmetic mean; 0.0 for an empty series.
pub fn mean(values: &[f64]) -> f64 {
    if values.is_empty() {
        0.0
    } else {
        values.iter().sum::<f64>() / values.len() as f64
    }
}

/// Sample standard deviation (divides by n - 1); 0.0 below two samples.
pub fn sample_std_dev(values: &[f64]) -> f64 {
    if values.len() < 2 {
        return 0.0;
    }

    let m = mean(values);
    let variance = values.iter().map(|v| (v - m).powi(2)).sum::<f64>() / (values.len() - 1) as f64;
    variance.sqrt()
}

/// Mean and sample standard deviation of a rate series.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct RateSummary {
    pub mean: f64,
    pub std_dev: f64,
}

impl RateSummary {
    pub fn from_samples(values: &[f64]) -> Self {
        Self {
            mean: mean(values),
            std_dev: sample_std_dev(values),
        }
    }
}

/// Count of verdicts per reason.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ReasonCounts(BTreeMap<Reason, u64>);

impl ReasonCounts {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn record(&mut self, reason: Reason) {
        *self.0.entry(reason).or_insert(0) += 1;
    }

    pub fn get(&self, reason: Reason) -> u64 {
        self.0.get(&reason).copied().unwrap_or(0)
    }

    /// Total verdicts recorded.
    pub fn total(&self) -> u64 {
        self.0.values().sum()
    }

    /// Verdicts whose reason denotes acceptance.
    pub fn accepted(&self) -> u64 {
        self.0
            .iter()
            .filter(|(reason, _)| reason.is_accept())
            .map(|(_, count)| count)
            .sum()
    }

    pub fn merge(&mut self, other: &ReasonCounts) {
        for (reason, count) in &other.0 {
            *self.0.entry(*reason).or_insert(0) += count;
        }
    }

    pub fn iter(&self) -> impl Iterator<Item = (Reason, u64)> + '_ {
        self.0.iter().map(|(reason, count)| (*reason, *count))
    }
}
