//! Performance statistics: pure functions over the equity curve.
//!
//! Read-only over a finished run's holdings; nothing here feeds back into
//! the event loop.

use barlab_core::engine::EquityPoint;
use serde::{Deserialize, Serialize};

/// Periods per year for daily bars.
pub const DAILY_PERIODS: usize = 252;

/// Summary statistics for a single run.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct PerformanceSummary {
    /// Final equity multiple minus one.
    pub total_return: f64,
    pub sharpe: f64,
    /// Largest `peak / equity - 1` seen, as a fraction.
    pub max_drawdown: f64,
    /// Bars between the peak and the trough of the largest drawdown.
    pub drawdown_duration: usize,
}

impl PerformanceSummary {
    pub fn compute(curve: &[EquityPoint], periods: usize) -> Self {
        let equity: Vec<f64> = curve.iter().map(|p| p.equity_curve).collect();
        // The first point has no prior total to compare against.
        let returns: Vec<f64> = curve.iter().skip(1).map(|p| p.returns).collect();
        let drawdown = max_drawdown(&equity);
        Self {
            total_return: total_return(&equity),
            sharpe: sharpe_ratio(&returns, periods),
            max_drawdown: drawdown.max_drawdown,
            drawdown_duration: drawdown.duration,
        }
    }
}

/// Largest drawdown of an equity series.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct Drawdown {
    pub max_drawdown: f64,
    /// Index of the high-water mark preceding the trough.
    pub peak: usize,
    /// Index of the trough.
    pub trough: usize,
    pub duration: usize,
}

/// `equity.last() - 1`, with the series expressed as a multiple of its start.
pub fn total_return(equity: &[f64]) -> f64 {
    equity.last().map_or(0.0, |last| last - 1.0)
}

/// Annualised Sharpe ratio against a zero benchmark.
///
/// `sqrt(periods) * mean / std`, population standard deviation.
/// Returns 0.0 for fewer than two returns or zero variance.
pub fn sharpe_ratio(returns: &[f64], periods: usize) -> f64 {
    if returns.len() < 2 {
        return 0.0;
    }
    let mean = mean_f64(returns);
    let std = population_std(returns);
    if std < 1e-15 {
        return 0.0;
    }
    (periods as f64).sqrt() * mean / std
}

/// Per-point drawdown `running_max / equity - 1`.
pub fn drawdown_series(equity: &[f64]) -> Vec<f64> {
    let mut peak = f64::NEG_INFINITY;
    equity
        .iter()
        .map(|&e| {
            peak = peak.max(e);
            if e > 0.0 {
                peak / e - 1.0
            } else {
                0.0
            }
        })
        .collect()
}

/// Largest drawdown and its peak-to-trough duration in bars.
///
/// Ties resolve to the earliest trough and the earliest peak.
pub fn max_drawdown(equity: &[f64]) -> Drawdown {
    let series = drawdown_series(equity);
    let mut trough = 0;
    for (i, &dd) in series.iter().enumerate() {
        if dd > series[trough] {
            trough = i;
        }
    }
    if trough == 0 {
        return Drawdown::default();
    }
    let mut peak = 0;
    for i in 0..trough {
        if equity[i] > equity[peak] {
            peak = i;
        }
    }
    Drawdown {
        max_drawdown: series[trough],
        peak,
        trough,
        duration: trough - peak,
    }
}

fn mean_f64(values: &[f64]) -> f64 {
    if values.is_empty() {
        return 0.0;
    }
    values.iter().sum::<f64>() / values.len() as f64
}

fn population_std(values: &[f64]) -> f64 {
    if values.is_empty() {
        return 0.0;
    }
    let mean = mean_f64(values);
    let variance = values.iter().map(|v| (v - mean).powi(2)).sum::<f64>() / values.len() as f64;
    variance.sqrt()
}
