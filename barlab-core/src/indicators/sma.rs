//! Simple Moving Average (SMA).
//!
//! Rolling mean of close prices over a lookback window. With
//! `min_periods < period` the window shrinks at the start of the series, so
//! values exist before the window fills.

use super::Indicator;
use crate::domain::Bar;

#[derive(Debug, Clone)]
pub struct Sma {
    period: usize,
    min_periods: usize,
    name: String,
}

impl Sma {
    /// Full-window SMA: first valid value at index `period - 1`.
    pub fn new(period: usize) -> Self {
        Self::with_min_periods(period, period)
    }

    /// SMA that is defined once at least `min_periods` closes are available.
    pub fn with_min_periods(period: usize, min_periods: usize) -> Self {
        let period = period.max(1);
        Self {
            period,
            min_periods: min_periods.clamp(1, period),
            name: format!("sma_{period}"),
        }
    }
}

impl Indicator for Sma {
    fn name(&self) -> &str {
        &self.name
    }

    fn lookback(&self) -> usize {
        self.min_periods - 1
    }

    fn compute(&self, bars: &[Bar]) -> Vec<f64> {
        let closes: Vec<f64> = bars.iter().map(|b| b.close).collect();
        rolling_mean(&closes, self.period, self.min_periods)
    }
}

/// Trailing mean over `window` values, NaN until `min_periods` values are seen.
pub fn rolling_mean(values: &[f64], window: usize, min_periods: usize) -> Vec<f64> {
    let window = window.max(1);
    let mut result = Vec::with_capacity(values.len());
    let mut sum = 0.0;

    for i in 0..values.len() {
        sum += values[i];
        if i >= window {
            sum -= values[i - window];
        }
        let count = (i + 1).min(window);
        if count >= min_periods {
            result.push(sum / count as f64);
        } else {
            result.push(f64::NAN);
        }
    }

    result
}
