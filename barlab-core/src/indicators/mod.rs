//! Indicators: pure functions from bar history to a value series.
//!
//! The engine does not depend on any indicator. Strategies use them to turn
//! released bar history into decisions.

pub mod sma;

pub use sma::{rolling_mean, Sma};

use crate::domain::Bar;

/// Indicator computed over a bar slice, one output value per input bar.
pub trait Indicator: Send + Sync {
    fn name(&self) -> &str;

    /// Bars needed before the first non-NaN value.
    fn lookback(&self) -> usize;

    fn compute(&self, bars: &[Bar]) -> Vec<f64>;
}

#[cfg(test)]
pub(crate) const DEFAULT_EPSILON: f64 = 1e-10;

#[cfg(test)]
pub(crate) fn assert_approx(actual: f64, expected: f64, epsilon: f64) {
    assert!(
        (actual - expected).abs() < epsilon,
        "expected {expected}, got {actual}"
    );
}

#[cfg(test)]
pub(crate) fn make_bars(closes: &[f64]) -> Vec<Bar> {
    use chrono::{Duration, NaiveDate};

    let base = NaiveDate::from_ymd_opt(2024, 1, 2)
        .unwrap()
        .and_hms_opt(0, 0, 0)
        .unwrap();
    closes
        .iter()
        .enumerate()
        .map(|(i, &close)| {
            Bar::new(
                "TEST",
                base + Duration::days(i as i64),
                close,
                close + 1.0,
                close - 1.0,
                close,
                1000.0,
            )
        })
        .collect()
}
