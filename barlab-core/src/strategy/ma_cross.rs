//! Moving average crossover: golden cross enters, death cross exits.
//!
//! On each bar the strategy takes the last `long_window` closes for the
//! symbol and computes both averages over that window with a shrinking
//! start (`min_periods = 1`). A cross is a strict sign change of
//! `long - short` between the previous and the current value.
//!
//! Long only. Whether the strategy "holds" a symbol is tracked internally
//! and is independent of the portfolio's actual position.

use super::Strategy;
use crate::data::DataHandler;
use crate::domain::{Bar, Event, SignalEvent, SignalType};
use crate::engine::EventQueue;
use crate::error::EngineError;
use crate::indicators::{Indicator, Sma};
use std::collections::HashMap;
use tracing::debug;

pub const DEFAULT_LONG_WINDOW: usize = 10;
pub const DEFAULT_SHORT_WINDOW: usize = 5;

#[derive(Debug, Clone)]
pub struct MovingAverageCross {
    long_window: usize,
    short_window: usize,
    long_ma: Sma,
    short_ma: Sma,
    bought: HashMap<String, bool>,
}

impl MovingAverageCross {
    /// Both windows must be positive. `short_window < long_window` is not
    /// enforced; inverted windows produce inverted signals.
    pub fn new(long_window: usize, short_window: usize) -> Result<Self, EngineError> {
        if long_window == 0 || short_window == 0 {
            return Err(EngineError::InvalidParameter(format!(
                "moving average windows must be positive (long={long_window}, short={short_window})"
            )));
        }
        Ok(Self {
            long_window,
            short_window,
            long_ma: Sma::with_min_periods(long_window, 1),
            short_ma: Sma::with_min_periods(short_window, 1),
            bought: HashMap::new(),
        })
    }

    pub fn long_window(&self) -> usize {
        self.long_window
    }

    pub fn short_window(&self) -> usize {
        self.short_window
    }

    /// Whether the strategy considers `symbol` held.
    pub fn is_bought(&self, symbol: &str) -> bool {
        self.bought.get(symbol).copied().unwrap_or(false)
    }
}

impl Default for MovingAverageCross {
    fn default() -> Self {
        Self {
            long_window: DEFAULT_LONG_WINDOW,
            short_window: DEFAULT_SHORT_WINDOW,
            long_ma: Sma::with_min_periods(DEFAULT_LONG_WINDOW, 1),
            short_ma: Sma::with_min_periods(DEFAULT_SHORT_WINDOW, 1),
            bought: HashMap::new(),
        }
    }
}

impl Strategy for MovingAverageCross {
    fn name(&self) -> &str {
        "ma_cross"
    }

    fn calculate_signals(
        &mut self,
        bar: &Bar,
        data: &dyn DataHandler,
        queue: &mut EventQueue,
    ) -> Result<(), EngineError> {
        let bars = data.get_latest_bars(&bar.symbol, self.long_window);
        // Warm-up. A cross also needs a previous value.
        if bars.len() < self.long_window.max(2) {
            return Ok(());
        }

        let long = self.long_ma.compute(bars);
        let short = self.short_ma.compute(bars);
        let n = bars.len();
        let (long_prev, long_cur) = (long[n - 2], long[n - 1]);
        let (short_prev, short_cur) = (short[n - 2], short[n - 1]);

        let held = self.is_bought(&bar.symbol);
        let signal_type = if long_cur < short_cur && long_prev > short_prev && !held {
            SignalType::Long
        } else if long_cur > short_cur && long_prev < short_prev && held {
            SignalType::Exit
        } else {
            return Ok(());
        };

        let last = &bars[n - 1];
        debug!(symbol = %last.symbol, %signal_type, long_cur, short_cur, "crossover");
        queue.push(Event::Signal(SignalEvent::new(
            last.symbol.clone(),
            last.timestamp,
            signal_type,
        )));
        self.bought
            .insert(last.symbol.clone(), signal_type == SignalType::Long);
        Ok(())
    }
}
