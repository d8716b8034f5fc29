//! Data handlers: chronological replay of bars into the event queue.

use super::align::{align_symbols, AlignedData};
use crate::domain::{Bar, Event};
use crate::engine::EventQueue;
use crate::error::EngineError;
use chrono::NaiveDateTime;
use std::collections::HashMap;

/// Source of market data for the backtest loop.
///
/// Lookups for unknown symbols are not errors: they return an empty slice or
/// `None`, and callers are expected to check.
pub trait DataHandler {
    /// Configured symbols, in order.
    fn symbols(&self) -> &[String];

    /// False once the shared timeline is used up.
    fn continue_backtest(&self) -> bool;

    /// Advance one timeline step, pushing one `Bar` event per symbol that has
    /// a bar at that step.
    fn update_bars(&mut self, queue: &mut EventQueue);

    /// Up to the last `n` bars released for `symbol`, oldest first.
    fn get_latest_bars(&self, symbol: &str, n: usize) -> &[Bar];

    /// Most recently released bar for `symbol`.
    fn get_latest_bar(&self, symbol: &str) -> Option<&Bar> {
        self.get_latest_bars(symbol, 1).last()
    }

    /// Timestamp of the most recently released bar for `symbol`.
    fn get_latest_bar_datetime(&self, symbol: &str) -> Option<NaiveDateTime> {
        self.get_latest_bar(symbol).map(|b| b.timestamp)
    }
}

/// Replays pre-parsed, aligned historical bars.
///
/// One step counter walks the shared timeline. A symbol whose series starts
/// `offset` steps into the timeline releases nothing until the step passes
/// that offset; after that its released history is `series[..step - offset]`.
#[derive(Debug, Clone)]
pub struct HistoricBarHandler {
    symbols: Vec<String>,
    series: Vec<Vec<Bar>>,
    offsets: Vec<usize>,
    index: HashMap<String, usize>,
    timeline_len: usize,
    step: usize,
    continue_backtest: bool,
}

impl HistoricBarHandler {
    /// Align `series` to the union timeline of `symbols` and prepare replay.
    pub fn new(symbols: &[String], series: HashMap<String, Vec<Bar>>) -> Result<Self, EngineError> {
        let aligned = align_symbols(symbols, series)?;
        Ok(Self::from_aligned(aligned))
    }

    pub fn from_aligned(mut aligned: AlignedData) -> Self {
        let symbols = aligned.symbols.clone();
        let timeline_len = aligned.timeline.len();
        let offsets = symbols.iter().map(|s| aligned.leading_gap(s)).collect();
        let series: Vec<Vec<Bar>> = symbols
            .iter()
            .map(|s| aligned.bars.remove(s).unwrap_or_default())
            .collect();
        let index = symbols
            .iter()
            .enumerate()
            .map(|(i, s)| (s.clone(), i))
            .collect();
        Self {
            symbols,
            series,
            offsets,
            index,
            timeline_len,
            step: 0,
            continue_backtest: timeline_len > 0,
        }
    }

    /// Number of timeline steps the replay will take.
    pub fn bar_count(&self) -> usize {
        self.timeline_len
    }

    fn released(&self, i: usize) -> &[Bar] {
        let count = self.step.saturating_sub(self.offsets[i]);
        &self.series[i][..count.min(self.series[i].len())]
    }
}

impl DataHandler for HistoricBarHandler {
    fn symbols(&self) -> &[String] {
        &self.symbols
    }

    fn continue_backtest(&self) -> bool {
        self.continue_backtest
    }

    fn update_bars(&mut self, queue: &mut EventQueue) {
        if self.step >= self.timeline_len {
            self.continue_backtest = false;
            return;
        }
        let step = self.step;
        for (bars, &offset) in self.series.iter().zip(&self.offsets) {
            if let Some(bar) = step.checked_sub(offset).and_then(|k| bars.get(k)) {
                queue.push(Event::Bar(bar.clone()));
            }
        }
        self.step += 1;
        if self.step >= self.timeline_len {
            self.continue_backtest = false;
        }
    }

    fn get_latest_bars(&self, symbol: &str, n: usize) -> &[Bar] {
        match self.index.get(symbol) {
            Some(&i) => {
                let released = self.released(i);
                &released[released.len().saturating_sub(n)..]
            }
            None => &[],
        }
    }
}
