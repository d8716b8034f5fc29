//! Buy-and-hold: one LONG per symbol on its first bar, never exits.

use super::Strategy;
use crate::data::DataHandler;
use crate::domain::{Bar, Event, SignalEvent, SignalType};
use crate::engine::EventQueue;
use crate::error::EngineError;
use std::collections::HashSet;

#[derive(Debug, Clone, Default)]
pub struct BuyAndHold {
    bought: HashSet<String>,
}

impl BuyAndHold {
    pub fn new() -> Self {
        Self::default()
    }
}

impl Strategy for BuyAndHold {
    fn name(&self) -> &str {
        "buy_and_hold"
    }

    fn calculate_signals(
        &mut self,
        bar: &Bar,
        data: &dyn DataHandler,
        queue: &mut EventQueue,
    ) -> Result<(), EngineError> {
        if self.bought.contains(&bar.symbol) || data.get_latest_bar(&bar.symbol).is_none() {
            return Ok(());
        }
        queue.push(Event::Signal(SignalEvent::new(
            bar.symbol.clone(),
            bar.timestamp,
            SignalType::Long,
        )));
        self.bought.insert(bar.symbol.clone());
        Ok(())
    }
}
