//! Backtest driver: pumps the data handler and drains the event queue.
//!
//! Loop:
//! 1. `Running`: stop if the data handler is exhausted, otherwise release one
//!    bar per symbol and move to `DrainingEvents`.
//! 2. `DrainingEvents`: pop events FIFO and dispatch by type until the queue
//!    is empty, then go back to `Running`. Events pushed while draining are
//!    handled in the same drain, before the next bar is released.
//! 3. `Finished`: terminal.
//!
//! Dispatch:
//! - `Bar` → strategy, then portfolio mark-to-market
//! - `Signal` → portfolio order generation
//! - `Order` → execution
//! - `Fill` → portfolio ledger update

use super::output::{BacktestOutput, EventCounters};
use super::queue::EventQueue;
use crate::data::DataHandler;
use crate::domain::Event;
use crate::error::EngineError;
use crate::execution::ExecutionHandler;
use crate::portfolio::Portfolio;
use crate::strategy::Strategy;
use serde::{Deserialize, Serialize};
use tracing::{debug, info};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum BacktestState {
    Running,
    DrainingEvents,
    Finished,
}

/// Owns the event queue and the four collaborators for one run.
pub struct Backtest {
    data: Box<dyn DataHandler>,
    strategy: Box<dyn Strategy>,
    portfolio: Box<dyn Portfolio>,
    execution: Box<dyn ExecutionHandler>,
    queue: EventQueue,
    state: BacktestState,
    counters: EventCounters,
}

impl Backtest {
    pub fn new(
        data: Box<dyn DataHandler>,
        strategy: Box<dyn Strategy>,
        portfolio: Box<dyn Portfolio>,
        execution: Box<dyn ExecutionHandler>,
    ) -> Self {
        Self {
            data,
            strategy,
            portfolio,
            execution,
            queue: EventQueue::new(),
            state: BacktestState::Running,
            counters: EventCounters::default(),
        }
    }

    pub fn state(&self) -> BacktestState {
        self.state
    }

    pub fn counters(&self) -> EventCounters {
        self.counters
    }

    /// Run to completion and return the de-duplicated ledger history.
    ///
    /// Any error from a collaborator aborts the run. Calling `run` on a
    /// finished backtest returns the same output again.
    pub fn run(&mut self) -> Result<BacktestOutput, EngineError> {
        if self.state != BacktestState::Finished {
            info!(
                strategy = self.strategy.name(),
                symbols = self.data.symbols().len(),
                "backtest started"
            );
        }

        while self.step()? {}

        Ok(self.output())
    }

    /// Advance the state machine by one transition or dispatch.
    ///
    /// Returns false once the backtest is finished.
    pub fn step(&mut self) -> Result<bool, EngineError> {
        match self.state {
            BacktestState::Running => {
                if self.data.continue_backtest() {
                    self.data.update_bars(&mut self.queue);
                    self.state = BacktestState::DrainingEvents;
                } else {
                    self.state = BacktestState::Finished;
                    let c = self.counters;
                    info!(
                        bars = c.bars,
                        signals = c.signals,
                        orders = c.orders,
                        fills = c.fills,
                        "backtest finished"
                    );
                }
            }
            BacktestState::DrainingEvents => match self.queue.pop() {
                Some(event) => self.dispatch(event)?,
                None => self.state = BacktestState::Running,
            },
            BacktestState::Finished => return Ok(false),
        }
        Ok(self.state != BacktestState::Finished)
    }

    fn dispatch(&mut self, event: Event) -> Result<(), EngineError> {
        debug!(kind = event.kind(), symbol = event.symbol(), "dispatch");
        match event {
            Event::Bar(bar) => {
                self.counters.bars += 1;
                self.strategy
                    .calculate_signals(&bar, &*self.data, &mut self.queue)?;
                self.portfolio.update_timeindex(&bar, &*self.data);
            }
            Event::Signal(signal) => {
                self.counters.signals += 1;
                self.portfolio
                    .update_signal(&signal, &*self.data, &mut self.queue)?;
            }
            Event::Order(order) => {
                self.counters.orders += 1;
                self.execution
                    .execute_order(&order, &*self.data, &mut self.queue)?;
            }
            Event::Fill(fill) => {
                self.counters.fills += 1;
                self.portfolio.update_fill(&fill)?;
            }
        }
        Ok(())
    }

    fn output(&self) -> BacktestOutput {
        BacktestOutput::new(
            self.portfolio.all_positions().to_vec(),
            self.portfolio.all_holdings().to_vec(),
            self.portfolio.all_trades().to_vec(),
            self.counters,
        )
    }
}
