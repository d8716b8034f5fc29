//! Strategies: bar history in, Signal events out.
//!
//! A strategy sees the bar that triggered it and read-only access to the
//! released history through the data handler. It never sees the portfolio;
//! any position bookkeeping it needs is its own.

pub mod buy_and_hold;
pub mod ma_cross;

pub use buy_and_hold::BuyAndHold;
pub use ma_cross::MovingAverageCross;

use crate::data::DataHandler;
use crate::domain::Bar;
use crate::engine::EventQueue;
use crate::error::EngineError;

/// Signal generator invoked once per `Bar` event.
pub trait Strategy {
    /// Strategy name (for logging and reports).
    fn name(&self) -> &str;

    /// Inspect `bar` and the released history, pushing zero or more `Signal` events.
    fn calculate_signals(
        &mut self,
        bar: &Bar,
        data: &dyn DataHandler,
        queue: &mut EventQueue,
    ) -> Result<(), EngineError>;
}
