//! Portfolio: position and cash accounting.
//!
//! The portfolio is the single writer of ledger state. It turns signals into
//! orders, applies fills, and snapshots the book once per bar.

pub mod naive;
pub mod sizing;
pub mod snapshot;

pub use naive::{NaivePortfolio, DEFAULT_INITIAL_CAPITAL};
pub use sizing::{OrderSizing, SizingContext};
pub use snapshot::{HoldingsSnapshot, PositionsSnapshot, TradeRecord};

use crate::data::DataHandler;
use crate::domain::{Bar, FillEvent, SignalEvent};
use crate::engine::EventQueue;
use crate::error::EngineError;

pub trait Portfolio {
    /// Mark to market after the strategy has seen `bar`, appending one row
    /// to the position and holdings history.
    fn update_timeindex(&mut self, bar: &Bar, data: &dyn DataHandler);

    /// Translate a signal into at most one `Order` event.
    fn update_signal(
        &mut self,
        signal: &SignalEvent,
        data: &dyn DataHandler,
        queue: &mut EventQueue,
    ) -> Result<(), EngineError>;

    /// Apply a fill to positions, cash and the trade log.
    fn update_fill(&mut self, fill: &FillEvent) -> Result<(), EngineError>;

    /// Position history, starting with the initial row.
    fn all_positions(&self) -> &[PositionsSnapshot];

    /// Holdings history, starting with the initial row.
    fn all_holdings(&self) -> &[HoldingsSnapshot];

    /// Trade blotter, one row per fill.
    fn all_trades(&self) -> &[TradeRecord];
}
