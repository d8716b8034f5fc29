//! Simulated execution: Order in, Fill out.
//!
//! Orders fill in full at the latest released close for the symbol, moved by
//! slippage, with commission computed on the adjusted price. Only released
//! bars are visible through the data handler, so a fill can never see a
//! future price.

use super::commission::{CommissionModel, ZeroCommission};
use super::slippage::{SlippageModel, ZeroSlippage};
use crate::data::DataHandler;
use crate::domain::{Event, FillEvent, OrderEvent};
use crate::engine::EventQueue;
use crate::error::EngineError;
use tracing::debug;

/// Exchange name stamped on simulated fills.
pub const SIMULATED_EXCHANGE: &str = "SimulatedExchange";

/// Converts orders into fills.
pub trait ExecutionHandler {
    /// Emit exactly one `Fill` for `order`.
    fn execute_order(
        &mut self,
        order: &OrderEvent,
        data: &dyn DataHandler,
        queue: &mut EventQueue,
    ) -> Result<(), EngineError>;
}

/// Instant full fills at the latest close.
///
/// Both market and limit orders are filled this way.
pub struct SimulatedExecutionHandler {
    slippage: Box<dyn SlippageModel>,
    commission: Box<dyn CommissionModel>,
}

impl SimulatedExecutionHandler {
    pub fn new(slippage: Box<dyn SlippageModel>, commission: Box<dyn CommissionModel>) -> Self {
        Self {
            slippage,
            commission,
        }
    }

    /// No slippage, no fees.
    pub fn frictionless() -> Self {
        Self::new(Box::new(ZeroSlippage), Box::new(ZeroCommission))
    }

    pub fn slippage_name(&self) -> &str {
        self.slippage.name()
    }

    pub fn commission_name(&self) -> &str {
        self.commission.name()
    }
}

impl std::fmt::Debug for SimulatedExecutionHandler {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SimulatedExecutionHandler")
            .field("slippage", &self.slippage.name())
            .field("commission", &self.commission.name())
            .finish()
    }
}

impl ExecutionHandler for SimulatedExecutionHandler {
    fn execute_order(
        &mut self,
        order: &OrderEvent,
        data: &dyn DataHandler,
        queue: &mut EventQueue,
    ) -> Result<(), EngineError> {
        let bar = data
            .get_latest_bar(&order.symbol)
            .ok_or_else(|| EngineError::NoMarketData {
                symbol: order.symbol.clone(),
            })?;

        let fill_price = self.slippage.trade_price(bar.close, order.direction);
        let commission = self
            .commission
            .compute(&order.symbol, order.direction, order.quantity, fill_price);

        debug!(
            symbol = %order.symbol,
            direction = %order.direction,
            quantity = order.quantity,
            fill_price,
            commission,
            "order filled"
        );

        queue.push(Event::Fill(FillEvent {
            timeindex: bar.timestamp,
            symbol: order.symbol.clone(),
            exchange: SIMULATED_EXCHANGE.to_string(),
            quantity: order.quantity,
            direction: order.direction,
            fill_price,
            commission,
        }));
        Ok(())
    }
}
