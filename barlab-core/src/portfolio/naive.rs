//! Cash and position ledger with per-bar snapshots.

use super::sizing::{OrderSizing, SizingContext};
use super::snapshot::{HoldingsSnapshot, PositionsSnapshot, TradeRecord};
use super::Portfolio;
use crate::data::DataHandler;
use crate::domain::{Bar, Event, FillEvent, SignalEvent};
use crate::engine::EventQueue;
use crate::error::EngineError;
use chrono::NaiveDateTime;
use tracing::debug;

pub const DEFAULT_INITIAL_CAPITAL: f64 = 100_000.0;

/// Portfolio that sizes orders with an [`OrderSizing`] policy and never
/// applies risk limits.
///
/// Current state is kept in one positions record and one holdings record.
/// `update_timeindex` marks holdings to the latest closes and appends copies
/// of both to the history. Fills adjust the current records incrementally:
/// symbol holdings move by the signed trade cost until the next mark.
#[derive(Debug, Clone)]
pub struct NaivePortfolio {
    symbols: Vec<String>,
    sizing: OrderSizing,
    current_positions: PositionsSnapshot,
    current_holdings: HoldingsSnapshot,
    all_positions: Vec<PositionsSnapshot>,
    all_holdings: Vec<HoldingsSnapshot>,
    all_trades: Vec<TradeRecord>,
}

impl NaivePortfolio {
    pub fn new(
        symbols: &[String],
        start_date: NaiveDateTime,
        initial_capital: f64,
        sizing: OrderSizing,
    ) -> Result<Self, EngineError> {
        if symbols.is_empty() {
            return Err(EngineError::EmptyUniverse);
        }
        if !(initial_capital.is_finite() && initial_capital > 0.0) {
            return Err(EngineError::InvalidParameter(format!(
                "initial capital must be positive, got {initial_capital}"
            )));
        }

        let positions = PositionsSnapshot::flat(start_date, symbols);
        let holdings = HoldingsSnapshot::all_cash(start_date, symbols, initial_capital);
        Ok(Self {
            symbols: symbols.to_vec(),
            sizing,
            all_positions: vec![positions.clone()],
            all_holdings: vec![holdings.clone()],
            current_positions: positions,
            current_holdings: holdings,
            all_trades: Vec::new(),
        })
    }

    pub fn current_positions(&self) -> &PositionsSnapshot {
        &self.current_positions
    }

    pub fn current_holdings(&self) -> &HoldingsSnapshot {
        &self.current_holdings
    }

    fn ensure_known(&self, symbol: &str) -> Result<(), EngineError> {
        if self.current_positions.positions.contains_key(symbol) {
            Ok(())
        } else {
            Err(EngineError::UnknownSymbol {
                symbol: symbol.to_string(),
            })
        }
    }
}

impl Portfolio for NaivePortfolio {
    fn update_timeindex(&mut self, bar: &Bar, data: &dyn DataHandler) {
        let datetime = bar.timestamp;
        let holdings = &mut self.current_holdings;
        let mut total = holdings.cash;
        for symbol in &self.symbols {
            let position = self.current_positions.get(symbol);
            let value = match data.get_latest_bar(symbol) {
                Some(latest) => position as f64 * latest.close,
                None => holdings.get(symbol),
            };
            holdings.values.insert(symbol.clone(), value);
            total += value;
        }
        holdings.total = total;
        holdings.datetime = datetime;
        self.current_positions.datetime = datetime;

        self.all_positions.push(self.current_positions.clone());
        self.all_holdings.push(self.current_holdings.clone());
    }

    fn update_signal(
        &mut self,
        signal: &SignalEvent,
        data: &dyn DataHandler,
        queue: &mut EventQueue,
    ) -> Result<(), EngineError> {
        self.ensure_known(&signal.symbol)?;
        let ctx = SizingContext {
            position: self.current_positions.get(&signal.symbol),
            holdings: self.current_holdings.get(&signal.symbol),
            total: self.current_holdings.total,
            price: data.get_latest_bar(&signal.symbol).map(|b| b.close),
        };
        match self.sizing.order_for(signal, &ctx)? {
            Some(order) => {
                debug!(
                    symbol = %order.symbol,
                    direction = %order.direction,
                    quantity = order.quantity,
                    signal = %signal.signal_type,
                    "order generated"
                );
                queue.push(Event::Order(order));
            }
            None => debug!(
                symbol = %signal.symbol,
                signal = %signal.signal_type,
                "signal produced no order"
            ),
        }
        Ok(())
    }

    fn update_fill(&mut self, fill: &FillEvent) -> Result<(), EngineError> {
        self.ensure_known(&fill.symbol)?;

        if let Some(position) = self.current_positions.positions.get_mut(&fill.symbol) {
            *position += fill.position_delta();
        }

        let cost = fill.cost();
        let holdings = &mut self.current_holdings;
        if let Some(value) = holdings.values.get_mut(&fill.symbol) {
            *value += cost;
        }
        holdings.commission += fill.commission;
        holdings.cash -= cost + fill.commission;
        holdings.total -= fill.commission;

        self.all_trades.push(TradeRecord::from(fill));
        Ok(())
    }

    fn all_positions(&self) -> &[PositionsSnapshot] {
        &self.all_positions
    }

    fn all_holdings(&self) -> &[HoldingsSnapshot] {
        &self.all_holdings
    }

    fn all_trades(&self) -> &[TradeRecord] {
        &self.all_trades
    }
}
