//! Ledger records: per-bar position and holdings snapshots, and the trade blotter.
//!
//! The symbol set is fixed when the portfolio is constructed, so every
//! snapshot carries exactly one entry per configured symbol.

use crate::domain::{Direction, FillEvent};
use chrono::NaiveDateTime;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// Signed position per symbol at a point in time.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PositionsSnapshot {
    pub datetime: NaiveDateTime,
    pub positions: BTreeMap<String, i64>,
}

impl PositionsSnapshot {
    pub fn flat(datetime: NaiveDateTime, symbols: &[String]) -> Self {
        Self {
            datetime,
            positions: symbols.iter().map(|s| (s.clone(), 0)).collect(),
        }
    }

    pub fn get(&self, symbol: &str) -> i64 {
        self.positions.get(symbol).copied().unwrap_or(0)
    }
}

/// Market value per symbol plus account aggregates at a point in time.
///
/// `total` is `cash + sum(values)`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct HoldingsSnapshot {
    pub datetime: NaiveDateTime,
    pub values: BTreeMap<String, f64>,
    pub cash: f64,
    /// Cumulative commission paid.
    pub commission: f64,
    pub total: f64,
}

impl HoldingsSnapshot {
    pub fn all_cash(datetime: NaiveDateTime, symbols: &[String], cash: f64) -> Self {
        Self {
            datetime,
            values: symbols.iter().map(|s| (s.clone(), 0.0)).collect(),
            cash,
            commission: 0.0,
            total: cash,
        }
    }

    pub fn get(&self, symbol: &str) -> f64 {
        self.values.get(symbol).copied().unwrap_or(0.0)
    }

    /// Market value of all positions.
    pub fn market_value(&self) -> f64 {
        self.values.values().sum()
    }
}

/// One row of the trade blotter, one per fill.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TradeRecord {
    pub datetime: NaiveDateTime,
    pub symbol: String,
    pub exchange: String,
    pub quantity: u64,
    pub direction: Direction,
    pub fill_price: f64,
    pub commission: f64,
}

impl From<&FillEvent> for TradeRecord {
    fn from(fill: &FillEvent) -> Self {
        Self {
            datetime: fill.timeindex,
            symbol: fill.symbol.clone(),
            exchange: fill.exchange.clone(),
            quantity: fill.quantity,
            direction: fill.direction,
            fill_price: fill.fill_price,
            commission: fill.commission,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;

    fn ts() -> NaiveDateTime {
        NaiveDate::from_ymd_opt(2015, 4, 8)
            .unwrap()
            .and_hms_opt(0, 0, 0)
            .unwrap()
    }

    fn symbols() -> Vec<String> {
        vec!["600008".into(), "000001".into()]
    }

    #[test]
    fn initial_snapshots_cover_every_symbol() {
        let positions = PositionsSnapshot::flat(ts(), &symbols());
        assert_eq!(positions.positions.len(), 2);
        assert_eq!(positions.get("600008"), 0);

        let holdings = HoldingsSnapshot::all_cash(ts(), &symbols(), 100_000.0);
        assert_eq!(holdings.values.len(), 2);
        assert_eq!(holdings.total, 100_000.0);
        assert_eq!(holdings.market_value(), 0.0);
        assert_eq!(holdings.get("unknown"), 0.0);
    }

    #[test]
    fn trade_record_copies_fill() {
        let fill = FillEvent {
            timeindex: ts(),
            symbol: "600008".into(),
            exchange: "SimulatedExchange".into(),
            quantity: 100,
            direction: Direction::Sell,
            fill_price: 10.0,
            commission: 7.0,
        };
        let trade = TradeRecord::from(&fill);
        assert_eq!(trade.datetime, ts());
        assert_eq!(trade.direction, Direction::Sell);
        assert_eq!(trade.commission, 7.0);
    }
}
