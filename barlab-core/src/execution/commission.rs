//! Commission models: fees and taxes charged on a fill.
//!
//! The building blocks are pure functions of a rate and an amount with a
//! floor. Market schedules compose them additively.
//!
//! Default Chinese-market schedule (`cost = fill_price * quantity`):
//!
//! | Market            | Buy                          | Sell                                   |
//! |-------------------|------------------------------|----------------------------------------|
//! | Shanghai equity   | transfer fee + brokerage     | stamp tax + transfer fee + brokerage   |
//! | Shenzhen equity   | brokerage                    | stamp tax + brokerage                  |
//! | Index futures     | `cost * 3e-5`                | `cost * 3e-5`                          |
//! | Commodity futures | `cost * 1.5e-4`              | `cost * 1.5e-4`                        |
//! | Unknown           | 0                            | 0                                      |

use crate::domain::{Direction, MarketKind};
use tracing::warn;

/// Fee proportional to share count, rounded up to a whole currency unit.
///
/// Used for the Shanghai transfer fee: 1 yuan per 1000 shares, at least 1 yuan.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PerShareCommission {
    pub rate: f64,
    pub min_commission: f64,
}

impl PerShareCommission {
    pub fn new(rate: f64, min_commission: f64) -> Self {
        Self {
            rate,
            min_commission,
        }
    }

    pub fn compute(&self, quantity: u64) -> f64 {
        (quantity as f64 * self.rate).ceil().max(self.min_commission)
    }
}

/// Fee proportional to traded value, with a floor.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PerMoneyCommission {
    pub rate: f64,
    pub min_commission: f64,
}

impl PerMoneyCommission {
    pub fn new(rate: f64, min_commission: f64) -> Self {
        Self {
            rate,
            min_commission,
        }
    }

    /// Rate with no floor.
    pub fn flat(rate: f64) -> Self {
        Self::new(rate, 0.0)
    }

    pub fn compute(&self, cost: f64) -> f64 {
        (cost * self.rate).max(self.min_commission)
    }
}

/// Commission model: computes the fee for a fill.
pub trait CommissionModel: Send + Sync {
    /// Fee for trading `quantity` of `symbol` at `fill_price` (already slippage-adjusted).
    ///
    /// Must never be negative.
    fn compute(&self, symbol: &str, direction: Direction, quantity: u64, fill_price: f64) -> f64;

    /// Name of this model
    fn name(&self) -> &str;
}

/// No fees.
#[derive(Debug, Clone, Copy, Default)]
pub struct ZeroCommission;

impl CommissionModel for ZeroCommission {
    fn compute(&self, _symbol: &str, _direction: Direction, _quantity: u64, _fill_price: f64) -> f64 {
        0.0
    }

    fn name(&self) -> &str {
        "zero"
    }
}

/// Default schedule for Shanghai/Shenzhen equities and domestic futures.
#[derive(Debug, Clone, Copy)]
pub struct ChinaMarketCommission {
    pub transfer_fee: PerShareCommission,
    pub brokerage: PerMoneyCommission,
    pub stamp_tax: PerMoneyCommission,
    pub index_future: PerMoneyCommission,
    pub commodity_future: PerMoneyCommission,
}

impl Default for ChinaMarketCommission {
    fn default() -> Self {
        Self {
            transfer_fee: PerShareCommission::new(1.0e-4, 1.0),
            brokerage: PerMoneyCommission::new(3.0e-4, 5.0),
            stamp_tax: PerMoneyCommission::flat(1.0e-3),
            index_future: PerMoneyCommission::flat(3.0e-5),
            commodity_future: PerMoneyCommission::flat(1.5e-4),
        }
    }
}

impl CommissionModel for ChinaMarketCommission {
    fn compute(&self, symbol: &str, direction: Direction, quantity: u64, fill_price: f64) -> f64 {
        let cost = fill_price * quantity as f64;
        match (MarketKind::of(symbol), direction) {
            (MarketKind::ShanghaiEquity, Direction::Buy) => {
                self.transfer_fee.compute(quantity) + self.brokerage.compute(cost)
            }
            (MarketKind::ShanghaiEquity, Direction::Sell) => {
                self.stamp_tax.compute(cost)
                    + self.transfer_fee.compute(quantity)
                    + self.brokerage.compute(cost)
            }
            (MarketKind::ShenzhenEquity, Direction::Buy) => self.brokerage.compute(cost),
            (MarketKind::ShenzhenEquity, Direction::Sell) => {
                self.stamp_tax.compute(cost) + self.brokerage.compute(cost)
            }
            (MarketKind::IndexFuture, _) => self.index_future.compute(cost),
            (MarketKind::CommodityFuture, _) => self.commodity_future.compute(cost),
            (MarketKind::Unknown, _) => 0.0,
        }
    }

    fn name(&self) -> &str {
        "default"
    }
}

/// Build a commission model from its configured name.
///
/// Unknown names fall back to [`ZeroCommission`] with a warning rather than
/// failing. Trades will be priced without fees in that case.
pub fn commission_model_from_name(name: &str) -> Box<dyn CommissionModel> {
    match name {
        "default" => Box::new(ChinaMarketCommission::default()),
        "zero" => Box::new(ZeroCommission),
        other => {
            warn!(model = other, "unknown commission model, falling back to zero commission");
            Box::new(ZeroCommission)
        }
    }
}
