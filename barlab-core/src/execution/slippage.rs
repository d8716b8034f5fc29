//! Slippage models: adverse price adjustment at execution.
//!
//! Slippage is directional: buyers pay more, sellers receive less.

use crate::domain::Direction;
use tracing::warn;

/// Default fixed slippage, in percent of price.
pub const DEFAULT_SLIPPAGE_PERCENT: f64 = 0.1;

/// Slippage model: maps a reference price to the simulated trade price.
pub trait SlippageModel: Send + Sync {
    /// Trade price for an order in `direction` against reference `price`.
    fn trade_price(&self, price: f64, direction: Direction) -> f64;

    /// Name of this model
    fn name(&self) -> &str;
}

/// Fill at the reference price.
#[derive(Debug, Clone, Copy, Default)]
pub struct ZeroSlippage;

impl SlippageModel for ZeroSlippage {
    fn trade_price(&self, price: f64, _direction: Direction) -> f64 {
        price
    }

    fn name(&self) -> &str {
        "zero"
    }
}

/// Fixed fraction of price against the trader.
#[derive(Debug, Clone, Copy)]
pub struct FixedPercentSlippage {
    /// Slippage as a fraction (0.001 = 0.1%).
    rate: f64,
}

impl FixedPercentSlippage {
    /// `percent` is in percent units: 0.1 means 0.1% each way.
    pub fn new(percent: f64) -> Self {
        Self {
            rate: percent / 100.0,
        }
    }

    pub fn rate(&self) -> f64 {
        self.rate
    }
}

impl Default for FixedPercentSlippage {
    fn default() -> Self {
        Self::new(DEFAULT_SLIPPAGE_PERCENT)
    }
}

impl SlippageModel for FixedPercentSlippage {
    fn trade_price(&self, price: f64, direction: Direction) -> f64 {
        price + price * self.rate * direction.sign() as f64
    }

    fn name(&self) -> &str {
        "fixed"
    }
}

/// Build a slippage model from its configured name.
///
/// Unknown names fall back to [`ZeroSlippage`] with a warning.
pub fn slippage_model_from_name(name: &str, percent: f64) -> Box<dyn SlippageModel> {
    match name {
        "fixed" => Box::new(FixedPercentSlippage::new(percent)),
        "zero" => Box::new(ZeroSlippage),
        other => {
            warn!(model = other, "unknown slippage model, falling back to zero slippage");
            Box::new(ZeroSlippage)
        }
    }
}
