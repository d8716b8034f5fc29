//! Events exchanged between the data handler, strategy, portfolio and
//! execution handler.
//!
//! Events carry no identity beyond their payload. Each variant is consumed by
//! exactly one dispatch target in the backtest driver:
//!
//! | Event    | Consumer                                             |
//! |----------|------------------------------------------------------|
//! | `Bar`    | `Strategy::calculate_signals`, then `Portfolio::update_timeindex` |
//! | `Signal` | `Portfolio::update_signal`                           |
//! | `Order`  | `ExecutionHandler::execute_order`                    |
//! | `Fill`   | `Portfolio::update_fill`                             |

use super::bar::Bar;
use crate::error::EngineError;
use chrono::NaiveDateTime;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Tagged union of all engine messages.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum Event {
    Bar(Bar),
    Signal(SignalEvent),
    Order(OrderEvent),
    Fill(FillEvent),
}

impl Event {
    /// Short tag used in log lines.
    pub fn kind(&self) -> &'static str {
        match self {
            Event::Bar(_) => "BAR",
            Event::Signal(_) => "SIGNAL",
            Event::Order(_) => "ORDER",
            Event::Fill(_) => "FILL",
        }
    }

    pub fn symbol(&self) -> &str {
        match self {
            Event::Bar(bar) => &bar.symbol,
            Event::Signal(signal) => &signal.symbol,
            Event::Order(order) => &order.symbol,
            Event::Fill(fill) => &fill.symbol,
        }
    }
}

/// Strategy intent for a symbol.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum SignalType {
    Long,
    Short,
    Exit,
}

impl SignalType {
    pub fn as_str(&self) -> &'static str {
        match self {
            SignalType::Long => "LONG",
            SignalType::Short => "SHORT",
            SignalType::Exit => "EXIT",
        }
    }
}

impl fmt::Display for SignalType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Parsing is strict: an unrecognized signal type is a broken strategy, not
/// something to skip.
impl FromStr for SignalType {
    type Err = EngineError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "LONG" => Ok(SignalType::Long),
            "SHORT" => Ok(SignalType::Short),
            "EXIT" => Ok(SignalType::Exit),
            other => Err(EngineError::UnknownSignalType(other.to_string())),
        }
    }
}

/// Trade direction of an order or fill.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum Direction {
    Buy,
    Sell,
}

impl Direction {
    /// +1 for buys, -1 for sells.
    pub fn sign(&self) -> i64 {
        match self {
            Direction::Buy => 1,
            Direction::Sell => -1,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Direction::Buy => "BUY",
            Direction::Sell => "SELL",
        }
    }
}

impl fmt::Display for Direction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Market or limit. The simulated execution handler fills both at the
/// latest close; the distinction is kept for handlers that model it.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum OrderType {
    Market,
    Limit,
}

/// Emitted by a strategy, consumed by the portfolio.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SignalEvent {
    pub symbol: String,
    pub timestamp: NaiveDateTime,
    pub signal_type: SignalType,
    pub strategy_id: u32,
    /// Sizing hint in (0, 1].
    pub strength: f64,
}

impl SignalEvent {
    /// Signal with the default strategy id (1) and full strength.
    pub fn new(symbol: impl Into<String>, timestamp: NaiveDateTime, signal_type: SignalType) -> Self {
        Self {
            symbol: symbol.into(),
            timestamp,
            signal_type,
            strategy_id: 1,
            strength: 1.0,
        }
    }

    pub fn with_strength(mut self, strength: f64) -> Self {
        self.strength = strength;
        self
    }

    pub fn with_strategy_id(mut self, strategy_id: u32) -> Self {
        self.strategy_id = strategy_id;
        self
    }
}

/// Emitted by the portfolio, consumed by the execution handler.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct OrderEvent {
    pub symbol: String,
    pub order_type: OrderType,
    pub quantity: u64,
    pub direction: Direction,
}

impl OrderEvent {
    pub fn market(symbol: impl Into<String>, quantity: u64, direction: Direction) -> Self {
        Self {
            symbol: symbol.into(),
            order_type: OrderType::Market,
            quantity,
            direction,
        }
    }
}

/// A completed, full-quantity simulated trade.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FillEvent {
    pub timeindex: NaiveDateTime,
    pub symbol: String,
    pub exchange: String,
    pub quantity: u64,
    pub direction: Direction,
    pub fill_price: f64,
    pub commission: f64,
}

impl FillEvent {
    /// Signed cash cost of the trade before commission: positive for buys.
    pub fn cost(&self) -> f64 {
        self.direction.sign() as f64 * self.fill_price * self.quantity as f64
    }

    /// Signed change in position.
    pub fn position_delta(&self) -> i64 {
        self.direction.sign() * self.quantity as i64
    }
}
