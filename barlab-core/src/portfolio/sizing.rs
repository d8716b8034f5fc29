//! Order sizing: turns a signal plus the current book into at most one order.
//!
//! Two policies, selected once per run and never blended:
//!
//! - `FixedLot`: one lot per entry, `signal.strength` is ignored.
//!
//! | signal | position | order          |
//! |--------|----------|----------------|
//! | LONG   | 0        | BUY `lot`      |
//! | LONG   | < 0      | BUY `2 * lot`  |
//! | SHORT  | 0        | SELL `lot`     |
//! | SHORT  | > 0      | SELL `2 * lot` |
//! | EXIT   | > 0      | SELL `|pos|`   |
//! | EXIT   | < 0      | BUY `|pos|`    |
//! | otherwise         || none           |
//!
//! - `Proportional`: target holdings are `total * strength`, signed by the
//!   signal. The order closes the gap between current and target market
//!   value, rounded down to whole lots for equities.

use crate::domain::{lot_size, Direction, MarketKind, OrderEvent, SignalEvent, SignalType};
use crate::error::EngineError;
use serde::{Deserialize, Serialize};

/// Book state for the signal's symbol at the time the signal is handled.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SizingContext {
    /// Signed position in the symbol.
    pub position: i64,
    /// Current market value held in the symbol.
    pub holdings: f64,
    /// Current account total.
    pub total: f64,
    /// Latest close for the symbol, if any bar was released.
    pub price: Option<f64>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum OrderSizing {
    #[default]
    FixedLot,
    Proportional,
}

impl OrderSizing {
    pub fn name(&self) -> &'static str {
        match self {
            OrderSizing::FixedLot => "fixed_lot",
            OrderSizing::Proportional => "proportional",
        }
    }

    /// Order for `signal`, or `None` when the book is already in the desired state.
    pub fn order_for(
        &self,
        signal: &SignalEvent,
        ctx: &SizingContext,
    ) -> Result<Option<OrderEvent>, EngineError> {
        let order = match self {
            OrderSizing::FixedLot => fixed_lot(signal, ctx.position),
            OrderSizing::Proportional => proportional(signal, ctx)?,
        };
        Ok(order.filter(|o| o.quantity > 0))
    }
}

fn fixed_lot(signal: &SignalEvent, position: i64) -> Option<OrderEvent> {
    let lot = lot_size(&signal.symbol);
    let symbol = signal.symbol.as_str();
    match (signal.signal_type, position.signum()) {
        (SignalType::Long, 0) => Some(OrderEvent::market(symbol, lot, Direction::Buy)),
        (SignalType::Long, -1) => Some(OrderEvent::market(symbol, 2 * lot, Direction::Buy)),
        (SignalType::Short, 0) => Some(OrderEvent::market(symbol, lot, Direction::Sell)),
        (SignalType::Short, 1) => Some(OrderEvent::market(symbol, 2 * lot, Direction::Sell)),
        (SignalType::Exit, _) => exit(symbol, position),
        _ => None,
    }
}

fn exit(symbol: &str, position: i64) -> Option<OrderEvent> {
    match position.signum() {
        1 => Some(OrderEvent::market(symbol, position.unsigned_abs(), Direction::Sell)),
        -1 => Some(OrderEvent::market(symbol, position.unsigned_abs(), Direction::Buy)),
        _ => None,
    }
}

fn proportional(signal: &SignalEvent, ctx: &SizingContext) -> Result<Option<OrderEvent>, EngineError> {
    let symbol = signal.symbol.as_str();
    if signal.signal_type == SignalType::Exit {
        return Ok(exit(symbol, ctx.position));
    }

    if !(signal.strength > 0.0 && signal.strength <= 1.0) {
        return Err(EngineError::InvalidParameter(format!(
            "signal strength {} for '{symbol}' is outside (0, 1]",
            signal.strength
        )));
    }
    let price = ctx
        .price
        .filter(|p| p.is_finite() && *p > 0.0)
        .ok_or_else(|| EngineError::NoMarketData {
            symbol: symbol.to_string(),
        })?;

    let side = if signal.signal_type == SignalType::Long { 1.0 } else { -1.0 };
    let target = ctx.total * signal.strength * side;
    let delta = target - ctx.holdings;

    let quantity = if MarketKind::of(symbol).is_equity() {
        let lot = lot_size(symbol) as f64;
        (delta / price / lot).floor() * lot
    } else {
        (delta / price).floor()
    };
    if !quantity.is_finite() || quantity == 0.0 {
        return Ok(None);
    }

    let direction = if quantity > 0.0 { Direction::Buy } else { Direction::Sell };
    Ok(Some(OrderEvent::market(symbol, quantity.abs() as u64, direction)))
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;

    fn signal(symbol: &str, signal_type: SignalType) -> SignalEvent {
        let ts = NaiveDate::from_ymd_opt(2015, 4, 8)
            .unwrap()
            .and_hms_opt(0, 0, 0)
            .unwrap();
        SignalEvent::new(symbol, ts, signal_type)
    }

    fn ctx(position: i64) -> SizingContext {
        SizingContext {
            position,
            holdings: 0.0,
            total: 100_000.0,
            price: Some(10.0),
        }
    }

    fn fixed(symbol: &str, signal_type: SignalType, position: i64) -> Option<(u64, Direction)> {
        OrderSizing::FixedLot
            .order_for(&signal(symbol, signal_type), &ctx(position))
            .unwrap()
            .map(|o| (o.quantity, o.direction))
    }

    // ── Fixed lot state table ──

    #[test]
    fn fixed_lot_entries() {
        assert_eq!(fixed("600008", SignalType::Long, 0), Some((100, Direction::Buy)));
        assert_eq!(fixed("600008", SignalType::Long, -100), Some((200, Direction::Buy)));
        assert_eq!(fixed("000001", SignalType::Short, 0), Some((100, Direction::Sell)));
        assert_eq!(fixed("000001", SignalType::Short, 100), Some((200, Direction::Sell)));
    }

    #[test]
    fn fixed_lot_exits_flatten() {
        assert_eq!(fixed("600008", SignalType::Exit, 300), Some((300, Direction::Sell)));
        assert_eq!(fixed("600008", SignalType::Exit, -200), Some((200, Direction::Buy)));
    }

    #[test]
    fn fixed_lot_no_order_when_already_there() {
        assert_eq!(fixed("600008", SignalType::Long, 100), None);
        assert_eq!(fixed("600008", SignalType::Short, -100), None);
        assert_eq!(fixed("600008", SignalType::Exit, 0), None);
    }

    #[test]
    fn fixed_lot_futures_trade_single_contracts() {
        assert_eq!(fixed("IF1512", SignalType::Long, 0), Some((1, Direction::Buy)));
        assert_eq!(fixed("RB1601", SignalType::Short, 1), Some((2, Direction::Sell)));
    }

    #[test]
    fn fixed_lot_ignores_strength() {
        let half = signal("600008", SignalType::Long).with_strength(0.5);
        let order = OrderSizing::FixedLot.order_for(&half, &ctx(0)).unwrap().unwrap();
        assert_eq!(order.quantity, 100);
    }

    // ── Proportional ──

    #[test]
    fn proportional_long_rounds_down_to_lots() {
        let s = signal("600008", SignalType::Long).with_strength(0.5);
        let c = SizingContext {
            price: Some(33.0),
            ..ctx(0)
        };
        // 50_000 / 33 = 1515.15 shares -> 15 lots
        let order = OrderSizing::Proportional.order_for(&s, &c).unwrap().unwrap();
        assert_eq!(order.quantity, 1500);
        assert_eq!(order.direction, Direction::Buy);
    }

    #[test]
    fn proportional_long_above_target_sells_down() {
        let s = signal("000001", SignalType::Long).with_strength(0.1);
        let c = SizingContext {
            position: 2000,
            holdings: 20_000.0,
            ..ctx(2000)
        };
        // target 10_000, delta -10_000 -> -1000 shares
        let order = OrderSizing::Proportional.order_for(&s, &c).unwrap().unwrap();
        assert_eq!(order.quantity, 1000);
        assert_eq!(order.direction, Direction::Sell);
    }

    #[test]
    fn proportional_short_sells() {
        let s = signal("RB1601", SignalType::Short).with_strength(0.01);
        // target -1000 at 10.0 -> -100 contracts
        let order = OrderSizing::Proportional.order_for(&s, &ctx(0)).unwrap().unwrap();
        assert_eq!(order.quantity, 100);
        assert_eq!(order.direction, Direction::Sell);
    }

    #[test]
    fn proportional_tiny_delta_emits_nothing() {
        let s = signal("600008", SignalType::Long).with_strength(0.005);
        // 500 / 10 = 50 shares, less than one lot
        assert!(OrderSizing::Proportional.order_for(&s, &ctx(0)).unwrap().is_none());
    }

    #[test]
    fn proportional_exit_flattens() {
        let s = signal("600008", SignalType::Exit);
        let order = OrderSizing::Proportional.order_for(&s, &ctx(700)).unwrap().unwrap();
        assert_eq!((order.quantity, order.direction), (700, Direction::Sell));
    }

    #[test]
    fn proportional_requires_price_and_valid_strength() {
        let s = signal("600008", SignalType::Long);
        let no_price = SizingContext { price: None, ..ctx(0) };
        assert!(matches!(
            OrderSizing::Proportional.order_for(&s, &no_price),
            Err(EngineError::NoMarketData { .. })
        ));

        let bad = signal("600008", SignalType::Long).with_strength(1.5);
        assert!(matches!(
            OrderSizing::Proportional.order_for(&bad, &ctx(0)),
            Err(EngineError::InvalidParameter(_))
        ));
    }

    #[test]
    fn sizing_serializes_screaming_snake() {
        assert_eq!(serde_json::to_string(&OrderSizing::FixedLot).unwrap(), "\"FIXED_LOT\"");
        assert_eq!(OrderSizing::default(), OrderSizing::FixedLot);
    }
}
