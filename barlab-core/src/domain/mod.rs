//! Domain types for barlab

pub mod bar;
pub mod event;
pub mod instrument;

pub use bar::Bar;
pub use event::{Direction, Event, FillEvent, OrderEvent, OrderType, SignalEvent, SignalType};
pub use instrument::{lot_size, Exchange, MarketKind, CONTRACT_LOT, EQUITY_LOT};
