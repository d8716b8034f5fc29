//! Event loop: queue, driver and run output.

pub mod backtest;
pub mod output;
pub mod queue;

pub use backtest::{Backtest, BacktestState};
pub use output::{dedup_last_wins, BacktestOutput, EquityPoint, EventCounters};
pub use queue::EventQueue;
