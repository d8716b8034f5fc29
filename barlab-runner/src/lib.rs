//! BarLab Runner: orchestration around the `barlab-core` event loop.
//!
//! This crate provides:
//! - TOML run configuration with a content-addressed run id
//! - Per-symbol CSV loading and alignment
//! - Performance statistics over the equity curve
//! - CSV/JSON export of ledger tables and the run report
//! - `run_backtest` / `run_from_file` entry points

pub mod config;
pub mod data_loader;
pub mod metrics;
pub mod reporting;
pub mod runner;

pub use config::{BacktestConfig, ConfigError, RunId, StrategyConfig};
pub use data_loader::{load_bars, LoadError, LoadedData};
pub use metrics::PerformanceSummary;
pub use reporting::{ReportPaths, ReportWriter};
pub use runner::{run_backtest, run_backtest_from_data, run_from_file, RunError, RunReport};
