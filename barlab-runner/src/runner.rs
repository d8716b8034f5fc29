//! Backtest runner: wires config, data, models and the core loop together.
//!
//! Two entry points:
//! - `run_from_file()` / `run_backtest()`: load CSV data per the config, then run.
//! - `run_backtest_from_data()`: takes pre-loaded data. Used by tests and
//!   callers that replay one dataset under several configs.

use barlab_core::engine::{Backtest, BacktestOutput};
use barlab_core::execution::{
    commission_model_from_name, slippage_model_from_name, SimulatedExecutionHandler,
};
use barlab_core::portfolio::NaivePortfolio;
use barlab_core::strategy::{BuyAndHold, MovingAverageCross, Strategy};
use barlab_core::EngineError;
use serde::{Deserialize, Serialize};
use std::path::Path;
use thiserror::Error;
use tracing::info;

use crate::config::{BacktestConfig, ConfigError, RunId, StrategyConfig};
use crate::data_loader::{load_bars, LoadError, LoadedData};
use crate::metrics::{PerformanceSummary, DAILY_PERIODS};

/// Errors from the runner.
#[derive(Debug, Error)]
pub enum RunError {
    #[error("config error: {0}")]
    Config(#[from] ConfigError),
    #[error("data error: {0}")]
    Data(#[from] LoadError),
    #[error("engine error: {0}")]
    Engine(#[from] EngineError),
}

/// Current schema version for persisted reports.
pub const SCHEMA_VERSION: u32 = 1;

/// Complete result of a single run.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RunReport {
    #[serde(default = "default_schema_version")]
    pub schema_version: u32,
    pub run_id: RunId,
    pub dataset_hash: String,
    pub strategy: String,
    pub slippage: String,
    pub commission: String,
    pub config: BacktestConfig,
    pub summary: PerformanceSummary,
    pub output: BacktestOutput,
}

fn default_schema_version() -> u32 {
    SCHEMA_VERSION
}

/// Load a TOML config from disk and run it.
pub fn run_from_file(path: &Path) -> Result<RunReport, RunError> {
    let config = BacktestConfig::from_file(path)?;
    run_backtest(&config)
}

/// Load CSV data per `config.data`, then run.
pub fn run_backtest(config: &BacktestConfig) -> Result<RunReport, RunError> {
    config.validate()?;
    let loaded = load_bars(&config.data)?;
    run_backtest_from_data(config, loaded)
}

/// Run against data that is already loaded and aligned.
pub fn run_backtest_from_data(
    config: &BacktestConfig,
    loaded: LoadedData,
) -> Result<RunReport, RunError> {
    let run_id = config.run_id()?;
    let start = config.portfolio.start_datetime();
    if let Some(&first) = loaded.aligned.timeline.first() {
        if start > first {
            return Err(ConfigError::Invalid(format!(
                "portfolio.start_date {start} is after the first bar at {first}"
            ))
            .into());
        }
    }
    let dataset_hash = loaded.dataset_hash.clone();
    let data = loaded.into_handler();

    let strategy = build_strategy(&config.strategy)?;
    let strategy_name = strategy.name().to_string();

    let execution = SimulatedExecutionHandler::new(
        slippage_model_from_name(&config.execution.slippage, config.execution.slippage_percent),
        commission_model_from_name(&config.execution.commission),
    );
    let slippage = execution.slippage_name().to_string();
    let commission = execution.commission_name().to_string();

    let portfolio = NaivePortfolio::new(
        &config.data.symbols,
        start,
        config.portfolio.initial_capital,
        config.portfolio.sizing,
    )?;

    info!(
        run_id = %run_id,
        strategy = %strategy_name,
        slippage = %slippage,
        commission = %commission,
        sizing = config.portfolio.sizing.name(),
        "starting run"
    );

    let output = Backtest::new(
        Box::new(data),
        strategy,
        Box::new(portfolio),
        Box::new(execution),
    )
    .run()?;

    let summary = PerformanceSummary::compute(&output.equity_curve(), DAILY_PERIODS);
    info!(
        run_id = %run_id,
        total_return = summary.total_return,
        sharpe = summary.sharpe,
        max_drawdown = summary.max_drawdown,
        drawdown_duration = summary.drawdown_duration,
        "run complete"
    );

    Ok(RunReport {
        schema_version: SCHEMA_VERSION,
        run_id,
        dataset_hash,
        strategy: strategy_name,
        slippage,
        commission,
        config: config.clone(),
        summary,
        output,
    })
}

/// Instantiate the configured strategy.
pub fn build_strategy(config: &StrategyConfig) -> Result<Box<dyn Strategy>, EngineError> {
    Ok(match config {
        StrategyConfig::BuyAndHold => Box::new(BuyAndHold::new()),
        StrategyConfig::MaCross {
            long_window,
            short_window,
        } => Box::new(MovingAverageCross::new(*long_window, *short_window)?),
    })
}
