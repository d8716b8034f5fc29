//! Serializable backtest configuration, loaded from TOML.
//!
//! ```toml
//! [data]
//! csv_dir = "data"
//! symbols = ["600008", "000001"]
//! date_format = "%Y-%m-%d"
//!
//! [portfolio]
//! initial_capital = 100000.0
//! start_date = "2015-04-08"
//! sizing = "FIXED_LOT"
//!
//! [execution]
//! slippage = "fixed"
//! slippage_percent = 0.1
//! commission = "default"
//!
//! [strategy]
//! type = "MA_CROSS"
//! long_window = 10
//! short_window = 5
//! ```

use barlab_core::execution::DEFAULT_SLIPPAGE_PERCENT;
use barlab_core::portfolio::{OrderSizing, DEFAULT_INITIAL_CAPITAL};
use barlab_core::strategy::ma_cross::{DEFAULT_LONG_WINDOW, DEFAULT_SHORT_WINDOW};
use chrono::{NaiveDate, NaiveDateTime};
use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use std::path::{Path, PathBuf};
use thiserror::Error;

/// Unique identifier for a backtest run (content-addressable hash).
pub type RunId = String;

pub const DEFAULT_DATE_FORMAT: &str = "%Y-%m-%d";

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("failed to read config file {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("failed to parse config TOML: {0}")]
    Parse(#[from] toml::de::Error),

    #[error("invalid config: {0}")]
    Invalid(String),

    #[error("failed to serialize config: {0}")]
    Serialize(#[from] serde_json::Error),
}

/// Everything needed to reproduce one backtest.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct BacktestConfig {
    pub data: DataConfig,
    pub portfolio: PortfolioConfig,
    #[serde(default)]
    pub execution: ExecutionConfig,
    #[serde(default)]
    pub strategy: StrategyConfig,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct DataConfig {
    /// Directory holding one `<symbol>.csv` per symbol.
    pub csv_dir: PathBuf,
    pub symbols: Vec<String>,
    #[serde(default = "default_date_format")]
    pub date_format: String,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct PortfolioConfig {
    #[serde(default = "default_initial_capital")]
    pub initial_capital: f64,
    /// Date of the initial all-cash ledger row.
    pub start_date: NaiveDate,
    #[serde(default)]
    pub sizing: OrderSizing,
}

impl PortfolioConfig {
    pub fn start_datetime(&self) -> NaiveDateTime {
        self.start_date.and_time(chrono::NaiveTime::MIN)
    }
}

/// Model names are free strings; unknown names fall back to zero-effect models.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct ExecutionConfig {
    #[serde(default = "default_slippage")]
    pub slippage: String,
    /// Percent of price for the `fixed` model (0.1 = 0.1%).
    #[serde(default = "default_slippage_percent")]
    pub slippage_percent: f64,
    #[serde(default = "default_commission")]
    pub commission: String,
}

impl Default for ExecutionConfig {
    fn default() -> Self {
        Self {
            slippage: default_slippage(),
            slippage_percent: DEFAULT_SLIPPAGE_PERCENT,
            commission: default_commission(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(tag = "type", rename_all = "SCREAMING_SNAKE_CASE")]
pub enum StrategyConfig {
    BuyAndHold,
    MaCross {
        #[serde(default = "default_long_window")]
        long_window: usize,
        #[serde(default = "default_short_window")]
        short_window: usize,
    },
}

impl Default for StrategyConfig {
    fn default() -> Self {
        StrategyConfig::MaCross {
            long_window: DEFAULT_LONG_WINDOW,
            short_window: DEFAULT_SHORT_WINDOW,
        }
    }
}

fn default_date_format() -> String {
    DEFAULT_DATE_FORMAT.to_string()
}

fn default_initial_capital() -> f64 {
    DEFAULT_INITIAL_CAPITAL
}

fn default_slippage() -> String {
    "fixed".to_string()
}

fn default_slippage_percent() -> f64 {
    DEFAULT_SLIPPAGE_PERCENT
}

fn default_commission() -> String {
    "default".to_string()
}

fn default_long_window() -> usize {
    DEFAULT_LONG_WINDOW
}

fn default_short_window() -> usize {
    DEFAULT_SHORT_WINDOW
}

impl BacktestConfig {
    /// Load and validate a config file.
    pub fn from_file(path: &Path) -> Result<Self, ConfigError> {
        let content = std::fs::read_to_string(path).map_err(|source| ConfigError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        Self::from_toml(&content)
    }

    /// Parse and validate a TOML string.
    pub fn from_toml(content: &str) -> Result<Self, ConfigError> {
        let config: Self = toml::from_str(content)?;
        config.validate()?;
        Ok(config)
    }

    pub fn to_toml(&self) -> Result<String, ConfigError> {
        toml::to_string_pretty(self).map_err(|e| ConfigError::Invalid(format!("serialize: {e}")))
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.data.symbols.is_empty() {
            return Err(ConfigError::Invalid("data.symbols must not be empty".into()));
        }
        let mut seen = HashSet::new();
        for symbol in &self.data.symbols {
            if !seen.insert(symbol) {
                return Err(ConfigError::Invalid(format!(
                    "symbol '{symbol}' is listed more than once"
                )));
            }
        }
        if !(self.portfolio.initial_capital.is_finite() && self.portfolio.initial_capital > 0.0) {
            return Err(ConfigError::Invalid(format!(
                "portfolio.initial_capital must be positive, got {}",
                self.portfolio.initial_capital
            )));
        }
        if !(self.execution.slippage_percent.is_finite() && self.execution.slippage_percent >= 0.0)
        {
            return Err(ConfigError::Invalid(format!(
                "execution.slippage_percent must be non-negative, got {}",
                self.execution.slippage_percent
            )));
        }
        if let StrategyConfig::MaCross {
            long_window,
            short_window,
        } = self.strategy
        {
            if long_window == 0 || short_window == 0 {
                return Err(ConfigError::Invalid(format!(
                    "moving average windows must be positive (long={long_window}, short={short_window})"
                )));
            }
        }
        Ok(())
    }

    /// Deterministic hash of the configuration.
    ///
    /// Two runs with identical configs get the same id.
    pub fn run_id(&self) -> Result<RunId, ConfigError> {
        let json = serde_json::to_string(self)?;
        Ok(blake3::hash(json.as_bytes()).to_hex().to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const FULL: &str = r#"
[data]
csv_dir = "data"
symbols = ["600008", "000001"]
date_format = "%Y-%m-%d %H:%M:%S"

[portfolio]
initial_capital = 50000.0
start_date = "2015-04-08"
sizing = "PROPORTIONAL"

[execution]
slippage = "zero"
slippage_percent = 0.2
commission = "zero"

[strategy]
type = "MA_CROSS"
long_window = 20
short_window = 8
"#;

    const MINIMAL: &str = r#"
[data]
csv_dir = "data"
symbols = ["600008"]

[portfolio]
start_date = "2015-04-08"
"#;

    #[test]
    fn parses_full_config() {
        let config = BacktestConfig::from_toml(FULL).unwrap();
        assert_eq!(config.data.symbols, vec!["600008", "000001"]);
        assert_eq!(config.data.date_format, "%Y-%m-%d %H:%M:%S");
        assert_eq!(config.portfolio.initial_capital, 50_000.0);
        assert_eq!(config.portfolio.sizing, OrderSizing::Proportional);
        assert_eq!(config.execution.slippage, "zero");
        assert_eq!(config.execution.commission, "zero");
        assert_eq!(
            config.strategy,
            StrategyConfig::MaCross {
                long_window: 20,
                short_window: 8
            }
        );
    }

    #[test]
    fn minimal_config_uses_defaults() {
        let config = BacktestConfig::from_toml(MINIMAL).unwrap();
        assert_eq!(config.data.date_format, DEFAULT_DATE_FORMAT);
        assert_eq!(config.portfolio.initial_capital, 100_000.0);
        assert_eq!(config.portfolio.sizing, OrderSizing::FixedLot);
        assert_eq!(config.execution, ExecutionConfig::default());
        assert_eq!(config.execution.slippage_percent, 0.1);
        assert_eq!(config.strategy, StrategyConfig::default());
        assert_eq!(
            config.portfolio.start_datetime(),
            NaiveDate::from_ymd_opt(2015, 4, 8)
                .unwrap()
                .and_hms_opt(0, 0, 0)
                .unwrap()
        );
    }

    #[test]
    fn buy_and_hold_strategy_tag() {
        let toml = format!("{MINIMAL}\n[strategy]\ntype = \"BUY_AND_HOLD\"\n");
        let config = BacktestConfig::from_toml(&toml).unwrap();
        assert_eq!(config.strategy, StrategyConfig::BuyAndHold);
    }

    #[test]
    fn rejects_invalid_values() {
        let empty = MINIMAL.replace(r#"symbols = ["600008"]"#, "symbols = []");
        assert!(matches!(
            BacktestConfig::from_toml(&empty),
            Err(ConfigError::Invalid(_))
        ));

        let dup = MINIMAL.replace(r#"["600008"]"#, r#"["600008", "600008"]"#);
        assert!(BacktestConfig::from_toml(&dup).is_err());

        let capital = format!("{MINIMAL}initial_capital = -1.0\n");
        assert!(BacktestConfig::from_toml(&capital).is_err());

        let window = format!("{MINIMAL}\n[strategy]\ntype = \"MA_CROSS\"\nlong_window = 0\n");
        assert!(BacktestConfig::from_toml(&window).is_err());
    }

    #[test]
    fn malformed_toml_is_parse_error() {
        assert!(matches!(
            BacktestConfig::from_toml("[data\ncsv_dir ="),
            Err(ConfigError::Parse(_))
        ));
    }

    #[test]
    fn run_id_deterministic_and_sensitive() {
        let a = BacktestConfig::from_toml(MINIMAL).unwrap();
        let b = BacktestConfig::from_toml(MINIMAL).unwrap();
        assert_eq!(a.run_id().unwrap(), b.run_id().unwrap());
        assert_eq!(a.run_id().unwrap().len(), 64);

        let mut c = a.clone();
        c.portfolio.initial_capital = 200_000.0;
        assert_ne!(a.run_id().unwrap(), c.run_id().unwrap());
    }

    #[test]
    fn run_id_hashes_the_json_form() {
        let cfg = BacktestConfig::from_toml(MINIMAL).unwrap();
        let json = serde_json::to_string(&cfg).unwrap();
        assert!(!json.is_empty());
        let expected = blake3::hash(json.as_bytes()).to_hex().to_string();
        assert_eq!(cfg.run_id().unwrap(), expected);
        assert_ne!(cfg.run_id().unwrap(), blake3::hash(b"").to_hex().to_string());
    }

    #[test]
    fn toml_round_trip() {
        let config = BacktestConfig::from_toml(FULL).unwrap();
        let text = config.to_toml().unwrap();
        assert_eq!(BacktestConfig::from_toml(&text).unwrap(), config);
    }
}
