//! Engine error type.

use thiserror::Error;

/// Fatal conditions raised by the core.
///
/// Data exhaustion is not an error, and neither is querying an unknown symbol
/// on the data handler; both are reported through return values.
#[derive(Debug, Error)]
pub enum EngineError {
    #[error("unknown signal type: {0}")]
    UnknownSignalType(String),

    #[error("no market data available for '{symbol}'")]
    NoMarketData { symbol: String },

    #[error("symbol '{symbol}' has no bars")]
    EmptySeries { symbol: String },

    #[error("symbol '{symbol}' is listed more than once")]
    DuplicateSymbol { symbol: String },

    #[error("symbol '{symbol}' is not part of the configured universe")]
    UnknownSymbol { symbol: String },

    #[error("universe is empty")]
    EmptyUniverse,

    #[error("invalid parameter: {0}")]
    InvalidParameter(String),
}
