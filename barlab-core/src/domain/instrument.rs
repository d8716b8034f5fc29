//! Instrument classification by symbol prefix.
//!
//! Chinese-market symbols carry their venue in the code itself: numeric
//! prefixes identify Shanghai/Shenzhen equities, alphabetic prefixes identify
//! the futures product and hence the exchange. Commission schedules and lot
//! sizes are keyed off this classification, so prefix order matters and is
//! fixed below.

use serde::{Deserialize, Serialize};
use std::fmt;

const SHANGHAI_PREFIXES: &[&str] = &["50", "51", "60", "90", "110", "113", "132", "204"];
const SHENZHEN_PREFIXES: &[&str] = &[
    "00", "13", "18", "15", "16", "20", "30", "39", "115", "1318",
];
const SHFE_PREFIXES: &[&str] = &[
    "AG", "AL", "AU", "BU", "CU", "FU", "HC", "PB", "RB", "RU", "WR", "ZN",
];
const DCE_PREFIXES: &[&str] = &[
    "A", "B", "BB", "C", "FB", "I", "J", "JD", "JM", "L", "M", "P", "PP", "V", "Y",
];
const CZCE_PREFIXES: &[&str] = &[
    "CF", "FG", "JR", "LR", "MA", "OI", "PM", "RI", "RM", "SF", "SM", "SR", "TA", "WH", "ZC",
];
const CFFEX_PREFIXES: &[&str] = &["IF", "TF"];

/// Board lot for A-share equities.
pub const EQUITY_LOT: u64 = 100;
/// One contract for everything else.
pub const CONTRACT_LOT: u64 = 1;

fn has_prefix(symbol: &str, prefixes: &[&str]) -> bool {
    prefixes.iter().any(|p| symbol.starts_with(p))
}

/// Listing venue derived from the symbol code.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Exchange {
    /// Shanghai Stock Exchange (SH.EX)
    Shanghai,
    /// Shenzhen Stock Exchange (SZ.EX)
    Shenzhen,
    /// Shanghai Futures Exchange (SQ.EX)
    ShanghaiFutures,
    /// Dalian Commodity Exchange (DS.EX)
    DalianCommodity,
    /// Zhengzhou Commodity Exchange (ZS.EX)
    ZhengzhouCommodity,
    /// China Financial Futures Exchange (ZJ.EX)
    ChinaFinancialFutures,
    Unknown,
}

impl Exchange {
    /// Classify a symbol. The first matching group wins, so e.g. `IF` lands in
    /// Dalian via the single-letter `I` entry before the CFFEX group is tried.
    pub fn of(symbol: &str) -> Self {
        if has_prefix(symbol, SHANGHAI_PREFIXES) {
            Exchange::Shanghai
        } else if has_prefix(symbol, SHENZHEN_PREFIXES) {
            Exchange::Shenzhen
        } else if has_prefix(symbol, SHFE_PREFIXES) {
            Exchange::ShanghaiFutures
        } else if has_prefix(symbol, DCE_PREFIXES) {
            Exchange::DalianCommodity
        } else if has_prefix(symbol, CZCE_PREFIXES) {
            Exchange::ZhengzhouCommodity
        } else if has_prefix(symbol, CFFEX_PREFIXES) {
            Exchange::ChinaFinancialFutures
        } else {
            Exchange::Unknown
        }
    }

    pub fn code(&self) -> &'static str {
        match self {
            Exchange::Shanghai => "SH.EX",
            Exchange::Shenzhen => "SZ.EX",
            Exchange::ShanghaiFutures => "SQ.EX",
            Exchange::DalianCommodity => "DS.EX",
            Exchange::ZhengzhouCommodity => "ZS.EX",
            Exchange::ChinaFinancialFutures => "ZJ.EX",
            Exchange::Unknown => "Unknown Exchange",
        }
    }

    pub fn is_commodity(&self) -> bool {
        matches!(
            self,
            Exchange::ShanghaiFutures | Exchange::DalianCommodity | Exchange::ZhengzhouCommodity
        )
    }
}

impl fmt::Display for Exchange {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.code())
    }
}

/// Fee-schedule category of a symbol.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum MarketKind {
    /// `6`-prefixed A-shares: transfer fee + brokerage, stamp tax on sells.
    ShanghaiEquity,
    /// `0`/`3`-prefixed A-shares: brokerage, stamp tax on sells.
    ShenzhenEquity,
    /// `I`-prefixed contracts.
    IndexFuture,
    /// Contracts listed on SHFE, DCE or CZCE.
    CommodityFuture,
    Unknown,
}

impl MarketKind {
    pub fn of(symbol: &str) -> Self {
        if symbol.starts_with('6') {
            MarketKind::ShanghaiEquity
        } else if symbol.starts_with('0') || symbol.starts_with('3') {
            MarketKind::ShenzhenEquity
        } else if symbol.starts_with('I') {
            MarketKind::IndexFuture
        } else if Exchange::of(symbol).is_commodity() {
            MarketKind::CommodityFuture
        } else {
            MarketKind::Unknown
        }
    }

    pub fn is_equity(&self) -> bool {
        matches!(self, MarketKind::ShanghaiEquity | MarketKind::ShenzhenEquity)
    }
}

/// Minimum tradeable unit for the naive sizing policy.
pub fn lot_size(symbol: &str) -> u64 {
    if MarketKind::of(symbol).is_equity() {
        EQUITY_LOT
    } else {
        CONTRACT_LOT
    }
}
