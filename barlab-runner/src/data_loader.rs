//! Bar loading from a directory of per-symbol CSV files.
//!
//! Each symbol reads `<csv_dir>/<symbol>.csv`. The first row is a header and
//! is skipped; columns are positional:
//!
//! ```text
//! datetime,open,high,low,close,volume
//! 2015-04-08,10.10,10.40,9.95,10.32,1203400
//! ```
//!
//! Rows are expected in ascending time order; they are sorted anyway before
//! alignment. Timestamps parse with the configured format, falling back to a
//! date-only parse at midnight.

use barlab_core::data::{align_symbols, AlignedData, HistoricBarHandler};
use barlab_core::domain::Bar;
use barlab_core::EngineError;
use chrono::{NaiveDate, NaiveDateTime, NaiveTime};
use std::collections::HashMap;
use std::path::{Path, PathBuf};
use thiserror::Error;
use tracing::{debug, info};

use crate::config::DataConfig;

const COLUMNS: [&str; 6] = ["datetime", "open", "high", "low", "close", "volume"];

/// Errors from the data loading layer.
#[derive(Debug, Error)]
pub enum LoadError {
    #[error("failed to open {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("failed to read CSV for '{symbol}': {source}")]
    Csv {
        symbol: String,
        #[source]
        source: csv::Error,
    },

    #[error("bad row for '{symbol}' at line {line}: {reason}")]
    Parse {
        symbol: String,
        line: u64,
        reason: String,
    },

    #[error("no rows in {path}")]
    Empty { path: PathBuf },

    #[error("alignment failed: {0}")]
    Engine(#[from] EngineError),
}

/// Aligned bars plus provenance.
#[derive(Debug, Clone)]
pub struct LoadedData {
    pub aligned: AlignedData,
    /// BLAKE3 hash over all aligned bar data.
    pub dataset_hash: String,
    /// Rows read per symbol, before alignment.
    pub rows_read: HashMap<String, usize>,
}

impl LoadedData {
    pub fn into_handler(self) -> HistoricBarHandler {
        HistoricBarHandler::from_aligned(self.aligned)
    }
}

/// Path of the CSV file for `symbol`.
pub fn csv_path(csv_dir: &Path, symbol: &str) -> PathBuf {
    csv_dir.join(format!("{symbol}.csv"))
}

/// Load and align every configured symbol.
pub fn load_bars(config: &DataConfig) -> Result<LoadedData, LoadError> {
    let mut series = HashMap::new();
    let mut rows_read = HashMap::new();
    for symbol in &config.symbols {
        let path = csv_path(&config.csv_dir, symbol);
        let bars = read_symbol_csv(&path, symbol, &config.date_format)?;
        debug!(symbol = %symbol, rows = bars.len(), path = %path.display(), "loaded bars");
        rows_read.insert(symbol.clone(), bars.len());
        series.insert(symbol.clone(), bars);
    }

    let aligned = align_symbols(&config.symbols, series)?;
    let dataset_hash = aligned.fingerprint();
    info!(
        symbols = config.symbols.len(),
        timestamps = aligned.len(),
        dataset_hash = %dataset_hash,
        "data aligned"
    );
    Ok(LoadedData {
        aligned,
        dataset_hash,
        rows_read,
    })
}

/// Read one symbol's file into bars sorted by timestamp.
pub fn read_symbol_csv(path: &Path, symbol: &str, date_format: &str) -> Result<Vec<Bar>, LoadError> {
    let file = std::fs::File::open(path).map_err(|source| LoadError::Io {
        path: path.to_path_buf(),
        source,
    })?;
    let mut reader = csv::ReaderBuilder::new()
        .has_headers(true)
        .trim(csv::Trim::All)
        .from_reader(file);

    let mut bars = Vec::new();
    for record in reader.records() {
        let record = record.map_err(|source| LoadError::Csv {
            symbol: symbol.to_string(),
            source,
        })?;
        let line = record.position().map_or(0, |p| p.line());
        bars.push(parse_record(&record, symbol, date_format, line)?);
    }

    if bars.is_empty() {
        return Err(LoadError::Empty {
            path: path.to_path_buf(),
        });
    }
    bars.sort_by_key(|b| b.timestamp);
    Ok(bars)
}

fn parse_record(
    record: &csv::StringRecord,
    symbol: &str,
    date_format: &str,
    line: u64,
) -> Result<Bar, LoadError> {
    let bad = |reason: String| LoadError::Parse {
        symbol: symbol.to_string(),
        line,
        reason,
    };
    if record.len() < COLUMNS.len() {
        return Err(bad(format!(
            "expected {} columns, found {}",
            COLUMNS.len(),
            record.len()
        )));
    }

    let timestamp = parse_timestamp(&record[0], date_format)
        .ok_or_else(|| bad(format!("cannot parse '{}' with format '{date_format}'", &record[0])))?;

    let mut values = [0.0_f64; 5];
    for (i, value) in values.iter_mut().enumerate() {
        let field = &record[i + 1];
        *value = field
            .parse()
            .map_err(|_| bad(format!("{} '{field}' is not a number", COLUMNS[i + 1])))?;
        if !value.is_finite() {
            return Err(bad(format!("{} '{field}' is not finite", COLUMNS[i + 1])));
        }
    }
    let [open, high, low, close, volume] = values;
    let bar = Bar::new(symbol, timestamp, open, high, low, close, volume);
    if !bar.is_sane() || volume < 0.0 {
        return Err(bad(format!(
            "inconsistent bar: open {open} high {high} low {low} close {close} volume {volume}"
        )));
    }
    Ok(bar)
}

/// Parse with `format`; date-only inputs land at midnight.
pub fn parse_timestamp(text: &str, format: &str) -> Option<NaiveDateTime> {
    NaiveDateTime::parse_from_str(text, format)
        .ok()
        .or_else(|| {
            NaiveDate::parse_from_str(text, format)
                .ok()
                .map(|d| d.and_time(NaiveTime::MIN))
        })
}
