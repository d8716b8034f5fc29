//! Multi-symbol time alignment.
//!
//! Given bars for multiple symbols, align them to the union of all their
//! timestamps. A symbol with no bar at some timestamp repeats its previous
//! bar (OHLC and volume) re-stamped at that time.
//!
//! Forward-fill needs a previous bar, so a symbol that starts trading late
//! has no entries for the timeline positions before its first bar. Its
//! series is shorter than the timeline and ends with it.

use crate::domain::Bar;
use crate::error::EngineError;
use chrono::NaiveDateTime;
use std::collections::{BTreeSet, HashMap, HashSet};
use tracing::debug;

/// Bar data for multiple symbols on a common timeline.
#[derive(Debug, Clone)]
pub struct AlignedData {
    /// The common time axis (strictly ascending).
    pub timeline: Vec<NaiveDateTime>,
    /// Symbols in configured order.
    pub symbols: Vec<String>,
    /// Bars per symbol, aligned to the tail of `timeline`.
    pub bars: HashMap<String, Vec<Bar>>,
}

impl AlignedData {
    pub fn len(&self) -> usize {
        self.timeline.len()
    }

    pub fn is_empty(&self) -> bool {
        self.timeline.is_empty()
    }

    /// Timeline positions before `symbol`'s first bar.
    pub fn leading_gap(&self, symbol: &str) -> usize {
        let bars = self.bars.get(symbol).map_or(0, Vec::len);
        self.timeline.len().saturating_sub(bars)
    }

    /// Deterministic BLAKE3 hash over every aligned bar, in configured symbol order.
    pub fn fingerprint(&self) -> String {
        let mut hasher = blake3::Hasher::new();
        for symbol in &self.symbols {
            hasher.update(symbol.as_bytes());
            if let Some(bars) = self.bars.get(symbol) {
                for bar in bars {
                    hasher.update(bar.timestamp.to_string().as_bytes());
                    hasher.update(&bar.open.to_le_bytes());
                    hasher.update(&bar.high.to_le_bytes());
                    hasher.update(&bar.low.to_le_bytes());
                    hasher.update(&bar.close.to_le_bytes());
                    hasher.update(&bar.volume.to_le_bytes());
                }
            }
        }
        hasher.finalize().to_hex().to_string()
    }
}

/// Sort by timestamp; on duplicate timestamps the later row wins.
fn sorted_unique(mut bars: Vec<Bar>) -> Vec<Bar> {
    bars.sort_by_key(|b| b.timestamp);
    let mut out: Vec<Bar> = Vec::with_capacity(bars.len());
    for bar in bars {
        match out.last_mut() {
            Some(last) if last.timestamp == bar.timestamp => *last = bar,
            _ => out.push(bar),
        }
    }
    out
}

/// Align `symbols` to the forward-filled union of their timestamps.
///
/// Fails if the universe is empty, a symbol is repeated, or a symbol has no
/// bars. Input series need not be sorted.
pub fn align_symbols(
    symbols: &[String],
    mut series: HashMap<String, Vec<Bar>>,
) -> Result<AlignedData, EngineError> {
    if symbols.is_empty() {
        return Err(EngineError::EmptyUniverse);
    }

    let mut seen = HashSet::new();
    let mut sorted: HashMap<String, Vec<Bar>> = HashMap::with_capacity(symbols.len());
    for symbol in symbols {
        if !seen.insert(symbol.as_str()) {
            return Err(EngineError::DuplicateSymbol {
                symbol: symbol.clone(),
            });
        }
        let bars = series.remove(symbol).unwrap_or_default();
        if bars.is_empty() {
            return Err(EngineError::EmptySeries {
                symbol: symbol.clone(),
            });
        }
        sorted.insert(symbol.clone(), sorted_unique(bars));
    }

    let timeline: Vec<NaiveDateTime> = sorted
        .values()
        .flat_map(|bars| bars.iter().map(|b| b.timestamp))
        .collect::<BTreeSet<_>>()
        .into_iter()
        .collect();

    let mut aligned: HashMap<String, Vec<Bar>> = HashMap::with_capacity(symbols.len());
    for symbol in symbols {
        let native = &sorted[symbol];
        let mut next = 0usize;
        let mut last: Option<&Bar> = None;
        let mut filled = Vec::with_capacity(timeline.len());

        for &t in &timeline {
            while next < native.len() && native[next].timestamp <= t {
                last = Some(&native[next]);
                next += 1;
            }
            // Nothing to carry before the first real bar.
            if let Some(prev) = last {
                if prev.timestamp == t {
                    filled.push(prev.clone());
                } else {
                    filled.push(prev.carried_to(t));
                }
            }
        }
        if filled.len() < timeline.len() {
            debug!(
                symbol = %symbol,
                leading_gap = timeline.len() - filled.len(),
                "symbol starts after the timeline"
            );
        }
        aligned.insert(symbol.clone(), filled);
    }

    Ok(AlignedData {
        timeline,
        symbols: symbols.to_vec(),
        bars: aligned,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;

    fn ts(day: u32) -> NaiveDateTime {
        NaiveDate::from_ymd_opt(2024, 1, day)
            .unwrap()
            .and_hms_opt(0, 0, 0)
            .unwrap()
    }

    fn bar(symbol: &str, day: u32, close: f64) -> Bar {
        Bar::new(symbol, ts(day), close - 0.5, close + 1.0, close - 1.0, close, 1000.0 + close)
    }

    fn universe(symbols: &[&str]) -> Vec<String> {
        symbols.iter().map(|s| s.to_string()).collect()
    }

    #[test]
    fn align_forward_fills_missing_bars() {
        let mut input = HashMap::new();
        input.insert(
            "600008".to_string(),
            vec![bar("600008", 2, 10.0), bar("600008", 3, 11.0), bar("600008", 4, 12.0)],
        );
        input.insert(
            "000001".to_string(),
            vec![bar("000001", 2, 20.0), bar("000001", 4, 22.0)],
        );

        let aligned = align_symbols(&universe(&["600008", "000001"]), input).unwrap();

        assert_eq!(aligned.len(), 3);
        assert_eq!(aligned.bars["600008"].len(), 3);
        assert_eq!(aligned.bars["000001"].len(), 3);

        let filled = &aligned.bars["000001"][1];
        assert_eq!(filled.timestamp, ts(3));
        assert_eq!(filled.close, 20.0);
        assert_eq!(filled.volume, 1020.0);
        assert_eq!(aligned.bars["000001"][2].close, 22.0);
    }

    #[test]
    fn align_sorts_and_dedups_input() {
        let mut input = HashMap::new();
        input.insert(
            "600008".to_string(),
            vec![bar("600008", 4, 12.0), bar("600008", 2, 10.0), bar("600008", 2, 10.5)],
        );

        let aligned = align_symbols(&universe(&["600008"]), input).unwrap();
        assert_eq!(aligned.timeline, vec![ts(2), ts(4)]);
        assert_eq!(aligned.bars["600008"][0].close, 10.5);
    }

    #[test]
    fn align_keeps_bars_before_a_late_starter() {
        let mut input = HashMap::new();
        input.insert(
            "600008".to_string(),
            vec![bar("600008", 1, 9.0), bar("600008", 2, 10.0), bar("600008", 3, 11.0)],
        );
        input.insert("000001".to_string(), vec![bar("000001", 2, 20.0)]);

        let aligned = align_symbols(&universe(&["600008", "000001"]), input).unwrap();
        assert_eq!(aligned.timeline, vec![ts(1), ts(2), ts(3)]);
        assert_eq!(aligned.bars["600008"].len(), 3);
        assert_eq!(aligned.bars["600008"][0].close, 9.0);

        let late = &aligned.bars["000001"];
        assert_eq!(late.len(), 2);
        assert_eq!(late[0].timestamp, ts(2));
        assert_eq!(late[1].timestamp, ts(3));
        assert_eq!(late[1].close, 20.0);
        assert_eq!(aligned.leading_gap("000001"), 1);
        assert_eq!(aligned.leading_gap("600008"), 0);
    }

    #[test]
    fn align_rejects_missing_symbol() {
        let mut input = HashMap::new();
        input.insert("600008".to_string(), vec![bar("600008", 2, 10.0)]);
        let err = align_symbols(&universe(&["600008", "000001"]), input).unwrap_err();
        assert!(matches!(err, EngineError::EmptySeries { ref symbol } if symbol == "000001"));
    }

    #[test]
    fn align_rejects_duplicate_and_empty_universe() {
        let err = align_symbols(&[], HashMap::new()).unwrap_err();
        assert!(matches!(err, EngineError::EmptyUniverse));

        let mut input = HashMap::new();
        input.insert("600008".to_string(), vec![bar("600008", 2, 10.0)]);
        let err = align_symbols(&universe(&["600008", "600008"]), input).unwrap_err();
        assert!(matches!(err, EngineError::DuplicateSymbol { .. }));
    }

    #[test]
    fn fingerprint_is_deterministic() {
        let make = || {
            let mut input = HashMap::new();
            input.insert("600008".to_string(), vec![bar("600008", 2, 10.0)]);
            align_symbols(&universe(&["600008"]), input).unwrap()
        };
        assert_eq!(make().fingerprint(), make().fingerprint());
    }
}
