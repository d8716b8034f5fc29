//! Backtest results: ledger history, counters and the derived equity curve.

use crate::portfolio::{HoldingsSnapshot, PositionsSnapshot, TradeRecord};
use chrono::NaiveDateTime;
use serde::{Deserialize, Serialize};

/// Events processed by the driver, by type.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct EventCounters {
    pub bars: u64,
    pub signals: u64,
    pub orders: u64,
    pub fills: u64,
}

/// One point of the equity curve.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct EquityPoint {
    pub datetime: NaiveDateTime,
    pub total: f64,
    /// Period return versus the previous point (0 for the first).
    pub returns: f64,
    /// Cumulative product of `1 + returns`, starting at 1.
    pub equity_curve: f64,
}

/// Read-only result of a finished run.
///
/// Positions and holdings hold one row per timestamp. The driver appends a
/// row per `Bar` event, so multi-symbol runs record several rows per
/// timestamp; the last one wins.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BacktestOutput {
    pub positions: Vec<PositionsSnapshot>,
    pub holdings: Vec<HoldingsSnapshot>,
    pub trades: Vec<TradeRecord>,
    pub counters: EventCounters,
}

impl BacktestOutput {
    pub fn new(
        positions: Vec<PositionsSnapshot>,
        holdings: Vec<HoldingsSnapshot>,
        trades: Vec<TradeRecord>,
        counters: EventCounters,
    ) -> Self {
        Self {
            positions: dedup_last_wins(positions, |p| p.datetime),
            holdings: dedup_last_wins(holdings, |h| h.datetime),
            trades,
            counters,
        }
    }

    pub fn final_total(&self) -> Option<f64> {
        self.holdings.last().map(|h| h.total)
    }

    pub fn total_commission(&self) -> f64 {
        self.holdings.last().map_or(0.0, |h| h.commission)
    }

    pub fn equity_curve(&self) -> Vec<EquityPoint> {
        let mut points = Vec::with_capacity(self.holdings.len());
        let mut prev: Option<f64> = None;
        let mut equity = 1.0;
        for row in &self.holdings {
            let returns = match prev {
                Some(p) if p != 0.0 => row.total / p - 1.0,
                _ => 0.0,
            };
            equity *= 1.0 + returns;
            points.push(EquityPoint {
                datetime: row.datetime,
                total: row.total,
                returns,
                equity_curve: equity,
            });
            prev = Some(row.total);
        }
        points
    }
}

/// Keep one row per key, the last one seen, in key order.
///
/// The sort is stable, so among rows sharing a key the one recorded last
/// still wins.
pub fn dedup_last_wins<T, F>(mut rows: Vec<T>, key: F) -> Vec<T>
where
    F: Fn(&T) -> NaiveDateTime,
{
    rows.sort_by_key(|row| key(row));
    let mut out: Vec<T> = Vec::with_capacity(rows.len());
    for row in rows {
        match out.last_mut() {
            Some(last) if key(last) == key(&row) => *last = row,
            _ => out.push(row),
        }
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{Duration, NaiveDate};

    fn ts(day: i64) -> NaiveDateTime {
        NaiveDate::from_ymd_opt(2015, 4, 7)
            .unwrap()
            .and_hms_opt(0, 0, 0)
            .unwrap()
            + Duration::days(day)
    }

    fn holdings(day: i64, total: f64) -> HoldingsSnapshot {
        let mut row = HoldingsSnapshot::all_cash(ts(day), &["600008".to_string()], total);
        row.commission = day as f64;
        row
    }

    #[test]
    fn dedup_keeps_last_row_per_timestamp() {
        let rows = vec![holdings(0, 100.0), holdings(1, 101.0), holdings(1, 102.0), holdings(2, 99.0)];
        let out = dedup_last_wins(rows, |h| h.datetime);
        let totals: Vec<f64> = out.iter().map(|h| h.total).collect();
        assert_eq!(totals, vec![100.0, 102.0, 99.0]);
    }

    #[test]
    fn rows_out_of_order_come_out_sorted_and_unique() {
        // An opening row stamped after the first bar lands behind it.
        let rows = vec![holdings(3, 100.0), holdings(1, 101.0), holdings(2, 102.0), holdings(3, 103.0)];
        let out = dedup_last_wins(rows, |h| h.datetime);
        let stamps: Vec<NaiveDateTime> = out.iter().map(|h| h.datetime).collect();
        assert_eq!(stamps, vec![ts(1), ts(2), ts(3)]);
        assert_eq!(out[2].total, 103.0);

        let output = BacktestOutput::new(
            vec![],
            vec![holdings(3, 100.0), holdings(1, 101.0), holdings(2, 102.0)],
            vec![],
            EventCounters::default(),
        );
        let curve = output.equity_curve();
        assert!(curve.windows(2).all(|w| w[0].datetime < w[1].datetime));
    }

    #[test]
    fn equity_curve_compounds_returns() {
        let output = BacktestOutput::new(
            vec![],
            vec![holdings(0, 100.0), holdings(1, 110.0), holdings(2, 99.0)],
            vec![],
            EventCounters::default(),
        );
        let curve = output.equity_curve();
        assert_eq!(curve.len(), 3);
        assert_eq!(curve[0].returns, 0.0);
        assert_eq!(curve[0].equity_curve, 1.0);
        assert!((curve[1].returns - 0.1).abs() < 1e-12);
        assert!((curve[2].returns + 0.1).abs() < 1e-12);
        assert!((curve[2].equity_curve - 0.99).abs() < 1e-12);
        assert_eq!(output.final_total(), Some(99.0));
        assert_eq!(output.total_commission(), 2.0);
    }

    #[test]
    fn empty_output() {
        let output = BacktestOutput::new(vec![], vec![], vec![], EventCounters::default());
        assert!(output.equity_curve().is_empty());
        assert_eq!(output.final_total(), None);
        assert_eq!(output.total_commission(), 0.0);
    }
}
