//! CSV and JSON writers for run artifacts.
//!
//! Ledger tables have one column per symbol, in configured order.

use anyhow::{Context, Result};
use barlab_core::engine::EquityPoint;
use barlab_core::portfolio::{HoldingsSnapshot, PositionsSnapshot, TradeRecord};
use std::path::Path;

use crate::runner::RunReport;

pub fn write_report_json(path: &Path, report: &RunReport) -> Result<()> {
    let json = serde_json::to_string_pretty(report).context("Failed to serialize run report")?;
    std::fs::write(path, json)
        .with_context(|| format!("Failed to write report JSON {}", path.display()))?;
    Ok(())
}

/// Read a report written by [`write_report_json`].
pub fn read_report_json(path: &Path) -> Result<RunReport> {
    let text = std::fs::read_to_string(path)
        .with_context(|| format!("Failed to read report JSON {}", path.display()))?;
    serde_json::from_str(&text)
        .with_context(|| format!("Failed to parse report JSON {}", path.display()))
}

fn create_writer(path: &Path, what: &str) -> Result<csv::Writer<std::fs::File>> {
    csv::Writer::from_path(path)
        .with_context(|| format!("Failed to create {what} CSV {}", path.display()))
}

pub fn write_positions_csv(
    path: &Path,
    symbols: &[String],
    rows: &[PositionsSnapshot],
) -> Result<()> {
    let mut writer = create_writer(path, "positions")?;
    let mut header = vec!["datetime".to_string()];
    header.extend(symbols.iter().cloned());
    writer.write_record(&header)?;

    for row in rows {
        let mut record = vec![row.datetime.to_string()];
        record.extend(symbols.iter().map(|s| row.get(s).to_string()));
        writer.write_record(&record)?;
    }
    writer.flush()?;
    Ok(())
}

pub fn write_holdings_csv(
    path: &Path,
    symbols: &[String],
    rows: &[HoldingsSnapshot],
) -> Result<()> {
    let mut writer = create_writer(path, "holdings")?;
    let mut header = vec!["datetime".to_string()];
    header.extend(symbols.iter().cloned());
    header.extend(["cash", "commission", "total"].map(String::from));
    writer.write_record(&header)?;

    for row in rows {
        let mut record = vec![row.datetime.to_string()];
        record.extend(symbols.iter().map(|s| format!("{:.4}", row.get(s))));
        record.push(format!("{:.4}", row.cash));
        record.push(format!("{:.4}", row.commission));
        record.push(format!("{:.4}", row.total));
        writer.write_record(&record)?;
    }
    writer.flush()?;
    Ok(())
}

pub fn write_trades_csv(path: &Path, trades: &[TradeRecord]) -> Result<()> {
    let mut writer = create_writer(path, "trades")?;
    writer.write_record([
        "datetime",
        "symbol",
        "exchange",
        "direction",
        "quantity",
        "fill_price",
        "commission",
    ])?;
    for trade in trades {
        writer.write_record([
            trade.datetime.to_string(),
            trade.symbol.clone(),
            trade.exchange.clone(),
            trade.direction.to_string(),
            trade.quantity.to_string(),
            format!("{:.4}", trade.fill_price),
            format!("{:.4}", trade.commission),
        ])?;
    }
    writer.flush()?;
    Ok(())
}

pub fn write_equity_csv(path: &Path, curve: &[EquityPoint]) -> Result<()> {
    let mut writer = create_writer(path, "equity")?;
    writer.write_record(["datetime", "total", "returns", "equity_curve"])?;
    for point in curve {
        writer.write_record([
            point.datetime.to_string(),
            format!("{:.4}", point.total),
            format!("{:.8}", point.returns),
            format!("{:.8}", point.equity_curve),
        ])?;
    }
    writer.flush()?;
    Ok(())
}
