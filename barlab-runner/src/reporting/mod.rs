//! Run export: ledger tables as CSV and the full report as JSON.

pub mod export;

use anyhow::{Context, Result};
use std::path::{Path, PathBuf};

use crate::runner::RunReport;

/// Paths written for one run.
#[derive(Debug, Clone)]
pub struct ReportPaths {
    pub run_dir: PathBuf,
    pub report_json: PathBuf,
    pub positions_csv: PathBuf,
    pub holdings_csv: PathBuf,
    pub trades_csv: PathBuf,
    pub equity_csv: PathBuf,
}

/// Writes every artifact for a run under `<output_dir>/<run_id>/`.
#[derive(Debug, Clone)]
pub struct ReportWriter {
    output_dir: PathBuf,
}

impl ReportWriter {
    pub fn new(output_dir: impl AsRef<Path>) -> Result<Self> {
        let output_dir = output_dir.as_ref().to_path_buf();
        std::fs::create_dir_all(&output_dir).with_context(|| {
            format!("Failed to create output directory {}", output_dir.display())
        })?;
        Ok(Self { output_dir })
    }

    pub fn output_dir(&self) -> &Path {
        &self.output_dir
    }

    pub fn save_run(&self, report: &RunReport) -> Result<ReportPaths> {
        let run_dir = self.output_dir.join(&report.run_id);
        std::fs::create_dir_all(&run_dir)
            .with_context(|| format!("Failed to create run directory {}", run_dir.display()))?;

        let symbols = &report.config.data.symbols;
        let output = &report.output;

        let report_json = run_dir.join("report.json");
        export::write_report_json(&report_json, report)?;

        let positions_csv = run_dir.join("positions.csv");
        export::write_positions_csv(&positions_csv, symbols, &output.positions)?;

        let holdings_csv = run_dir.join("holdings.csv");
        export::write_holdings_csv(&holdings_csv, symbols, &output.holdings)?;

        let trades_csv = run_dir.join("trades.csv");
        export::write_trades_csv(&trades_csv, &output.trades)?;

        let equity_csv = run_dir.join("equity.csv");
        export::write_equity_csv(&equity_csv, &output.equity_curve())?;

        Ok(ReportPaths {
            run_dir,
            report_json,
            positions_csv,
            holdings_csv,
            trades_csv,
            equity_csv,
        })
    }
}
