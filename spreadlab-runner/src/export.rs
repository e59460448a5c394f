//! Flat-file artifacts for external consumers (UI, persistence).
//!
//! The run directory gets the trade tape, the equity curve, and the full
//! result JSON, named by run-id prefix so reruns never clobber each other.

use anyhow::{Context, Result};
use std::fs::File;
use std::io::Write;
use std::path::Path;

use spreadlab_core::domain::{DailyCapitalRecord, Trade};

use crate::runner::BacktestResult;

pub fn write_trades_csv(path: &Path, trades: &[Trade]) -> Result<()> {
    let mut file = File::create(path)
        .with_context(|| format!("failed to create trades CSV {}", path.display()))?;

    writeln!(
        file,
        "pair_id,direction,entry_date,exit_date,holding_days,gross_return,net_return,profit,capital_after,exit_reason"
    )?;
    for trade in trades {
        writeln!(
            file,
            "{},{},{},{},{},{:.6},{:.6},{:.2},{:.2},{}",
            trade.pair_id,
            trade.direction.as_str(),
            trade.entry_date,
            trade.exit_date,
            trade.holding_days,
            trade.gross_return,
            trade.net_return,
            trade.profit,
            trade.capital_after,
            trade.exit_reason.as_str(),
        )?;
    }
    Ok(())
}

pub fn write_trades_json(path: &Path, trades: &[Trade]) -> Result<()> {
    let json = serde_json::to_string_pretty(trades).context("failed to serialize trades")?;
    std::fs::write(path, json)
        .with_context(|| format!("failed to write trades JSON {}", path.display()))?;
    Ok(())
}

pub fn write_equity_csv(path: &Path, daily_capital: &[DailyCapitalRecord]) -> Result<()> {
    let mut file = File::create(path)
        .with_context(|| format!("failed to create equity CSV {}", path.display()))?;

    writeln!(file, "date,capital")?;
    for record in daily_capital {
        writeln!(file, "{},{:.2}", record.date, record.capital)?;
    }
    Ok(())
}

pub fn write_result_json(path: &Path, result: &BacktestResult) -> Result<()> {
    let json = serde_json::to_string_pretty(result).context("failed to serialize result")?;
    std::fs::write(path, json)
        .with_context(|| format!("failed to write result JSON {}", path.display()))?;
    Ok(())
}

/// Write the full artifact set under `dir`, named by run id prefix.
///
/// Returns the paths written, result JSON first.
pub fn save_artifacts(dir: &Path, result: &BacktestResult) -> Result<Vec<std::path::PathBuf>> {
    std::fs::create_dir_all(dir)
        .with_context(|| format!("failed to create output dir {}", dir.display()))?;
    let prefix = &result.run_id[..12.min(result.run_id.len())];

    let result_path = dir.join(format!("{prefix}_result.json"));
    let trades_csv = dir.join(format!("{prefix}_trades.csv"));
    let trades_json = dir.join(format!("{prefix}_trades.json"));
    let equity_csv = dir.join(format!("{prefix}_equity.csv"));

    write_result_json(&result_path, result)?;
    write_trades_csv(&trades_csv, &result.trades)?;
    write_trades_json(&trades_json, &result.trades)?;
    write_equity_csv(&equity_csv, &result.daily_capital)?;

    Ok(vec![result_path, trades_csv, trades_json, equity_csv])
}
