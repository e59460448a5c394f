//! Performance metrics — pure functions over the trade log and equity curve.
//!
//! Every metric is a pure function: trades and/or daily capital in, scalar
//! out. Degenerate input (no trades, flat curve, single day) yields 0, not
//! NaN and not an error. Crypto trades every calendar day, so annualization
//! uses a 365.25-day year.

use serde::{Deserialize, Serialize};
use spreadlab_core::domain::{DailyCapitalRecord, PriceTable, Trade};

const DAYS_PER_YEAR: f64 = 365.25;

/// Aggregate performance metrics for a single backtest run.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PerformanceMetrics {
    pub total_trades: usize,
    pub final_return: f64,
    pub annualized_return: f64,
    pub win_rate: f64,
    pub sharpe: f64,
    pub max_drawdown: f64,
    pub max_holding_days: i64,
    pub avg_holding_days: f64,
    pub benchmark_return: f64,
    pub excess_return: f64,
}

impl PerformanceMetrics {
    /// Compute all metrics from a simulation's outputs.
    ///
    /// `benchmark_return` is computed from the price series alone, so it is
    /// meaningful even when the strategy never traded.
    pub fn compute(
        trades: &[Trade],
        daily_capital: &[DailyCapitalRecord],
        initial_capital: f64,
        benchmark_return: f64,
    ) -> Self {
        let final_return = final_return(daily_capital, initial_capital);
        Self {
            total_trades: trades.len(),
            final_return,
            annualized_return: annualized_return(final_return, span_days(daily_capital)),
            win_rate: win_rate(trades),
            sharpe: sharpe_ratio(daily_capital),
            max_drawdown: max_drawdown(daily_capital),
            max_holding_days: trades.iter().map(|t| t.holding_days).max().unwrap_or(0),
            avg_holding_days: avg_holding_days(trades),
            benchmark_return,
            excess_return: final_return - benchmark_return,
        }
    }
}

// ─── Individual metric functions ────────────────────────────────────

/// Total return as a fraction: (final − initial) / initial.
pub fn final_return(daily_capital: &[DailyCapitalRecord], initial_capital: f64) -> f64 {
    if initial_capital <= 0.0 {
        return 0.0;
    }
    match daily_capital.last() {
        Some(last) => (last.capital - initial_capital) / initial_capital,
        None => 0.0,
    }
}

/// Calendar span of the equity curve in days.
pub fn span_days(daily_capital: &[DailyCapitalRecord]) -> i64 {
    match (daily_capital.first(), daily_capital.last()) {
        (Some(first), Some(last)) => (last.date - first.date).num_days(),
        _ => 0,
    }
}

/// Compound annualized return over `days`; 0 when the span is degenerate.
pub fn annualized_return(final_return: f64, days: i64) -> f64 {
    if days <= 0 {
        return 0.0;
    }
    (1.0 + final_return).powf(DAYS_PER_YEAR / days as f64) - 1.0
}

/// Fraction of trades with positive net return.
pub fn win_rate(trades: &[Trade]) -> f64 {
    if trades.is_empty() {
        return 0.0;
    }
    trades.iter().filter(|t| t.is_winner()).count() as f64 / trades.len() as f64
}

/// Annualized Sharpe ratio of the daily capital returns.
///
/// Sharpe = mean(daily returns) / std(daily returns) × √365.25.
/// Returns 0 when variance is zero or there are fewer than 2 points.
pub fn sharpe_ratio(daily_capital: &[DailyCapitalRecord]) -> f64 {
    let returns = daily_returns(daily_capital);
    if returns.len() < 2 {
        return 0.0;
    }
    let mean = mean_f64(&returns);
    let std = std_dev(&returns);
    if std < 1e-15 {
        return 0.0;
    }
    (mean / std) * DAYS_PER_YEAR.sqrt()
}

/// Maximum drawdown as a non-positive fraction of the running peak.
pub fn max_drawdown(daily_capital: &[DailyCapitalRecord]) -> f64 {
    if daily_capital.len() < 2 {
        return 0.0;
    }
    let mut peak = daily_capital[0].capital;
    let mut max_dd = 0.0_f64;
    for record in daily_capital {
        if record.capital > peak {
            peak = record.capital;
        }
        if peak > 0.0 {
            let dd = (record.capital - peak) / peak;
            if dd < max_dd {
                max_dd = dd;
            }
        }
    }
    max_dd
}

/// Mean holding period over the trade log.
pub fn avg_holding_days(trades: &[Trade]) -> f64 {
    if trades.is_empty() {
        return 0.0;
    }
    trades.iter().map(|t| t.holding_days as f64).sum::<f64>() / trades.len() as f64
}

/// Buy-and-hold return of a reference column: first to last priced date
/// in range. 0 when the column never has two priced dates.
pub fn benchmark_return(table: &PriceTable, column: &str) -> f64 {
    let first = (0..table.len()).find_map(|i| table.price(column, i));
    let last = (0..table.len()).rev().find_map(|i| table.price(column, i));
    match (first, last) {
        (Some(first), Some(last)) if first > 0.0 => (last - first) / first,
        _ => 0.0,
    }
}

// ─── Helpers ────────────────────────────────────────────────────────

/// Daily pct-change series of the capital curve.
pub fn daily_returns(daily_capital: &[DailyCapitalRecord]) -> Vec<f64> {
    if daily_capital.len() < 2 {
        return Vec::new();
    }
    daily_capital
        .windows(2)
        .map(|w| {
            if w[0].capital > 0.0 {
                (w[1].capital - w[0].capital) / w[0].capital
            } else {
                0.0
            }
        })
        .collect()
}

fn mean_f64(values: &[f64]) -> f64 {
    if values.is_empty() {
        return 0.0;
    }
    values.iter().sum::<f64>() / values.len() as f64
}

fn std_dev(values: &[f64]) -> f64 {
    if values.len() < 2 {
        return 0.0;
    }
    let mean = mean_f64(values);
    let variance =
        values.iter().map(|v| (v - mean).powi(2)).sum::<f64>() / (values.len() - 1) as f64;
    variance.sqrt()
}
