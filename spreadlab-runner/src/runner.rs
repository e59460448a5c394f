//! Backtest runner — wires configuration, engine, and metrics together.

use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::{debug, info};

use spreadlab_core::domain::{DailyCapitalRecord, Trade};
use spreadlab_core::engine::{
    run_simulation, OpenPositionReport, SimulationOutcome, StrategyParams,
};
use spreadlab_core::ConfigError;

use crate::config::{BacktestConfig, ConfigFileError};
use crate::data_loader::{LoadError, LoadedTable};
use crate::metrics::{benchmark_return, PerformanceMetrics};

/// Errors from the runner. Everything here is configuration or I/O; data
/// conditions surface as [`BacktestOutcome::InsufficientData`].
#[derive(Debug, Error)]
pub enum RunError {
    #[error("config error: {0}")]
    Config(#[from] ConfigError),
    #[error("config file error: {0}")]
    ConfigFile(#[from] ConfigFileError),
    #[error("data error: {0}")]
    Data(#[from] LoadError),
}

/// Current schema version for persisted artifacts.
pub const SCHEMA_VERSION: u32 = 1;

/// Result of a backtest attempt.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "outcome", rename_all = "snake_case")]
pub enum BacktestOutcome {
    /// Fewer rows than the rolling window needs: explain, don't fail.
    InsufficientData { rows: usize, required: usize },
    Completed(Box<BacktestResult>),
}

/// Complete, serializable result of a single backtest run.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BacktestResult {
    /// Schema version for forward-compatible deserialization.
    #[serde(default = "default_schema_version")]
    pub schema_version: u32,
    pub run_id: String,
    pub dataset_hash: String,
    pub has_synthetic: bool,
    pub params: StrategyParams,
    pub pair_ids: Vec<String>,
    pub metrics: PerformanceMetrics,
    pub trades: Vec<Trade>,
    pub daily_capital: Vec<DailyCapitalRecord>,
    pub initial_capital: f64,
    pub final_capital: f64,
    pub open_position: Option<OpenPositionReport>,
}

fn default_schema_version() -> u32 {
    SCHEMA_VERSION
}

/// Run a full backtest over pre-loaded data.
pub fn run_backtest(
    config: &BacktestConfig,
    data: &LoadedTable,
) -> Result<BacktestOutcome, RunError> {
    let pairs = config.resolve_pairs();
    let params = &config.strategy;
    debug!(
        pairs = pairs.len(),
        rows = data.table.len(),
        "starting simulation"
    );

    let report = match run_simulation(&data.table, &pairs, params)? {
        SimulationOutcome::InsufficientData { rows, required } => {
            info!(rows, required, "not enough data to simulate");
            return Ok(BacktestOutcome::InsufficientData { rows, required });
        }
        SimulationOutcome::Completed(report) => report,
    };

    let benchmark = benchmark_return(&data.table, &config.data.benchmark_column);
    let metrics = PerformanceMetrics::compute(
        &report.trades,
        &report.daily_capital,
        report.initial_capital,
        benchmark,
    );
    info!(
        trades = report.trades.len(),
        final_return = metrics.final_return,
        "simulation complete"
    );

    Ok(BacktestOutcome::Completed(Box::new(BacktestResult {
        schema_version: SCHEMA_VERSION,
        run_id: config.run_id(),
        dataset_hash: data.dataset_hash.clone(),
        has_synthetic: data.has_synthetic,
        params: params.clone(),
        pair_ids: pairs.into_iter().map(|p| p.pair_id).collect(),
        metrics,
        initial_capital: report.initial_capital,
        final_capital: report.final_capital,
        trades: report.trades,
        daily_capital: report.daily_capital,
        open_position: report.open_position,
    })))
}
