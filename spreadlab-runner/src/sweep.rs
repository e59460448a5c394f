//! Parameter sweep utilities for grid search over strategy knobs.

use rayon::prelude::*;
use serde::{Deserialize, Serialize};
use tracing::info;

use spreadlab_core::domain::PairConfig;
use spreadlab_core::engine::{run_simulation, SimulationOutcome, StrategyParams};

use crate::data_loader::LoadedTable;
use crate::metrics::PerformanceMetrics;
use crate::runner::RunError;

/// Parameter grid specification.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ParamGrid {
    pub entry_zs: Vec<f64>,
    pub exit_zs: Vec<f64>,
    pub rolling_windows: Vec<usize>,
    pub stop_losses: Vec<f64>,
}

impl ParamGrid {
    /// A modest default grid around the standard parameterization.
    pub fn standard() -> Self {
        Self {
            entry_zs: vec![2.0, 2.5, 3.0],
            exit_zs: vec![0.0, 0.5],
            rolling_windows: vec![20, 30, 60],
            stop_losses: vec![-0.03, -0.05],
        }
    }

    /// Upper bound on grid size (before invalid combinations are dropped).
    pub fn size(&self) -> usize {
        self.entry_zs.len() * self.exit_zs.len() * self.rolling_windows.len()
            * self.stop_losses.len()
    }

    /// All valid parameter sets in the grid. Combinations that would fail
    /// validation (`exit_z >= entry_z`) are skipped at generation.
    pub fn generate(&self, base: &StrategyParams) -> Vec<StrategyParams> {
        let mut configs = Vec::new();
        for &entry_z in &self.entry_zs {
            for &exit_z in &self.exit_zs {
                if exit_z >= entry_z {
                    continue;
                }
                for &rolling_window in &self.rolling_windows {
                    for &stop_loss in &self.stop_losses {
                        configs.push(StrategyParams {
                            entry_z,
                            exit_z,
                            rolling_window,
                            stop_loss,
                            ..base.clone()
                        });
                    }
                }
            }
        }
        configs
    }
}

/// One completed sweep cell.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SweepEntry {
    pub params: StrategyParams,
    pub metrics: PerformanceMetrics,
}

/// Run the grid over the same data, in parallel, and return completed
/// runs sorted by final return (best first).
///
/// Each cell owns an independent simulation — no shared mutable state —
/// so rayon fans them out safely. Cells with too little data for their
/// window are dropped (and counted in the log).
pub fn run_sweep(
    grid: &ParamGrid,
    base: &StrategyParams,
    pairs: &[PairConfig],
    data: &LoadedTable,
    benchmark_return: f64,
) -> Result<Vec<SweepEntry>, RunError> {
    let configs = grid.generate(base);
    info!(cells = configs.len(), "starting parameter sweep");

    let results: Vec<Result<Option<SweepEntry>, RunError>> = configs
        .into_par_iter()
        .map(|params| {
            match run_simulation(&data.table, pairs, &params)? {
                SimulationOutcome::InsufficientData { .. } => Ok(None),
                SimulationOutcome::Completed(report) => {
                    let metrics = PerformanceMetrics::compute(
                        &report.trades,
                        &report.daily_capital,
                        report.initial_capital,
                        benchmark_return,
                    );
                    Ok(Some(SweepEntry { params, metrics }))
                }
            }
        })
        .collect();

    let mut entries = Vec::new();
    let mut skipped = 0usize;
    for result in results {
        match result? {
            Some(entry) => entries.push(entry),
            None => skipped += 1,
        }
    }
    if skipped > 0 {
        info!(skipped, "sweep cells dropped for insufficient data");
    }

    entries.sort_by(|a, b| {
        b.metrics
            .final_return
            .partial_cmp(&a.metrics.final_return)
            .expect("final returns are finite")
    });
    Ok(entries)
}
