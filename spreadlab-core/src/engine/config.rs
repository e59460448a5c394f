//! Strategy parameters and their invariants.
//!
//! One parameterized engine covers every operating mode — thresholds and
//! windows are knobs, not code forks. Invalid combinations are programming
//! mistakes and fail loudly before any data is touched.

use crate::domain::PairConfig;
use crate::error::ConfigError;
use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;

/// All tunable parameters of a simulation run.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct StrategyParams {
    pub initial_capital: f64,
    pub fee_rate: f64,
    pub slippage: f64,
    pub rolling_window: usize,
    /// Entry fires when the best |z| strictly exceeds this.
    pub entry_z: f64,
    /// Mean-reversion exit fires when the held pair's |z| drops below this.
    pub exit_z: f64,
    /// Stop-loss threshold on unrealized net return; must be negative.
    pub stop_loss: f64,
    pub max_holding_days: i64,
    /// Pair ids to ignore entirely (e.g. a structurally noisy pair).
    pub exclude_pairs: BTreeSet<String>,
    /// Mark-to-market close of a position still open at range end.
    pub close_at_end: bool,
}

impl Default for StrategyParams {
    fn default() -> Self {
        Self {
            initial_capital: 100_000_000.0,
            fee_rate: 0.0005,
            slippage: 0.0002,
            rolling_window: 30,
            entry_z: 2.0,
            exit_z: 0.5,
            stop_loss: -0.03,
            max_holding_days: 30,
            exclude_pairs: BTreeSet::new(),
            close_at_end: false,
        }
    }
}

impl StrategyParams {
    /// Round-trip cost charged once per trade: entry plus exit on both
    /// legs, as a lump deduction.
    pub fn round_trip_cost(&self) -> f64 {
        (self.fee_rate + self.slippage) * 2.0
    }

    /// Validate invariants. Everything here is a config mistake, not a
    /// data condition.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if !(self.initial_capital > 0.0) {
            return Err(ConfigError::NonPositiveCapital(self.initial_capital));
        }
        if self.rolling_window == 0 {
            return Err(ConfigError::ZeroRollingWindow);
        }
        if !(self.entry_z > 0.0) {
            return Err(ConfigError::NonPositiveEntryZ(self.entry_z));
        }
        if !(self.exit_z >= 0.0) {
            return Err(ConfigError::NegativeExitZ(self.exit_z));
        }
        if self.exit_z >= self.entry_z {
            return Err(ConfigError::ExitAboveEntry {
                entry_z: self.entry_z,
                exit_z: self.exit_z,
            });
        }
        if !(self.stop_loss < 0.0) {
            return Err(ConfigError::NonNegativeStopLoss(self.stop_loss));
        }
        if self.max_holding_days <= 0 {
            return Err(ConfigError::ZeroMaxHoldingDays);
        }
        Ok(())
    }
}

/// Drop excluded pairs, keeping configuration order.
pub fn apply_exclusions(pairs: &[PairConfig], exclude: &BTreeSet<String>) -> Vec<PairConfig> {
    pairs
        .iter()
        .filter(|p| !exclude.contains(&p.pair_id))
        .cloned()
        .collect()
}
