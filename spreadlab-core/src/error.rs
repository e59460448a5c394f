//! Configuration errors — the only conditions the engine raises for.
//!
//! Data-dependent "cannot proceed" states (too few rows, no qualifying
//! signal, a price gap on one date) are structured results, not errors.

use thiserror::Error;

/// Invalid parameter combinations. These indicate a programming or config
/// mistake rather than a data condition, so they propagate as `Err`.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum ConfigError {
    #[error("initial_capital must be positive, got {0}")]
    NonPositiveCapital(f64),

    #[error("rolling_window must be at least 1")]
    ZeroRollingWindow,

    #[error("entry_z must be positive, got {0}")]
    NonPositiveEntryZ(f64),

    #[error("exit_z must be non-negative, got {0}")]
    NegativeExitZ(f64),

    #[error("exit_z ({exit_z}) must be strictly below entry_z ({entry_z})")]
    ExitAboveEntry { entry_z: f64, exit_z: f64 },

    #[error("stop_loss must be negative (a loss threshold), got {0}")]
    NonNegativeStopLoss(f64),

    #[error("max_holding_days must be at least 1")]
    ZeroMaxHoldingDays,

    #[error("pair list is empty (or fully excluded)")]
    EmptyPairList,

    #[error("pair '{pair_id}' references unknown price column '{column}'")]
    UnknownColumn { pair_id: String, column: String },
}
