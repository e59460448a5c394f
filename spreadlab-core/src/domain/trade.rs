//! Trade — a closed round trip, created exactly once on exit.

use super::pair::Direction;
use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

/// Why a position was closed. The three state-machine exits are evaluated
/// in this priority order; `EndOfData` only appears when the caller asks
/// for a mark-to-market close of a position still open at range end.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ExitReason {
    ZScoreReversion,
    StopLoss,
    MaxHoldingDays,
    EndOfData,
}

impl ExitReason {
    pub fn as_str(&self) -> &'static str {
        match self {
            ExitReason::ZScoreReversion => "z_score_reversion",
            ExitReason::StopLoss => "stop_loss",
            ExitReason::MaxHoldingDays => "max_holding_days",
            ExitReason::EndOfData => "end_of_data",
        }
    }
}

/// A completed round-trip trade.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Trade {
    pub pair_id: String,
    pub direction: Direction,
    pub entry_date: NaiveDate,
    pub exit_date: NaiveDate,
    pub holding_days: i64,
    pub gross_return: f64,
    /// Gross return minus the round-trip cost, charged once per trade.
    pub net_return: f64,
    pub profit: f64,
    pub capital_after: f64,
    pub exit_reason: ExitReason,
}

impl Trade {
    pub fn is_winner(&self) -> bool {
        self.net_return > 0.0
    }
}
