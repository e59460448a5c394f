//! Single-date trade recommendation.
//!
//! Reuses the indicator engine and the state machine in single-trade mode:
//! pick the strongest divergence on the target date, then forward-run the
//! position from there to project what the trade would have done. Business
//! non-findings (no qualifying pair, date off the calendar) are structured
//! results with an advisory fallback, never errors.

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use tracing::debug;

use spreadlab_core::domain::{Direction, ExitReason};
use spreadlab_core::engine::{apply_exclusions, project_position};
use spreadlab_core::indicators::compute_indicators;
use spreadlab_core::signal::{rank, select, Candidate};
use spreadlab_core::ConfigError;

use crate::config::BacktestConfig;
use crate::data_loader::LoadedTable;
use crate::runner::RunError;

/// Result of a recommendation attempt.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "outcome", rename_all = "snake_case")]
pub enum RecommendOutcome {
    InsufficientData { rows: usize, required: usize },
    Report(Box<RecommendReport>),
}

/// A recommendation for one date.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RecommendReport {
    pub requested_date: NaiveDate,
    /// Nearest tradeable date with data; equals `requested_date` when the
    /// request was on the calendar.
    pub resolved_date: NaiveDate,
    /// `resolved_date − requested_date` in days.
    pub day_distance: i64,
    pub capital: f64,
    pub recommendation: Recommendation,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum Recommendation {
    /// A qualifying divergence, with a forward projection of the trade.
    Trade {
        idea: TradeIdea,
        /// Up to two next-strongest pairs, strongest first.
        alternatives: Vec<Candidate>,
    },
    /// Nothing cleared the threshold. The best candidate is surfaced so
    /// the caller can decide whether to relax `entry_z`.
    NoQualifyingPair {
        suggestion: Option<Candidate>,
        /// Every pair with a defined z-score, strongest first.
        ranked: Vec<Candidate>,
    },
}

/// A recommended trade plus its forward projection.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TradeIdea {
    pub pair_id: String,
    pub direction: Direction,
    pub z_score: f64,
    pub premium: f64,
    /// Projected net return of the round trip.
    pub expected_return: f64,
    pub expected_holding_days: i64,
    /// None when no exit fired inside the loaded window (marked to market
    /// at the window end instead).
    pub expected_exit_reason: Option<ExitReason>,
    pub expected_profit: f64,
}

/// Produce a recommendation for `target_date`.
pub fn recommend(
    config: &BacktestConfig,
    data: &LoadedTable,
    target_date: NaiveDate,
    capital: f64,
) -> Result<RecommendOutcome, RunError> {
    let params = &config.strategy;
    params.validate()?;
    let pairs = apply_exclusions(&config.resolve_pairs(), &params.exclude_pairs);
    if pairs.is_empty() {
        return Err(RunError::Config(ConfigError::EmptyPairList));
    }

    let table = &data.table;
    let required = params.rolling_window + 1;
    if table.len() < required {
        return Ok(RecommendOutcome::InsufficientData {
            rows: table.len(),
            required,
        });
    }

    let indicators = compute_indicators(table, &pairs, params.rolling_window)?;

    // Resolve the request to the nearest date with data, then clamp into
    // the tradeable region — warm-up dates have no statistics to rank.
    let (nearest, _) = table
        .nearest_index(target_date)
        .expect("table is never empty here");
    let index = nearest.max(indicators.tradeable_start());
    let resolved_date = table.date_at(index);
    let day_distance = (resolved_date - target_date).num_days();
    debug!(%target_date, %resolved_date, day_distance, "resolved recommendation date");

    let selection = select(&indicators, index, params.entry_z);
    let ranked = rank(&indicators, index);

    let recommendation = match selection.actionable {
        Some(candidate) => {
            let projection =
                project_position(table, &indicators, &pairs, &candidate, index, params);
            // A selected candidate always has entry prices, so projection
            // only degenerates when the window ends on the entry date.
            let (expected_return, expected_holding_days, expected_exit_reason) = match projection
            {
                Some(p) => (p.net_return, p.holding_days, p.exit_reason),
                None => (0.0, 0, None),
            };
            let idea = TradeIdea {
                pair_id: candidate.pair_id.clone(),
                direction: candidate.direction,
                z_score: candidate.z_score,
                premium: candidate.premium,
                expected_return,
                expected_holding_days,
                expected_exit_reason,
                expected_profit: capital * expected_return,
            };
            let alternatives: Vec<Candidate> = ranked
                .into_iter()
                .filter(|c| c.pair_id != candidate.pair_id)
                .take(2)
                .collect();
            Recommendation::Trade { idea, alternatives }
        }
        None => Recommendation::NoQualifyingPair {
            suggestion: selection.best,
            ranked,
        },
    };

    Ok(RecommendOutcome::Report(Box::new(RecommendReport {
        requested_date: target_date,
        resolved_date,
        day_distance,
        capital,
        recommendation,
    })))
}
