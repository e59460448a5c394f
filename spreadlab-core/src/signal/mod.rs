//! Signal selection — at most one candidate per date.
//!
//! Selection sees only the current date's indicator snapshot; it never
//! touches the position or the ledger. The engine decides what to do with
//! the result.

use crate::domain::Direction;
use crate::indicators::IndicatorSet;
use serde::{Deserialize, Serialize};

/// One pair's divergence on one date, with the direction that fades it.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Candidate {
    pub pair_index: usize,
    pub pair_id: String,
    pub direction: Direction,
    pub z_score: f64,
    pub premium: f64,
}

/// Outcome of selection for one date.
///
/// `actionable` is present only when the strongest divergence clears the
/// entry threshold. `best` is the strongest divergence regardless of the
/// threshold — advisory output for suggestion surfaces, never a signal.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Selection {
    pub actionable: Option<Candidate>,
    pub best: Option<Candidate>,
}

/// Pick the single strongest qualifying divergence at `index`.
///
/// Among pairs with a defined z-score, the maximum |z| wins; exact ties go
/// to the pair earliest in configuration order (strict `>` comparison over
/// a stable iteration). Warm-up indices never produce a selection.
pub fn select(indicators: &IndicatorSet, index: usize, entry_z: f64) -> Selection {
    if index < indicators.tradeable_start() {
        return Selection::default();
    }
    let best = rank(indicators, index).into_iter().next();
    let actionable = best
        .clone()
        .filter(|c| c.z_score.abs() > entry_z);
    Selection { actionable, best }
}

/// All pairs with a defined z-score at `index`, strongest first.
///
/// Sort is stable, so equal |z| keeps configuration order.
pub fn rank(indicators: &IndicatorSet, index: usize) -> Vec<Candidate> {
    if index < indicators.tradeable_start() {
        return Vec::new();
    }
    let mut candidates: Vec<Candidate> = indicators
        .snapshot_at(index)
        .filter(|s| !s.z_score.is_nan())
        .map(|s| Candidate {
            pair_index: s.pair_index,
            pair_id: s.pair.pair_id.clone(),
            direction: Direction::from_z(s.z_score),
            z_score: s.z_score,
            premium: s.premium,
        })
        .collect();
    candidates.sort_by(|a, b| {
        b.z_score
            .abs()
            .partial_cmp(&a.z_score.abs())
            .expect("z-scores are never NaN here")
    });
    candidates
}
