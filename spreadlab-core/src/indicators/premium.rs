//! Premium and z-score series per pair, with the look-ahead guard.
//!
//! `premium = (high − low) / low` per date; the z-score measures how many
//! rolling standard deviations the current premium sits from its rolling
//! mean. The first `rolling_window` indices are forced to NaN: their
//! statistics come from a partially filled window and must never generate
//! a signal.

use crate::domain::{PairConfig, PriceTable};
use crate::error::ConfigError;
use crate::indicators::rolling::{rolling_mean, rolling_std};
use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

/// Full-length indicator series for one pair, aligned to the table dates.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PairSeries {
    pub pair: PairConfig,
    pub premium: Vec<f64>,
    pub rolling_mean: Vec<f64>,
    pub rolling_std: Vec<f64>,
    pub z_score: Vec<f64>,
}

/// Per-date view of one pair's indicators, used for signal selection.
#[derive(Debug, Clone, Copy)]
pub struct PairSnapshot<'a> {
    pub pair_index: usize,
    pub pair: &'a PairConfig,
    pub premium: f64,
    pub z_score: f64,
}

/// Precomputed indicators for every configured pair.
#[derive(Debug, Clone)]
pub struct IndicatorSet {
    dates: Vec<NaiveDate>,
    warmup: usize,
    series: Vec<PairSeries>,
}

impl IndicatorSet {
    pub fn len(&self) -> usize {
        self.dates.len()
    }

    pub fn is_empty(&self) -> bool {
        self.dates.is_empty()
    }

    pub fn dates(&self) -> &[NaiveDate] {
        &self.dates
    }

    /// Series in pair-configuration order.
    pub fn series(&self) -> &[PairSeries] {
        &self.series
    }

    /// First index allowed to generate a signal. Everything before this is
    /// warm-up and carries NaN z-scores by construction.
    pub fn tradeable_start(&self) -> usize {
        self.warmup
    }

    /// One date's snapshot across all pairs, in configuration order.
    pub fn snapshot_at(&self, index: usize) -> impl Iterator<Item = PairSnapshot<'_>> {
        self.series.iter().enumerate().map(move |(i, s)| PairSnapshot {
            pair_index: i,
            pair: &s.pair,
            premium: s.premium[index],
            z_score: s.z_score[index],
        })
    }
}

/// Compute premium and z-score series for every pair.
///
/// Pure function of its inputs. Fails only when a pair references a column
/// the table does not have at all — per-date gaps are data, not errors.
pub fn compute_indicators(
    table: &PriceTable,
    pairs: &[PairConfig],
    rolling_window: usize,
) -> Result<IndicatorSet, ConfigError> {
    if pairs.is_empty() {
        return Err(ConfigError::EmptyPairList);
    }
    let mut series = Vec::with_capacity(pairs.len());
    for pair in pairs {
        for column in [&pair.high_column, &pair.low_column] {
            if !table.has_column(column) {
                return Err(ConfigError::UnknownColumn {
                    pair_id: pair.pair_id.clone(),
                    column: column.clone(),
                });
            }
        }
        let premium = premium_series(table, pair);
        let mean = rolling_mean(&premium, rolling_window);
        let std = rolling_std(&premium, rolling_window);
        let z_score = z_series(&premium, &mean, &std, rolling_window);
        series.push(PairSeries {
            pair: pair.clone(),
            premium,
            rolling_mean: mean,
            rolling_std: std,
            z_score,
        });
    }
    Ok(IndicatorSet {
        dates: table.dates().to_vec(),
        warmup: rolling_window,
        series,
    })
}

/// `(high − low) / low` per date; NaN when either leg is missing or the
/// low leg is zero.
fn premium_series(table: &PriceTable, pair: &PairConfig) -> Vec<f64> {
    (0..table.len())
        .map(|i| {
            match (
                table.price(&pair.high_column, i),
                table.price(&pair.low_column, i),
            ) {
                (Some(high), Some(low)) if low != 0.0 => (high - low) / low,
                _ => f64::NAN,
            }
        })
        .collect()
}

/// Rolling stds below this are zero variance. Summing a window of
/// bit-identical premiums still rounds (std around 1e-17), and dividing by
/// that would turn a perfectly flat window into z = ±1.
const MIN_STD: f64 = 1e-12;

/// Z-score with the zero-variance and warm-up guards.
///
/// A flat window (std == 0) is "no divergence information", never an
/// infinite divergence, so it yields NaN rather than ±inf.
fn z_series(premium: &[f64], mean: &[f64], std: &[f64], warmup: usize) -> Vec<f64> {
    premium
        .iter()
        .zip(mean.iter().zip(std.iter()))
        .enumerate()
        .map(|(i, (&p, (&m, &s)))| {
            if i < warmup || s.is_nan() || s < MIN_STD {
                f64::NAN
            } else {
                (p - m) / s
            }
        })
        .collect()
}
