//! Tradeable exchange pairs.
//!
//! A pair names the two price columns its premium is computed from.
//! Pairs are enumerated explicitly, once, at setup — no stringly-typed
//! column lookups by convention. Enumeration order matters: it is the
//! tie-break priority when two pairs diverge equally hard.

use serde::{Deserialize, Serialize};

/// One tradeable exchange pair, resolved to concrete price columns.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PairConfig {
    /// Stable identifier, e.g. `"alpha_beta"`.
    pub pair_id: String,
    /// Column whose price is the premium numerator leg.
    pub high_column: String,
    /// Column whose price is the premium denominator leg.
    pub low_column: String,
}

impl PairConfig {
    /// Pair with the conventional `"{high}_{low}"` id.
    pub fn new(high_column: impl Into<String>, low_column: impl Into<String>) -> Self {
        let high_column = high_column.into();
        let low_column = low_column.into();
        Self {
            pair_id: format!("{high_column}_{low_column}"),
            high_column,
            low_column,
        }
    }
}

/// All pairs over an ordered exchange list: `(e[i], e[j])` for `i < j`.
///
/// The input order fixes both each pair's high/low roles and the canonical
/// priority order, so the same list always yields the same universe.
pub fn enumerate_pairs<S: AsRef<str>>(exchanges: &[S]) -> Vec<PairConfig> {
    let mut pairs = Vec::new();
    for i in 0..exchanges.len() {
        for j in (i + 1)..exchanges.len() {
            pairs.push(PairConfig::new(exchanges[i].as_ref(), exchanges[j].as_ref()));
        }
    }
    pairs
}

/// Which side of the premium a position takes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Direction {
    /// Premium is abnormally high: sell the high leg, buy the low leg.
    ShortPremium,
    /// Premium is abnormally low: buy the high leg, sell the low leg.
    LongPremium,
}

impl Direction {
    /// Direction implied by a z-score: positive divergence is shorted.
    pub fn from_z(z: f64) -> Self {
        if z > 0.0 {
            Direction::ShortPremium
        } else {
            Direction::LongPremium
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Direction::ShortPremium => "short_premium",
            Direction::LongPremium => "long_premium",
        }
    }
}
