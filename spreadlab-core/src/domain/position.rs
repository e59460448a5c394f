//! The single open position.
//!
//! At most one position exists at a time; it is read-only for its whole
//! lifetime and is consumed into a `Trade` on exit.

use super::pair::Direction;
use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

/// An open two-leg position on one pair.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Position {
    /// Index into the active pair list (fixed for the whole run).
    pub pair_index: usize,
    pub pair_id: String,
    pub direction: Direction,
    pub entry_index: usize,
    pub entry_date: NaiveDate,
    /// Entry price of the premium's numerator leg.
    pub entry_price_high: f64,
    /// Entry price of the premium's denominator leg.
    pub entry_price_low: f64,
}

impl Position {
    /// Gross return at current leg prices: the average of both leg returns.
    ///
    /// Shorting the premium sells the high leg and buys the low leg, so the
    /// high leg profits when its price falls; long premium is the mirror.
    pub fn gross_return(&self, current_high: f64, current_low: f64) -> f64 {
        let (ret_high, ret_low) = match self.direction {
            Direction::ShortPremium => (
                (self.entry_price_high - current_high) / self.entry_price_high,
                (current_low - self.entry_price_low) / self.entry_price_low,
            ),
            Direction::LongPremium => (
                (current_high - self.entry_price_high) / self.entry_price_high,
                (self.entry_price_low - current_low) / self.entry_price_low,
            ),
        };
        (ret_high + ret_low) / 2.0
    }

    /// Calendar days held as of `date`.
    pub fn holding_days(&self, date: NaiveDate) -> i64 {
        (date - self.entry_date).num_days()
    }
}
