//! Price table — the engine's input: one row per date, one normalized
//! price column per exchange.
//!
//! The table is immutable once built. Gaps are explicit NaNs; the engine
//! never infers missing dates (non-trading days are the provider's
//! problem). Column order is preserved from construction, which keeps
//! everything downstream deterministic.

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Errors from price-table construction. These are provider-contract
/// violations, not market data conditions.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum TableError {
    #[error("price table has no rows")]
    Empty,

    #[error("column '{column}' has {got} values for {expected} dates")]
    LengthMismatch {
        column: String,
        expected: usize,
        got: usize,
    },

    #[error("dates must be strictly ascending: {prev} then {next} at row {row}")]
    NonAscendingDates {
        row: usize,
        prev: NaiveDate,
        next: NaiveDate,
    },

    #[error("duplicate price column '{0}'")]
    DuplicateColumn(String),
}

/// Daily price table keyed by date, one `f64` column per exchange.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PriceTable {
    dates: Vec<NaiveDate>,
    columns: Vec<(String, Vec<f64>)>,
}

impl PriceTable {
    /// Build a table, validating shape and date ordering.
    pub fn new(
        dates: Vec<NaiveDate>,
        columns: Vec<(String, Vec<f64>)>,
    ) -> Result<Self, TableError> {
        if dates.is_empty() {
            return Err(TableError::Empty);
        }
        for w in dates.windows(2) {
            if w[1] <= w[0] {
                let row = dates.iter().position(|d| *d == w[1]).unwrap_or(0);
                return Err(TableError::NonAscendingDates {
                    row,
                    prev: w[0],
                    next: w[1],
                });
            }
        }
        for (i, (name, values)) in columns.iter().enumerate() {
            if values.len() != dates.len() {
                return Err(TableError::LengthMismatch {
                    column: name.clone(),
                    expected: dates.len(),
                    got: values.len(),
                });
            }
            if columns[..i].iter().any(|(other, _)| other == name) {
                return Err(TableError::DuplicateColumn(name.clone()));
            }
        }
        Ok(Self { dates, columns })
    }

    pub fn len(&self) -> usize {
        self.dates.len()
    }

    pub fn is_empty(&self) -> bool {
        self.dates.is_empty()
    }

    pub fn dates(&self) -> &[NaiveDate] {
        &self.dates
    }

    pub fn date_at(&self, index: usize) -> NaiveDate {
        self.dates[index]
    }

    pub fn first_date(&self) -> NaiveDate {
        self.dates[0]
    }

    pub fn last_date(&self) -> NaiveDate {
        *self.dates.last().expect("table is never empty")
    }

    pub fn column_names(&self) -> impl Iterator<Item = &str> {
        self.columns.iter().map(|(name, _)| name.as_str())
    }

    pub fn has_column(&self, name: &str) -> bool {
        self.columns.iter().any(|(n, _)| n == name)
    }

    /// Full column as a slice, or None if the column does not exist.
    pub fn column(&self, name: &str) -> Option<&[f64]> {
        self.columns
            .iter()
            .find(|(n, _)| n == name)
            .map(|(_, v)| v.as_slice())
    }

    /// Price for a column at a row. None when the column is absent or the
    /// cell is an explicit NaN gap — both read as "missing" downstream.
    pub fn price(&self, name: &str, index: usize) -> Option<f64> {
        let value = *self.column(name)?.get(index)?;
        if value.is_nan() {
            None
        } else {
            Some(value)
        }
    }

    /// Exact row index for a date.
    pub fn index_of(&self, date: NaiveDate) -> Option<usize> {
        self.dates.binary_search(&date).ok()
    }

    /// Row index nearest to `date`, with the signed day distance
    /// (`resolved - requested`). None only for an empty range.
    pub fn nearest_index(&self, date: NaiveDate) -> Option<(usize, i64)> {
        if self.dates.is_empty() {
            return None;
        }
        let idx = match self.dates.binary_search(&date) {
            Ok(i) => return Some((i, 0)),
            Err(i) => i,
        };
        let candidates = [idx.checked_sub(1), (idx < self.dates.len()).then_some(idx)];
        candidates
            .iter()
            .flatten()
            .map(|&i| (i, (self.dates[i] - date).num_days()))
            .min_by_key(|(_, dist)| (dist.abs(), *dist))
    }
}
