//! CSV price-table loading.
//!
//! Input format: a `date` column (`%Y-%m-%d`) followed by one numeric
//! price column per exchange. Empty cells are explicit gaps and become
//! NaN; the engine never infers missing dates. Every loaded table gets a
//! BLAKE3 dataset hash so results can say exactly what they were run on.

use chrono::NaiveDate;
use spreadlab_core::domain::{PriceTable, TableError};
use std::path::{Path, PathBuf};
use thiserror::Error;

/// Errors from the data loading layer.
#[derive(Debug, Error)]
pub enum LoadError {
    #[error("cannot read price file '{path}': {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("malformed CSV in '{path}': {source}")]
    Csv {
        path: PathBuf,
        #[source]
        source: csv::Error,
    },

    #[error("first column must be 'date', got '{0}'")]
    MissingDateHeader(String),

    #[error("price file has no price columns")]
    NoPriceColumns,

    #[error("bad date '{value}' at row {row}")]
    BadDate { row: usize, value: String },

    #[error("bad number '{value}' at row {row}, column '{column}'")]
    BadNumber {
        row: usize,
        column: String,
        value: String,
    },

    #[error("invalid price table: {0}")]
    Table(#[from] TableError),
}

/// A loaded table plus its provenance.
#[derive(Debug, Clone)]
pub struct LoadedTable {
    pub table: PriceTable,
    /// BLAKE3 over the parsed table contents.
    pub dataset_hash: String,
    /// True when the data came from the synthetic generator.
    pub has_synthetic: bool,
}

impl LoadedTable {
    /// Wrap an in-memory table (synthetic data, tests).
    pub fn from_table(table: PriceTable, has_synthetic: bool) -> Self {
        let dataset_hash = dataset_hash(&table);
        Self {
            table,
            dataset_hash,
            has_synthetic,
        }
    }
}

/// Load a price table from a CSV file.
pub fn load_prices_csv(path: &Path) -> Result<LoadedTable, LoadError> {
    let file = std::fs::File::open(path).map_err(|source| LoadError::Io {
        path: path.to_path_buf(),
        source,
    })?;
    let mut reader = csv::Reader::from_reader(file);

    let headers = reader
        .headers()
        .map_err(|source| LoadError::Csv {
            path: path.to_path_buf(),
            source,
        })?
        .clone();
    let mut header_iter = headers.iter();
    match header_iter.next() {
        Some("date") => {}
        other => return Err(LoadError::MissingDateHeader(other.unwrap_or("").to_string())),
    }
    let columns: Vec<String> = header_iter.map(str::to_string).collect();
    if columns.is_empty() {
        return Err(LoadError::NoPriceColumns);
    }

    let mut dates = Vec::new();
    let mut values: Vec<Vec<f64>> = vec![Vec::new(); columns.len()];
    for (row_number, record) in reader.records().enumerate() {
        let record = record.map_err(|source| LoadError::Csv {
            path: path.to_path_buf(),
            source,
        })?;
        let row = row_number + 2; // 1-based, after the header
        let date_cell = record.get(0).unwrap_or("");
        let date = NaiveDate::parse_from_str(date_cell, "%Y-%m-%d").map_err(|_| {
            LoadError::BadDate {
                row,
                value: date_cell.to_string(),
            }
        })?;
        dates.push(date);
        for (i, column) in columns.iter().enumerate() {
            let cell = record.get(i + 1).unwrap_or("").trim();
            let value = if cell.is_empty() {
                f64::NAN
            } else {
                cell.parse::<f64>().map_err(|_| LoadError::BadNumber {
                    row,
                    column: column.clone(),
                    value: cell.to_string(),
                })?
            };
            values[i].push(value);
        }
    }

    let table = PriceTable::new(
        dates,
        columns.into_iter().zip(values).collect(),
    )?;
    Ok(LoadedTable::from_table(table, false))
}

/// BLAKE3 over the table's canonical serialization.
fn dataset_hash(table: &PriceTable) -> String {
    let json = serde_json::to_string(table).expect("PriceTable serialization failed");
    blake3::hash(json.as_bytes()).to_hex().to_string()
}
