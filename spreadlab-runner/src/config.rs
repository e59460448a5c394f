//! Serializable backtest configuration.
//!
//! A TOML file fully describes a run: where the prices live, which pair
//! universe to trade, and every strategy parameter. The configuration
//! hashes to a deterministic run id, so identical configs are identical
//! runs — the cache key and the reproducibility receipt in one.

use serde::{Deserialize, Serialize};
use spreadlab_core::domain::{enumerate_pairs, PairConfig};
use spreadlab_core::engine::StrategyParams;
use std::path::{Path, PathBuf};
use thiserror::Error;

/// Errors from reading a configuration file.
#[derive(Debug, Error)]
pub enum ConfigFileError {
    #[error("cannot read config file '{path}': {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("cannot parse config file '{path}': {source}")]
    Parse {
        path: PathBuf,
        #[source]
        source: toml::de::Error,
    },
}

/// Complete description of one backtest run.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BacktestConfig {
    pub data: DataSection,
    pub pairs: PairSection,
    #[serde(default)]
    pub strategy: StrategyParams,
}

/// Where the price table comes from and which column benchmarks it.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DataSection {
    /// CSV price table path: a `date` column plus one column per exchange.
    pub prices: PathBuf,
    /// Reference column for the buy-and-hold benchmark.
    pub benchmark_column: String,
}

/// The tradeable pair universe: either an ordered exchange list (all
/// combinations, list order = priority) or an explicit pair list.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct PairSection {
    #[serde(default)]
    pub exchanges: Vec<String>,
    /// Explicit pairs; when present this wins over `exchanges`.
    #[serde(default)]
    pub explicit: Vec<ExplicitPair>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ExplicitPair {
    pub high: String,
    pub low: String,
}

impl BacktestConfig {
    pub fn load(path: &Path) -> Result<Self, ConfigFileError> {
        let text = std::fs::read_to_string(path).map_err(|source| ConfigFileError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        toml::from_str(&text).map_err(|source| ConfigFileError::Parse {
            path: path.to_path_buf(),
            source,
        })
    }

    /// Resolve the pair universe once, in canonical order.
    pub fn resolve_pairs(&self) -> Vec<PairConfig> {
        if !self.pairs.explicit.is_empty() {
            self.pairs
                .explicit
                .iter()
                .map(|p| PairConfig::new(p.high.as_str(), p.low.as_str()))
                .collect()
        } else {
            enumerate_pairs(&self.pairs.exchanges)
        }
    }

    /// Deterministic content hash of this configuration.
    ///
    /// Two runs with identical configs share a run id and can share
    /// cached results.
    pub fn run_id(&self) -> String {
        let json = serde_json::to_string(self).expect("BacktestConfig serialization failed");
        blake3::hash(json.as_bytes()).to_hex().to_string()
    }
}
