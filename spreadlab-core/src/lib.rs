//! Spreadlab Core — cross-exchange premium mean-reversion engine.
//!
//! This crate contains the heart of the backtesting engine:
//! - Domain types (price table, pairs, positions, trades, capital ledger)
//! - Indicator engine (premium, rolling stats, z-score with warm-up guard)
//! - Signal selection (one best divergence per date, deterministic tie-break)
//! - Position state machine (entry, reversion / stop-loss / time exits)
//!
//! Everything here is pure, synchronous, and single-threaded: callers run
//! independent simulations in parallel by owning independent inputs.

pub mod domain;
pub mod engine;
pub mod error;
pub mod indicators;
pub mod signal;

pub use error::ConfigError;
