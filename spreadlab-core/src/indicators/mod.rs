//! Indicator engine: premium and rolling z-score per configured pair.
//!
//! All series are precomputed once before the date loop and are pure
//! functions of the price table and configuration. Warm-up rows are NaN
//! by construction, so nothing downstream can trade on a partially
//! filled window.

pub mod premium;
pub mod rolling;

pub use premium::{compute_indicators, IndicatorSet, PairSeries, PairSnapshot};
pub use rolling::{rolling_mean, rolling_std};

/// Assert two f64 values are approximately equal (within epsilon).
#[cfg(test)]
pub fn assert_approx(actual: f64, expected: f64, epsilon: f64) {
    assert!(
        (actual - expected).abs() < epsilon,
        "assert_approx failed: actual={actual}, expected={expected}, diff={}, epsilon={epsilon}",
        (actual - expected).abs()
    );
}

/// Default epsilon for indicator tests.
#[cfg(test)]
pub const DEFAULT_EPSILON: f64 = 1e-10;
