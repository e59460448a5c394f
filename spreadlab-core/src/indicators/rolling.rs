//! Trailing rolling statistics over f64 series with NaN gaps.
//!
//! Windows are trailing and inclusive of the current index. Any NaN inside
//! the window poisons the output for that index. Standard deviation is the
//! sample deviation (n − 1 denominator).

/// Rolling mean over a trailing window of `window` values.
///
/// Output is NaN for indices with fewer than `window` values available.
pub fn rolling_mean(values: &[f64], window: usize) -> Vec<f64> {
    assert!(window >= 1, "rolling window must be >= 1");
    let n = values.len();
    let mut result = vec![f64::NAN; n];
    if n < window {
        return result;
    }
    for i in (window - 1)..n {
        let slice = &values[i + 1 - window..=i];
        if slice.iter().any(|v| v.is_nan()) {
            continue;
        }
        result[i] = slice.iter().sum::<f64>() / window as f64;
    }
    result
}

/// Rolling sample standard deviation over a trailing window.
///
/// A window of 1 has no deviation and yields NaN. A perfectly flat window
/// yields 0.0 — deciding what a zero deviation means is the caller's job.
pub fn rolling_std(values: &[f64], window: usize) -> Vec<f64> {
    assert!(window >= 1, "rolling window must be >= 1");
    let n = values.len();
    let mut result = vec![f64::NAN; n];
    if n < window || window < 2 {
        return result;
    }
    for i in (window - 1)..n {
        let slice = &values[i + 1 - window..=i];
        if slice.iter().any(|v| v.is_nan()) {
            continue;
        }
        let mean = slice.iter().sum::<f64>() / window as f64;
        let variance = slice
            .iter()
            .map(|v| {
                let diff = v - mean;
                diff * diff
            })
            .sum::<f64>()
            / (window - 1) as f64;
        result[i] = variance.sqrt();
    }
    result
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::indicators::{assert_approx, DEFAULT_EPSILON};

    #[test]
    fn mean_has_nan_prefix() {
        let result = rolling_mean(&[1.0, 2.0, 3.0, 4.0], 3);
        assert!(result[0].is_nan());
        assert!(result[1].is_nan());
        assert_approx(result[2], 2.0, DEFAULT_EPSILON);
        assert_approx(result[3], 3.0, DEFAULT_EPSILON);
    }

    #[test]
    fn std_is_sample_deviation() {
        // Sample std of [1, 2, 3] = 1
        let result = rolling_std(&[1.0, 2.0, 3.0], 3);
        assert_approx(result[2], 1.0, DEFAULT_EPSILON);
    }

    #[test]
    fn flat_window_has_zero_std() {
        let result = rolling_std(&[5.0, 5.0, 5.0, 5.0], 3);
        assert_eq!(result[2], 0.0);
        assert_eq!(result[3], 0.0);
    }

    #[test]
    fn nan_poisons_its_windows() {
        let values = [1.0, f64::NAN, 3.0, 4.0, 5.0];
        let mean = rolling_mean(&values, 2);
        assert!(mean[1].is_nan());
        assert!(mean[2].is_nan()); // window [NaN, 3.0]
        assert_approx(mean[3], 3.5, DEFAULT_EPSILON);
    }

    #[test]
    fn series_shorter_than_window_is_all_nan() {
        assert!(rolling_mean(&[1.0, 2.0], 5).iter().all(|v| v.is_nan()));
        assert!(rolling_std(&[1.0, 2.0], 5).iter().all(|v| v.is_nan()));
    }

    #[test]
    fn window_of_one_mean_is_identity_but_std_is_nan() {
        let values = [1.0, 2.0, 3.0];
        assert_eq!(rolling_mean(&values, 1), vec![1.0, 2.0, 3.0]);
        assert!(rolling_std(&values, 1).iter().all(|v| v.is_nan()));
    }
}
