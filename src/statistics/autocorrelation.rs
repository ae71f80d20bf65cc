//! Autocorrelation estimators.
//!
//! Two conventions live here:
//! - [`lag_autocorrelation`] is the Pearson correlation between the series
//!   and its lagged copy. This is the EWS indicator, computed over rolling
//!   windows by [`rolling_autocorrelation`].
//! - [`acf`] normalizes the lagged covariance by the full-series variance.
//!   The harness uses it to flag drift in timing samples.

use super::rolling::rolling_apply;
use crate::error::StatsError;

/// Pearson correlation of `data[..n-lag]` with `data[lag..]`.
///
/// Returns `NaN` if fewer than two pairs are available or either side has
/// zero variance.
pub fn lag_autocorrelation(data: &[f64], lag: usize) -> f64 {
    let n = data.len();
    if n < lag + 2 {
        return f64::NAN;
    }
    let lead = &data[..n - lag];
    let lagged = &data[lag..];
    let m = lead.len() as f64;

    let mean_a = lead.iter().sum::<f64>() / m;
    let mean_b = lagged.iter().sum::<f64>() / m;

    let mut cov = 0.0;
    let mut var_a = 0.0;
    let mut var_b = 0.0;
    for (&a, &b) in lead.iter().zip(lagged) {
        let da = a - mean_a;
        let db = b - mean_b;
        cov += da * db;
        var_a += da * da;
        var_b += db * db;
    }

    if var_a == 0.0 || var_b == 0.0 {
        return f64::NAN;
    }
    cov / (var_a * var_b).sqrt()
}

/// Rolling lag-`lag` autocorrelation over right-aligned windows.
pub fn rolling_autocorrelation(data: &[f64], window: usize, lag: usize) -> Result<Vec<f64>, StatsError> {
    if lag == 0 || window < lag + 2 {
        return Err(StatsError::WindowTooSmall {
            estimator: "autocorrelation",
            needed: lag.max(1) + 2,
            got: window,
        });
    }
    Ok(rolling_apply(data, window, |w| lag_autocorrelation(w, lag)))
}

/// Autocorrelation at `lag`, normalized by the full-series variance.
///
/// ```text
/// r_k = sum((x_t - mean) * (x_{t+k} - mean)) / sum((x_t - mean)^2)
/// ```
///
/// Returns 0.0 if the data has at most `lag` elements or zero variance.
pub fn acf(data: &[f64], lag: usize) -> f64 {
    let n = data.len();

    // Need at least lag + 1 observations
    if n <= lag {
        return 0.0;
    }

    let mean: f64 = data.iter().sum::<f64>() / n as f64;
    let variance: f64 = data.iter().map(|&x| (x - mean).powi(2)).sum();

    if variance == 0.0 {
        return 0.0;
    }

    let mut lagged_cov = 0.0;
    for t in 0..(n - lag) {
        lagged_cov += (data[t] - mean) * (data[t + lag] - mean);
    }

    lagged_cov / variance
}
