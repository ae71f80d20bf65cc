//! Rolling-window moment estimators.
//!
//! Windows are right-aligned: entry `t` summarizes `data[t + 1 - w ..= t]`,
//! and the first `w - 1` entries are `NaN`. A window containing `NaN`
//! yields `NaN`. Moments are recomputed per window with a two-pass
//! algorithm rather than updated incrementally, so long windows do not
//! accumulate cancellation error.

use crate::error::StatsError;

/// Convert a rolling-window fraction into a point count.
///
/// Truncates like `int(fraction * n)`.
pub fn window_size(rolling_window: f64, n: usize) -> Result<usize, StatsError> {
    if !(rolling_window > 0.0 && rolling_window <= 1.0) {
        return Err(StatsError::InvalidRollingWindow(rolling_window));
    }
    Ok((rolling_window * n as f64) as usize)
}

fn check_window(estimator: &'static str, window: usize, needed: usize) -> Result<(), StatsError> {
    if window < needed {
        return Err(StatsError::WindowTooSmall {
            estimator,
            needed,
            got: window,
        });
    }
    Ok(())
}

/// Apply `f` to every full right-aligned window.
pub fn rolling_apply<F>(data: &[f64], window: usize, mut f: F) -> Vec<f64>
where
    F: FnMut(&[f64]) -> f64,
{
    let mut out = vec![f64::NAN; data.len()];
    if window == 0 || window > data.len() {
        return out;
    }
    for (end, slot) in out.iter_mut().enumerate().skip(window - 1) {
        *slot = f(&data[end + 1 - window..=end]);
    }
    out
}

/// Arithmetic mean.
#[inline]
pub fn mean(data: &[f64]) -> f64 {
    data.iter().sum::<f64>() / data.len() as f64
}

/// Biased central moments `(m2, m3, m4)` around the mean.
fn central_moments(data: &[f64]) -> (f64, f64, f64) {
    let n = data.len() as f64;
    let mu = mean(data);
    let (mut m2, mut m3, mut m4) = (0.0, 0.0, 0.0);
    for &x in data {
        let d = x - mu;
        let d2 = d * d;
        m2 += d2;
        m3 += d2 * d;
        m4 += d2 * d2;
    }
    (m2 / n, m3 / n, m4 / n)
}

/// Sample variance (ddof = 1).
pub fn variance(data: &[f64]) -> f64 {
    let n = data.len();
    if n < 2 {
        return f64::NAN;
    }
    let mu = mean(data);
    data.iter().map(|&x| (x - mu).powi(2)).sum::<f64>() / (n - 1) as f64
}

/// Adjusted Fisher-Pearson skewness `G1`.
pub fn skewness(data: &[f64]) -> f64 {
    let n = data.len() as f64;
    if data.len() < 3 {
        return f64::NAN;
    }
    let (m2, m3, _) = central_moments(data);
    if m2 <= 0.0 {
        return f64::NAN;
    }
    let g1 = m3 / m2.powf(1.5);
    (n * (n - 1.0)).sqrt() / (n - 2.0) * g1
}

/// Bias-corrected excess kurtosis `G2`.
pub fn kurtosis(data: &[f64]) -> f64 {
    let n = data.len() as f64;
    if data.len() < 4 {
        return f64::NAN;
    }
    let (m2, _, m4) = central_moments(data);
    if m2 <= 0.0 {
        return f64::NAN;
    }
    let g2 = m4 / (m2 * m2) - 3.0;
    (n - 1.0) / ((n - 2.0) * (n - 3.0)) * ((n + 1.0) * g2 + 6.0)
}

/// Rolling mean.
pub fn rolling_mean(data: &[f64], window: usize) -> Result<Vec<f64>, StatsError> {
    check_window("rolling mean", window, 1)?;
    Ok(rolling_apply(data, window, mean))
}

/// Rolling sample variance.
pub fn rolling_variance(data: &[f64], window: usize) -> Result<Vec<f64>, StatsError> {
    check_window("variance", window, 2)?;
    Ok(rolling_apply(data, window, variance))
}

/// Rolling sample standard deviation.
pub fn rolling_std(data: &[f64], window: usize) -> Result<Vec<f64>, StatsError> {
    check_window("standard deviation", window, 2)?;
    Ok(rolling_apply(data, window, |w| variance(w).sqrt()))
}

/// Rolling skewness.
pub fn rolling_skewness(data: &[f64], window: usize) -> Result<Vec<f64>, StatsError> {
    check_window("skewness", window, 3)?;
    Ok(rolling_apply(data, window, skewness))
}

/// Rolling excess kurtosis.
pub fn rolling_kurtosis(data: &[f64], window: usize) -> Result<Vec<f64>, StatsError> {
    check_window("kurtosis", window, 4)?;
    Ok(rolling_apply(data, window, kurtosis))
}

/// Rolling coefficient of variation: std of `spread` over mean of `level`.
///
/// `spread` and `level` must have the same length.
pub fn rolling_cv(spread: &[f64], level: &[f64], window: usize) -> Result<Vec<f64>, StatsError> {
    let std = rolling_std(spread, window)?;
    let mu = rolling_mean(level, window)?;
    Ok(std.iter().zip(&mu).map(|(s, m)| s / m).collect())
}
