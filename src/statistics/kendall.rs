//! Kendall rank correlation (tau-b).

use std::cmp::Ordering;

use kendalls::tau_b_with_comparator;

/// Kendall's tau-b between `x` and `y`.
///
/// Pairs where either value is `NaN` are dropped first. Ties are handled with
/// the tau-b correction. Returns `NaN` when fewer than two pairs remain or one
/// side is constant.
pub fn kendall_tau(x: &[f64], y: &[f64]) -> f64 {
    let (xs, ys): (Vec<f64>, Vec<f64>) = x
        .iter()
        .zip(y)
        .filter(|(a, b)| !a.is_nan() && !b.is_nan())
        .map(|(&a, &b)| (a, b))
        .unzip();
    if xs.len() < 2 {
        return f64::NAN;
    }

    match tau_b_with_comparator(&xs, &ys, |a: &f64, b: &f64| {
        a.partial_cmp(b).unwrap_or(Ordering::Equal)
    }) {
        Ok((tau, _)) if tau.is_finite() => tau,
        _ => f64::NAN,
    }
}

/// Kendall's tau of `values` against their time index.
pub fn kendall_tau_time(values: &[f64], start: usize) -> f64 {
    let time: Vec<f64> = (start..start + values.len()).map(|t| t as f64).collect();
    kendall_tau(&time, values)
}
