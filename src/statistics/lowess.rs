//! Smoothers used for detrending: LOWESS and a Gaussian kernel filter.

use crate::types::{Matrix2, Vector2};

/// Robustifying iterations after the initial LOWESS fit.
const LOWESS_ITERATIONS: usize = 3;

/// Gaussian kernels are truncated at this many standard deviations.
const GAUSSIAN_TRUNCATE: f64 = 4.0;

#[inline]
fn tricube(u: f64) -> f64 {
    if u >= 1.0 {
        0.0
    } else {
        let t = 1.0 - u * u * u;
        t * t * t
    }
}

#[inline]
fn bisquare(u: f64) -> f64 {
    if u >= 1.0 {
        0.0
    } else {
        let t = 1.0 - u * u;
        t * t
    }
}

fn median(values: &mut [f64]) -> f64 {
    let n = values.len();
    let mid = n / 2;
    let (_, &mut upper, _) = values.select_nth_unstable_by(mid, |a, b| a.total_cmp(b));
    if n % 2 == 1 {
        upper
    } else {
        let lower = values[..mid]
            .iter()
            .copied()
            .max_by(|a, b| a.total_cmp(b))
            .unwrap_or(upper);
        (lower + upper) / 2.0
    }
}

/// Weighted local linear fit evaluated at `x0`.
///
/// Falls back to the weighted mean when the normal equations are singular
/// (e.g. all weight on one point).
fn local_fit(x: &[f64], y: &[f64], weights: &[f64], x0: f64) -> f64 {
    let mut xtwx = Matrix2::zeros();
    let mut xtwy = Vector2::zeros();
    for ((&xi, &yi), &wi) in x.iter().zip(y).zip(weights) {
        if wi <= 0.0 {
            continue;
        }
        let d = xi - x0;
        xtwx[(0, 0)] += wi;
        xtwx[(0, 1)] += wi * d;
        xtwx[(1, 1)] += wi * d * d;
        xtwy[0] += wi * yi;
        xtwy[1] += wi * yi * d;
    }
    xtwx[(1, 0)] = xtwx[(0, 1)];

    let total = xtwx[(0, 0)];
    if total <= 0.0 {
        return f64::NAN;
    }

    // Centered at x0, so the intercept is the fitted value.
    let det = xtwx.determinant();
    if det.abs() <= 1e-12 * total * total.max(xtwx[(1, 1)]) {
        return xtwy[0] / total;
    }
    match xtwx.try_inverse() {
        Some(inv) => (inv * xtwy)[0],
        None => xtwy[0] / total,
    }
}

/// LOWESS smoother of `y` against sorted `x`.
///
/// Each point is fitted by a tricube-weighted local linear regression over
/// its `floor(frac * n)` nearest neighbours, followed by
/// [`LOWESS_ITERATIONS`] bisquare robustness passes.
///
/// `x` must be sorted ascending and have the same length as `y`.
pub fn lowess(x: &[f64], y: &[f64], frac: f64) -> Vec<f64> {
    let n = x.len();
    debug_assert_eq!(n, y.len());
    if n == 0 {
        return Vec::new();
    }
    let k = ((frac * n as f64 + 1e-10) as usize).clamp(2.min(n), n);

    let mut fitted = vec![0.0; n];
    let mut robustness = vec![1.0; n];
    let mut weights = vec![0.0; n];

    for iteration in 0..=LOWESS_ITERATIONS {
        let mut left = 0usize;
        for i in 0..n {
            // Slide the k-neighbourhood right while it gets tighter around x[i].
            while left + k < n && x[i] - x[left] > x[left + k] - x[i] {
                left += 1;
            }
            let right = left + k - 1;
            let radius = (x[i] - x[left]).max(x[right] - x[i]);

            weights.iter_mut().for_each(|w| *w = 0.0);
            if radius > 0.0 {
                for j in left..=right {
                    weights[j] = tricube((x[j] - x[i]).abs() / radius) * robustness[j];
                }
            } else {
                for j in left..=right {
                    weights[j] = robustness[j];
                }
            }

            // If every neighbour is down-weighted, keep the previous pass's fit.
            let fit = local_fit(&x[left..=right], &y[left..=right], &weights[left..=right], x[i]);
            if !fit.is_nan() {
                fitted[i] = fit;
            } else if iteration == 0 {
                fitted[i] = y[i];
            }
        }

        if iteration == LOWESS_ITERATIONS {
            break;
        }

        let mut abs_residuals: Vec<f64> = y.iter().zip(&fitted).map(|(a, b)| (a - b).abs()).collect();
        let scale = 6.0 * median(&mut abs_residuals);
        if scale <= 0.0 {
            break;
        }
        for ((r, &yi), &fi) in robustness.iter_mut().zip(y).zip(&fitted) {
            *r = bisquare((yi - fi).abs() / scale);
        }
    }

    fitted
}

/// Map an out-of-range index into `[0, n)` with half-sample reflection.
///
/// `... d c b a | a b c d | d c b a ...`
#[inline]
fn reflect(index: isize, n: usize) -> usize {
    let period = 2 * n as isize;
    let m = index.rem_euclid(period) as usize;
    if m >= n {
        2 * n - 1 - m
    } else {
        m
    }
}

/// Gaussian kernel smoother with standard deviation `sigma` (in samples).
///
/// The kernel is truncated at four standard deviations and the boundary is
/// handled by reflection.
pub fn gaussian_filter(data: &[f64], sigma: f64) -> Vec<f64> {
    let n = data.len();
    if n == 0 || sigma <= 0.0 {
        return data.to_vec();
    }

    let radius = (GAUSSIAN_TRUNCATE * sigma + 0.5) as isize;
    let mut kernel: Vec<f64> = (-radius..=radius)
        .map(|i| (-0.5 * (i as f64 / sigma).powi(2)).exp())
        .collect();
    let total: f64 = kernel.iter().sum();
    kernel.iter_mut().for_each(|k| *k /= total);

    (0..n as isize)
        .map(|i| {
            kernel
                .iter()
                .zip(-radius..=radius)
                .map(|(k, offset)| k * data[reflect(i + offset, n)])
                .sum()
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn index(n: usize) -> Vec<f64> {
        (0..n).map(|i| i as f64).collect()
    }

    #[test]
    fn test_lowess_reproduces_line() {
        let x = index(50);
        let y: Vec<f64> = x.iter().map(|v| 2.0 * v + 1.0).collect();
        let fit = lowess(&x, &y, 0.3);
        for (f, t) in fit.iter().zip(&y) {
            assert!((f - t).abs() < 1e-8, "{f} vs {t}");
        }
    }

    #[test]
    fn test_lowess_resists_outlier() {
        let x = index(41);
        let mut y: Vec<f64> = x.iter().map(|&v| 1.0 + 0.3 * (v * 2.1).sin()).collect();
        y[20] = 100.0;
        let fit = lowess(&x, &y, 0.5);
        assert!((fit[20] - 1.0).abs() < 0.5, "fit at outlier = {}", fit[20]);
    }

    #[test]
    fn test_lowess_smooths_noise() {
        let x = index(200);
        let y: Vec<f64> = x
            .iter()
            .map(|&v| (v / 30.0).sin() + if (v as usize) % 2 == 0 { 0.1 } else { -0.1 })
            .collect();
        let fit = lowess(&x, &y, 0.2);
        let max_err = fit
            .iter()
            .zip(&x)
            .map(|(f, &v)| (f - (v / 30.0).sin()).abs())
            .fold(0.0, f64::max);
        assert!(max_err < 0.1, "max error = {max_err}");
    }

    #[test]
    fn test_lowess_tiny_inputs() {
        assert!(lowess(&[], &[], 0.5).is_empty());
        assert_eq!(lowess(&[0.0], &[3.0], 0.5), vec![3.0]);
    }

    #[test]
    fn test_reflect() {
        assert_eq!(reflect(-1, 4), 0);
        assert_eq!(reflect(-2, 4), 1);
        assert_eq!(reflect(4, 4), 3);
        assert_eq!(reflect(5, 4), 2);
        assert_eq!(reflect(2, 4), 2);
        assert_eq!(reflect(-9, 4), 0);
    }

    #[test]
    fn test_gaussian_preserves_constant() {
        let out = gaussian_filter(&[3.0; 20], 2.5);
        assert!(out.iter().all(|v| (v - 3.0).abs() < 1e-12));
    }

    #[test]
    fn test_gaussian_reduces_variance() {
        let data: Vec<f64> = (0..100).map(|i| if i % 2 == 0 { 1.0 } else { -1.0 }).collect();
        let out = gaussian_filter(&data, 3.0);
        // Away from the reflected boundaries the alternation cancels out.
        assert!(out[15..85].iter().all(|v| v.abs() < 0.05));
    }
}
