//! Welch power spectrum estimation.
//!
//! Segments of `nperseg` points overlapping by `noverlap` are mean-removed,
//! multiplied by a periodic Hamming window and transformed with a direct DFT.
//! Segment periodograms are averaged with `spectrum` scaling
//! (`|X(f)|^2 / (sum w)^2`). The result is two-sided and expressed in angular
//! frequency, with powers divided by `2 pi`.

use std::f64::consts::PI;

use serde::{Deserialize, Serialize};

/// One (angular frequency, power) point of a spectrum.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct SpectrumPoint {
    /// Angular frequency.
    pub frequency: f64,
    /// Power at that frequency.
    pub power: f64,
}

/// Periodic Hamming window of length `n`.
pub fn hamming(n: usize) -> Vec<f64> {
    if n == 1 {
        return vec![1.0];
    }
    (0..n)
        .map(|i| 0.54 - 0.46 * (2.0 * PI * i as f64 / n as f64).cos())
        .collect()
}

/// Two-sided FFT sample frequencies, in cycles per unit time.
fn fft_frequencies(n: usize, dt: f64) -> Vec<f64> {
    let scale = 1.0 / (n as f64 * dt);
    (0..n)
        .map(|k| {
            let signed = if k < n.div_ceil(2) { k as isize } else { k as isize - n as isize };
            signed as f64 * scale
        })
        .collect()
}

/// Points shared by consecutive segments of length `nperseg`.
///
/// Always leaves a step of at least one point.
fn segment_overlap(nperseg: usize, ham_offset: f64) -> usize {
    ((ham_offset * nperseg as f64) as usize).min(nperseg.saturating_sub(1))
}

/// Welch periodogram of `data`.
///
/// `ham_length` is clamped to the data length; `ham_offset` is the overlap
/// between segments as a fraction of the clamped segment length. Frequencies with
/// `|w| > w_cutoff * max|w|` are dropped. Points are sorted by frequency.
///
/// Returns an empty spectrum for empty input.
pub fn welch(data: &[f64], dt: f64, ham_length: usize, ham_offset: f64, w_cutoff: f64) -> Vec<SpectrumPoint> {
    let n = data.len();
    let nperseg = ham_length.min(n);
    if nperseg == 0 {
        return Vec::new();
    }
    let noverlap = segment_overlap(nperseg, ham_offset);
    let step = nperseg - noverlap;

    let window = hamming(nperseg);
    let scale = 1.0 / window.iter().sum::<f64>().powi(2);

    // Twiddle factors for the direct DFT.
    let twiddles: Vec<(f64, f64)> = (0..nperseg)
        .map(|j| {
            let theta = -2.0 * PI * j as f64 / nperseg as f64;
            (theta.cos(), theta.sin())
        })
        .collect();

    let mut power = vec![0.0; nperseg];
    let mut segment = vec![0.0; nperseg];
    let mut segments = 0usize;

    let mut start = 0;
    while start + nperseg <= n {
        let chunk = &data[start..start + nperseg];
        let mean = chunk.iter().sum::<f64>() / nperseg as f64;
        for ((s, &x), &w) in segment.iter_mut().zip(chunk).zip(&window) {
            *s = (x - mean) * w;
        }

        for (k, p) in power.iter_mut().enumerate() {
            let (mut re, mut im) = (0.0, 0.0);
            for (j, &s) in segment.iter().enumerate() {
                let (c, sn) = twiddles[(k * j) % nperseg];
                re += s * c;
                im += s * sn;
            }
            *p += (re * re + im * im) * scale;
        }

        segments += 1;
        start += step;
    }

    let mut points: Vec<SpectrumPoint> = fft_frequencies(nperseg, dt)
        .into_iter()
        .zip(&power)
        .map(|(f, &p)| SpectrumPoint {
            frequency: 2.0 * PI * f,
            power: p / segments as f64 / (2.0 * PI),
        })
        .collect();
    points.sort_by(|a, b| a.frequency.total_cmp(&b.frequency));

    let max_w = points.iter().map(|p| p.frequency.abs()).fold(0.0, f64::max);
    let cutoff = w_cutoff * max_w;
    points.retain(|p| p.frequency.abs() <= cutoff);
    points
}
