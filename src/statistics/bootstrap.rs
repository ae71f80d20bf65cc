//! Block bootstrap resampling for time series data.
//!
//! Block resampling keeps runs of consecutive observations together, which
//! preserves the short-range autocorrelation of the residual series in each
//! surrogate. Three schemes are provided:
//!
//! - **Stationary** (Politis & Romano, 1994): block lengths are geometric
//!   with mean `block_size`, blocks wrap around the end of the series.
//! - **Circular**: fixed-length blocks that wrap around the end.
//! - **Moving**: fixed-length blocks fully inside the series.

use rand::Rng;
use serde::{Deserialize, Serialize};

use crate::error::StatsError;

/// Block bootstrap scheme.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum BootstrapKind {
    /// Geometric block lengths, circular wrap.
    #[default]
    Stationary,
    /// Fixed block length, circular wrap.
    Circular,
    /// Fixed block length, no wrap.
    Moving,
}

/// Counter-based RNG seed generation using SplitMix64.
///
/// Gives each surrogate batch an independent, reproducible seed derived
/// from one base seed.
#[inline]
pub fn counter_rng_seed(base_seed: u64, counter: u64) -> u64 {
    // SplitMix64: high-quality 64-bit hash function
    // See: https://xoshiro.di.unimi.it/splitmix64.c
    let mut z = base_seed.wrapping_add(counter.wrapping_mul(0x9e3779b97f4a7c15));
    z = (z ^ (z >> 30)).wrapping_mul(0xbf58476d1ce4e5b9);
    z = (z ^ (z >> 27)).wrapping_mul(0x94d049bb133111eb);
    z ^ (z >> 31)
}

/// Stationary bootstrap into an existing buffer.
///
/// Each position starts a new block with probability `1 / block_size`;
/// otherwise it continues the current block, wrapping at the end.
///
/// # Panics
///
/// Panics if `out.len() != data.len()`.
pub fn stationary_bootstrap_into<R: Rng + ?Sized>(
    data: &[f64],
    block_size: usize,
    rng: &mut R,
    out: &mut [f64],
) {
    assert_eq!(
        out.len(),
        data.len(),
        "Output buffer must have same length as input data"
    );

    if data.is_empty() {
        return;
    }

    let n = data.len();
    let p_new = 1.0 / block_size.max(1) as f64;

    let mut idx = rng.random_range(0..n);
    out[0] = data[idx];
    for slot in out.iter_mut().skip(1) {
        if rng.random::<f64>() < p_new {
            idx = rng.random_range(0..n);
        } else {
            idx = (idx + 1) % n;
        }
        *slot = data[idx];
    }
}

/// Circular block bootstrap into an existing buffer.
///
/// # Panics
///
/// Panics if `out.len() != data.len()`.
pub fn circular_bootstrap_into<R: Rng + ?Sized>(
    data: &[f64],
    block_size: usize,
    rng: &mut R,
    out: &mut [f64],
) {
    assert_eq!(
        out.len(),
        data.len(),
        "Output buffer must have same length as input data"
    );

    if data.is_empty() {
        return;
    }

    let n = data.len();
    let block_size = block_size.max(1).min(n);

    let mut pos = 0;
    while pos < n {
        let start = rng.random_range(0..n);
        let copy_len = block_size.min(n - pos);
        for (offset, slot) in out[pos..pos + copy_len].iter_mut().enumerate() {
            *slot = data[(start + offset) % n];
        }
        pos += copy_len;
    }
}

/// Moving block bootstrap into an existing buffer.
///
/// # Panics
///
/// Panics if `out.len() != data.len()`.
pub fn moving_bootstrap_into<R: Rng + ?Sized>(
    data: &[f64],
    block_size: usize,
    rng: &mut R,
    out: &mut [f64],
) {
    assert_eq!(
        out.len(),
        data.len(),
        "Output buffer must have same length as input data"
    );

    if data.is_empty() {
        return;
    }

    let n = data.len();
    let block_size = block_size.max(1).min(n);

    // Number of possible starting positions for blocks
    let num_block_starts = n - block_size + 1;

    let mut pos = 0;

    // Sample blocks until we fill the output buffer
    while pos < n {
        let start = rng.random_range(0..num_block_starts);
        let copy_len = block_size.min(n - pos);

        // Fast memcpy of the block
        out[pos..pos + copy_len].copy_from_slice(&data[start..start + copy_len]);

        pos += copy_len;
    }
}

/// Draw `n_samples` block-bootstrap surrogates of `data`.
///
/// `NaN` entries are dropped before resampling, so every surrogate has the
/// length of the defined part of `data`.
///
/// # Errors
///
/// Fails if `data` has no defined values or `block_size == 0`.
pub fn block_bootstrap<R: Rng + ?Sized>(
    data: &[f64],
    n_samples: usize,
    kind: BootstrapKind,
    block_size: usize,
    rng: &mut R,
) -> Result<Vec<Vec<f64>>, StatsError> {
    if block_size == 0 {
        return Err(StatsError::InvalidBlockSize);
    }
    let defined: Vec<f64> = data.iter().copied().filter(|v| !v.is_nan()).collect();
    if defined.is_empty() {
        return Err(StatsError::EmptyInput);
    }

    let mut surrogates = Vec::with_capacity(n_samples);
    for _ in 0..n_samples {
        let mut out = vec![0.0; defined.len()];
        match kind {
            BootstrapKind::Stationary => stationary_bootstrap_into(&defined, block_size, rng, &mut out),
            BootstrapKind::Circular => circular_bootstrap_into(&defined, block_size, rng, &mut out),
            BootstrapKind::Moving => moving_bootstrap_into(&defined, block_size, rng, &mut out),
        }
        surrogates.push(out);
    }
    Ok(surrogates)
}
