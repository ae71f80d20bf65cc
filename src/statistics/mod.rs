//! Statistical estimators behind the benchmarked operations.
//!
//! This module provides the numerical building blocks the harness times:
//! - Rolling moments (variance, coefficient of variation, skewness, kurtosis)
//! - Lag autocorrelation, rolling and whole-series
//! - LOWESS and Gaussian smoothing for detrending
//! - Welch power spectrum with a Hamming window
//! - Kendall tau-b trend statistic
//! - Stationary, circular and moving block bootstrap

mod autocorrelation;
mod bootstrap;
mod kendall;
mod lowess;
mod rolling;
mod spectrum;

pub use autocorrelation::{acf, lag_autocorrelation, rolling_autocorrelation};
pub use bootstrap::{
    block_bootstrap, circular_bootstrap_into, counter_rng_seed, moving_bootstrap_into,
    stationary_bootstrap_into, BootstrapKind,
};
pub use kendall::{kendall_tau, kendall_tau_time};
pub use lowess::{gaussian_filter, lowess};
pub use rolling::{
    kurtosis, mean, rolling_apply, rolling_cv, rolling_kurtosis, rolling_mean, rolling_skewness,
    rolling_std, rolling_variance, skewness, variance, window_size,
};
pub use spectrum::{hamming, welch, SpectrumPoint};
