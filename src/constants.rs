//! Default parameters of the reference benchmark run.

/// Default Ricker series length.
pub const RICKER_TMAX: usize = 1000;
/// Default burn-in length.
pub const RICKER_TBURN: usize = 100;
/// Default intrinsic growth rate.
pub const RICKER_R: f64 = 0.75;
/// Default carrying capacity.
pub const RICKER_K: f64 = 10.0;
/// Default half-saturation constant.
pub const RICKER_H: f64 = 0.75;
/// Default noise amplitude.
pub const RICKER_SIGMA: f64 = 0.04;
/// Default initial condition.
pub const RICKER_X0: f64 = 0.8;

/// Transition index used by the reference run (slightly before the fold).
pub const DEFAULT_TRANSITION: usize = 860;

/// Trials per operation.
pub const DEFAULT_REPEATS: usize = 100;

/// Rolling window passed explicitly to variance, skewness and autocorrelation.
pub const DEFAULT_ROLLING_WINDOW: f64 = 0.5;
/// Rolling window used by estimators called without one (cv, kurtosis).
pub const DEFAULT_INDICATOR_WINDOW: f64 = 0.25;

/// LOWESS span as a fraction of the pre-transition length.
pub const DEFAULT_DETREND_SPAN: f64 = 0.2;

/// Hamming window length of the periodogram.
pub const DEFAULT_HAM_LENGTH: usize = 40;
/// Fractional overlap of consecutive Hamming windows.
pub const DEFAULT_HAM_OFFSET: f64 = 0.5;
/// Step, in time points, between rolling spectrum frames.
pub const DEFAULT_PSPEC_ROLL_OFFSET: usize = 20;
/// Fraction of the frequency range kept in each frame.
pub const DEFAULT_W_CUTOFF: f64 = 1.0;

/// Mean block length of the bootstrap.
pub const DEFAULT_BLOCK_SIZE: usize = 10;

/// Names of the benchmarked operations, in output order.
pub const OPERATION_NAMES: [&str; 8] = [
    "rolling_variance",
    "coefficient_of_variation",
    "skewness",
    "kurtosis",
    "lag1_autocorrelation",
    "spectral_max",
    "kendall_tau",
    "block_bootstrap",
];
