//! # ews-bench
//!
//! Micro-benchmark harness for early-warning-signal (EWS) estimators.
//!
//! A stochastic Ricker population model is driven through a fold bifurcation
//! by a harvesting ramp. The resulting series is detrended and its rolling
//! power spectrum computed once; then eight estimators are timed against the
//! shared, read-only [`AnalysisContext`]:
//! - rolling variance
//! - coefficient of variation
//! - skewness
//! - kurtosis
//! - lag-1 autocorrelation
//! - spectral maximum
//! - Kendall tau trend statistic
//! - stationary block bootstrap
//!
//! The run writes the residual series and one timing per operation, in that
//! fixed order, as headerless one-column files.
//!
//! ## Timing modes
//!
//! [`TimingMode::Aggregate`] reports the total time of `repeats` calls;
//! [`TimingMode::Minimum`] reports the fastest single call. A run uses one
//! mode, recorded in the result and in the default timing file name.
//!
//! ## Quick Start
//!
//! ```ignore
//! use ews_bench::{EwsBench, TimingMode};
//!
//! let report = EwsBench::new()
//!     .mode(TimingMode::Minimum)
//!     .output_dir("results")
//!     .run()?;
//!
//! for timing in &report.result.timings {
//!     println!("{}: {:.3e} s", timing.name, timing.seconds);
//! }
//! ```

#![warn(missing_docs)]
#![warn(clippy::all)]

// Core modules
mod config;
mod constants;
mod context;
mod error;
mod pipeline;
mod result;
mod types;

// Functional modules
pub mod hooks;
pub mod measurement;
pub mod output;
pub mod simulate;
pub mod statistics;

// Re-exports for public API
pub use config::{Config, DetrendConfig, HarnessConfig, OutputConfig, SuiteConfig};
pub use constants::{DEFAULT_REPEATS, DEFAULT_TRANSITION, OPERATION_NAMES};
pub use context::{
    AnalysisContext, Decomposition, DetrendMethod, PowerSpectrum, SpectrumFrame, SpectrumParams,
    TrendStatistic,
};
pub use error::{
    ConfigError, EwsError, GenerationError, HarnessError, OperationError, OutputError,
    PreprocessingError, StatsError,
};
pub use hooks::{LogSummary, ReportHook, SmoothingCsv};
pub use measurement::{Collector, Operation, Timer};
pub use pipeline::{indicator_table, standard_operations, EwsBench, RunReport};
pub use result::{BenchmarkResult, OperationTiming, TimingMode};
pub use simulate::{simulate_ricker, RickerParams, Simulation};
pub use statistics::BootstrapKind;
pub use types::{Indicator, IndicatorTable, TimeSeries};
