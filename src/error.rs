//! Error types.
//!
//! Every error in this crate is fatal for a benchmark run: nothing is retried
//! and the first failure aborts the pipeline before any timing is written.

use std::path::PathBuf;

use thiserror::Error;

/// Invalid parameters for the synthetic series generator.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum GenerationError {
    /// Zero-length series.
    #[error("series length must be positive, got tmax={tmax}")]
    InvalidLength { tmax: usize },

    /// Harvesting schedule of the wrong length.
    #[error("harvesting schedule must hold 1 (constant) or 2 (ramp) values, got {len}")]
    MalformedSchedule { len: usize },

    /// NaN or infinite model parameter.
    #[error("parameter `{name}` must be finite, got {value}")]
    NonFinite { name: &'static str, value: f64 },

    /// Negative noise amplitude.
    #[error("noise amplitude must be non-negative, got sigma={sigma}")]
    NegativeNoise { sigma: f64 },
}

/// Failures of the one-time preprocessing steps (detrend, spectrum).
#[derive(Error, Debug, Clone, PartialEq)]
pub enum PreprocessingError {
    /// Transition index past the end of the series.
    #[error("transition index {transition} is outside a series of length {len}")]
    TransitionOutOfRange { transition: usize, len: usize },

    /// Fraction outside `(0, 1]`.
    #[error("{what} must be in (0, 1], got {value}")]
    InvalidFraction { what: &'static str, value: f64 },

    /// Offset outside `[0, 1)`.
    #[error("{what} must be in [0, 1), got {value}")]
    InvalidOffset { what: &'static str, value: f64 },

    /// Too few points for the step.
    #[error("{what} needs at least {needed} points, got {got}")]
    InsufficientData {
        what: &'static str,
        needed: usize,
        got: usize,
    },

    /// `detrend` was called a second time.
    #[error("series has already been detrended")]
    AlreadyDetrended,
}

/// Contract violations of the estimators.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum StatsError {
    /// Window fraction outside `(0, 1]`.
    #[error("rolling_window must be in (0, 1], got {0}")]
    InvalidRollingWindow(f64),

    /// Window too small.
    #[error("{estimator} needs a window of at least {needed} points, got {got}")]
    WindowTooSmall {
        estimator: &'static str,
        needed: usize,
        got: usize,
    },

    /// `compute_smax` before `compute_spectrum`.
    #[error("power spectrum has not been computed")]
    SpectrumMissing,

    /// Empty input.
    #[error("cannot resample an empty series")]
    EmptyInput,

    /// Invalid block size.
    #[error("block size must be positive")]
    InvalidBlockSize,

    /// `tmin..=tmax` selects nothing.
    #[error("time range [{tmin}, {tmax}] selects no data")]
    EmptyRange { tmin: usize, tmax: usize },
}

/// Failure raised by a timed operation.
pub type OperationError = Box<dyn std::error::Error + Send + Sync + 'static>;

/// The harness aborted because an operation failed.
#[derive(Error, Debug)]
pub enum HarnessError {
    /// An operation returned an error.
    #[error("operation #{index} `{name}` failed {}", describe_trial(.trial))]
    OperationFailed {
        index: usize,
        name: String,
        /// `None` when the failure happened during warmup.
        trial: Option<usize>,
        #[source]
        source: OperationError,
    },

    /// Zero repeats.
    #[error("repeat count must be positive")]
    ZeroRepeats,

    /// A replacement names a slot the operation list does not have.
    #[error("no operation at index {index}, the list has {count}")]
    NoSuchOperation { index: usize, count: usize },
}

fn describe_trial(trial: &Option<usize>) -> String {
    match trial {
        Some(t) => format!("at trial {t}"),
        None => "during warmup".to_string(),
    }
}

/// Failures writing result files.
#[derive(Error, Debug)]
pub enum OutputError {
    /// Filesystem failure.
    #[error("failed to write {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// CSV encoding failure.
    #[error("failed to encode {path}: {source}")]
    Csv {
        path: PathBuf,
        #[source]
        source: csv::Error,
    },

    /// JSON serialization failure.
    #[error("failed to serialize report: {0}")]
    Json(#[from] serde_json::Error),
}

/// Failures loading or validating configuration.
#[derive(Error, Debug)]
pub enum ConfigError {
    /// Config file could not be read.
    #[error("failed to read config {path}: {source}")]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// Malformed TOML.
    #[error("failed to parse config: {0}")]
    Parse(#[from] toml::de::Error),

    /// Value rejected by validation.
    #[error("invalid config: {0}")]
    Invalid(String),
}

/// Umbrella error for a full benchmark run.
#[derive(Error, Debug)]
pub enum EwsError {
    /// Series generation.
    #[error(transparent)]
    Generation(#[from] GenerationError),

    /// Detrend or spectrum.
    #[error(transparent)]
    Preprocessing(#[from] PreprocessingError),

    /// Estimator failure outside the timed region.
    #[error(transparent)]
    Stats(#[from] StatsError),

    /// Timing loop.
    #[error(transparent)]
    Harness(#[from] HarnessError),

    /// Result files.
    #[error(transparent)]
    Output(#[from] OutputError),

    /// Configuration.
    #[error(transparent)]
    Config(#[from] ConfigError),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_operation_failure_message_names_index_and_trial() {
        let err = HarnessError::OperationFailed {
            index: 3,
            name: "kurtosis".into(),
            trial: Some(17),
            source: "boom".into(),
        };
        let msg = err.to_string();
        assert!(msg.contains("#3"), "{msg}");
        assert!(msg.contains("kurtosis"), "{msg}");
        assert!(msg.contains("trial 17"), "{msg}");
    }

    #[test]
    fn test_warmup_failure_message() {
        let err = HarnessError::OperationFailed {
            index: 0,
            name: "variance".into(),
            trial: None,
            source: "boom".into(),
        };
        assert!(err.to_string().contains("during warmup"));
    }
}
