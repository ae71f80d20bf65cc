//! Configuration for a benchmark run.
//!
//! Every field has a default reproducing the reference run, so an empty TOML
//! file (or no file at all) is a valid configuration.
//!
//! ```toml
//! seed = 0
//! transition = 860
//!
//! [ricker]
//! tmax = 1000
//! f = [0.0, 2.7]
//!
//! [harness]
//! repeats = 100
//! mode = "minimum"
//! ```

use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use crate::constants::{
    DEFAULT_BLOCK_SIZE, DEFAULT_DETREND_SPAN, DEFAULT_INDICATOR_WINDOW, DEFAULT_REPEATS,
    DEFAULT_ROLLING_WINDOW, DEFAULT_TRANSITION,
};
use crate::context::{DetrendMethod, SpectrumParams};
use crate::error::ConfigError;
use crate::result::TimingMode;
use crate::simulate::RickerParams;
use crate::statistics::BootstrapKind;

/// Detrending step.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct DetrendConfig {
    /// Smoother (default: lowess).
    pub method: DetrendMethod,
    /// Smoothing span as a fraction of the pre-transition length (default: 0.2).
    pub span: f64,
}

impl Default for DetrendConfig {
    fn default() -> Self {
        Self {
            method: DetrendMethod::Lowess,
            span: DEFAULT_DETREND_SPAN,
        }
    }
}

/// Parameters of the timed operations.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SuiteConfig {
    /// Window passed to variance, skewness and autocorrelation (default: 0.5).
    pub rolling_window: f64,
    /// Window for cv and kurtosis, which the reference run calls without one (default: 0.25).
    pub default_window: f64,
    /// Autocorrelation lag (default: 1).
    pub lag: usize,
    /// Mean block length of the bootstrap (default: 10).
    pub bootstrap_block_size: usize,
    /// Bootstrap scheme (default: stationary).
    pub bootstrap_kind: BootstrapKind,
}

impl Default for SuiteConfig {
    fn default() -> Self {
        Self {
            rolling_window: DEFAULT_ROLLING_WINDOW,
            default_window: DEFAULT_INDICATOR_WINDOW,
            lag: 1,
            bootstrap_block_size: DEFAULT_BLOCK_SIZE,
            bootstrap_kind: BootstrapKind::Stationary,
        }
    }
}

/// Timing loop.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct HarnessConfig {
    /// Calls per operation (default: 100).
    pub repeats: usize,
    /// Untimed calls per operation before measuring (default: 0).
    pub warmup: usize,
    /// Aggregate or minimum (default: aggregate).
    pub mode: TimingMode,
}

impl Default for HarnessConfig {
    fn default() -> Self {
        Self {
            repeats: DEFAULT_REPEATS,
            warmup: 0,
            mode: TimingMode::Aggregate,
        }
    }
}

/// Result files.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct OutputConfig {
    /// Directory all files are written to (default: current directory).
    pub dir: PathBuf,
    /// Residual file name (default: `ricker.csv`).
    pub residuals: String,
    /// Timing file name; `None` picks one from the timing mode.
    pub timings: Option<String>,
    /// Optional JSON report file name.
    pub json: Option<String>,
    /// Optional `state,smoothing` table written after preprocessing.
    pub smoothing: Option<String>,
}

impl Default for OutputConfig {
    fn default() -> Self {
        Self {
            dir: PathBuf::from("."),
            residuals: "ricker.csv".to_string(),
            timings: None,
            json: None,
            smoothing: None,
        }
    }
}

impl OutputConfig {
    /// Full path of the residual file.
    pub fn residuals_path(&self) -> PathBuf {
        self.dir.join(&self.residuals)
    }

    /// Full path of the timing file for `mode`.
    pub fn timings_path(&self, mode: TimingMode) -> PathBuf {
        match &self.timings {
            Some(name) => self.dir.join(name),
            None => self.dir.join(mode.default_file_name()),
        }
    }

    /// Full path of the JSON report, if enabled.
    pub fn json_path(&self) -> Option<PathBuf> {
        self.json.as_ref().map(|name| self.dir.join(name))
    }

    /// Full path of the smoothing table, if enabled.
    pub fn smoothing_path(&self) -> Option<PathBuf> {
        self.smoothing.as_ref().map(|name| self.dir.join(name))
    }
}

/// Configuration options for [`EwsBench`](crate::EwsBench).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    /// Seed of the series generator; the bootstrap derives its own stream (default: 0).
    pub seed: u64,
    /// Ricker model parameters.
    pub ricker: RickerParams,
    /// Transition index overriding the computed fold crossing (default: 860).
    ///
    /// `None` uses the index computed by the generator.
    pub transition: Option<usize>,
    /// Detrending step.
    pub detrend: DetrendConfig,
    /// Rolling power spectrum.
    pub spectrum: SpectrumParams,
    /// Timed operations.
    pub suite: SuiteConfig,
    /// Timing loop.
    pub harness: HarnessConfig,
    /// Result files.
    pub output: OutputConfig,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            seed: 0,
            ricker: RickerParams::default(),
            transition: Some(DEFAULT_TRANSITION),
            detrend: DetrendConfig::default(),
            spectrum: SpectrumParams::default(),
            suite: SuiteConfig::default(),
            harness: HarnessConfig::default(),
            output: OutputConfig::default(),
        }
    }
}

fn check_fraction(name: &str, value: f64) -> Result<(), ConfigError> {
    if value > 0.0 && value <= 1.0 {
        Ok(())
    } else {
        Err(ConfigError::Invalid(format!("{name} must be in (0, 1], got {value}")))
    }
}

fn check_file_name(name: &str, value: &str) -> Result<(), ConfigError> {
    if value.trim().is_empty() {
        Err(ConfigError::Invalid(format!("{name} file name is empty")))
    } else {
        Ok(())
    }
}

impl Config {
    /// Parse a TOML document; missing fields take their defaults.
    pub fn from_toml_str(text: &str) -> Result<Self, ConfigError> {
        let config: Config = toml::from_str(text)?;
        config.validate()?;
        Ok(config)
    }

    /// Read and parse a TOML file.
    pub fn from_toml_file(path: &Path) -> Result<Self, ConfigError> {
        let text = std::fs::read_to_string(path).map_err(|source| ConfigError::Read {
            path: path.to_path_buf(),
            source,
        })?;
        Self::from_toml_str(&text)
    }

    /// Check values that would only fail later in the run.
    ///
    /// Series parameters are checked by the generator itself.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.harness.repeats == 0 {
            return Err(ConfigError::Invalid("harness.repeats must be positive".into()));
        }
        check_fraction("detrend.span", self.detrend.span)?;
        check_fraction("spectrum.rolling_window", self.spectrum.rolling_window)?;
        check_fraction("spectrum.w_cutoff", self.spectrum.w_cutoff)?;
        if !(0.0..1.0).contains(&self.spectrum.ham_offset) {
            return Err(ConfigError::Invalid(format!(
                "spectrum.ham_offset must be in [0, 1), got {}",
                self.spectrum.ham_offset
            )));
        }
        if self.spectrum.ham_length == 0 || self.spectrum.roll_offset == 0 {
            return Err(ConfigError::Invalid(
                "spectrum.ham_length and spectrum.roll_offset must be positive".into(),
            ));
        }
        check_fraction("suite.rolling_window", self.suite.rolling_window)?;
        check_fraction("suite.default_window", self.suite.default_window)?;
        if self.suite.lag == 0 {
            return Err(ConfigError::Invalid("suite.lag must be positive".into()));
        }
        if self.suite.bootstrap_block_size == 0 {
            return Err(ConfigError::Invalid("suite.bootstrap_block_size must be positive".into()));
        }
        check_file_name("output.residuals", &self.output.residuals)?;
        for (name, value) in [
            ("output.timings", &self.output.timings),
            ("output.json", &self.output.json),
            ("output.smoothing", &self.output.smoothing),
        ] {
            if let Some(value) = value {
                check_file_name(name, value)?;
            }
        }
        Ok(())
    }
}
