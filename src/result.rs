//! Benchmark result types.

use serde::{Deserialize, Serialize};

/// How repeated calls of an operation are turned into one number.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TimingMode {
    /// One clock pair around the whole loop; reports total elapsed seconds.
    #[default]
    Aggregate,
    /// One clock pair around every call; reports the fastest call.
    Minimum,
}

impl TimingMode {
    /// Default timing file name for this mode.
    pub fn default_file_name(self) -> &'static str {
        match self {
            TimingMode::Aggregate => "t_elapsed.csv",
            TimingMode::Minimum => "t_minruntime.csv",
        }
    }

    /// Short label used in logs and reports.
    pub fn label(self) -> &'static str {
        match self {
            TimingMode::Aggregate => "aggregate",
            TimingMode::Minimum => "minimum",
        }
    }
}

impl std::str::FromStr for TimingMode {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "aggregate" | "elapsed" => Ok(TimingMode::Aggregate),
            "minimum" | "min" | "minruntime" => Ok(TimingMode::Minimum),
            other => Err(format!("unknown timing mode `{other}` (expected aggregate or minimum)")),
        }
    }
}

/// Timing of one operation.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct OperationTiming {
    /// Operation name.
    pub name: String,
    /// Reported value in seconds: the loop total or the fastest call.
    pub seconds: f64,
    /// Per-call samples in seconds. Empty in aggregate mode.
    pub samples: Vec<f64>,
}

impl OperationTiming {
    /// Mean seconds per call.
    pub fn per_call(&self, repeats: usize) -> f64 {
        if self.samples.is_empty() {
            self.seconds / repeats.max(1) as f64
        } else {
            self.samples.iter().sum::<f64>() / self.samples.len() as f64
        }
    }
}

/// Complete result of a benchmark run.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BenchmarkResult {
    /// Mode the timings were taken in.
    pub mode: TimingMode,
    /// Calls per operation.
    pub repeats: usize,
    /// Estimated clock resolution in seconds.
    pub timer_resolution: f64,
    /// One entry per operation, in declared order.
    pub timings: Vec<OperationTiming>,
}

impl BenchmarkResult {
    /// Reported values in declared order; this is the timing file's content.
    pub fn seconds(&self) -> Vec<f64> {
        self.timings.iter().map(|t| t.seconds).collect()
    }

    /// Look up an operation's timing by name.
    pub fn get(&self, name: &str) -> Option<&OperationTiming> {
        self.timings.iter().find(|t| t.name == name)
    }

    /// Sum of reported values.
    pub fn total_seconds(&self) -> f64 {
        self.timings.iter().map(|t| t.seconds).sum()
    }
}
