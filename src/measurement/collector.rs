//! Repeated timing of an ordered operation list.
//!
//! Operations run sequentially in declared order, each `repeats` times, on
//! one thread. Both timing modes share the same loop: aggregate mode reads
//! the clock around the whole loop, minimum mode around every call.

use crate::context::AnalysisContext;
use crate::error::HarnessError;
use crate::result::{BenchmarkResult, OperationTiming, TimingMode};
use crate::statistics::acf;

use super::operation::Operation;
use super::timer::{black_box, Timer};

/// Minimum samples closer than this many clock ticks are flagged.
const RESOLUTION_WARNING_FACTOR: f64 = 10.0;

/// Lag-1 autocorrelation of per-call samples above which drift is logged.
const DRIFT_ACF_THRESHOLD: f64 = 0.5;

/// Collector for timing an ordered list of operations.
#[derive(Debug)]
pub struct Collector {
    /// The timer used for measurements.
    timer: Timer,
    /// Calls per operation.
    repeats: usize,
    /// Untimed calls per operation before measuring.
    warmup_iterations: usize,
    /// Where clock reads happen and how samples are reduced.
    mode: TimingMode,
}

impl Collector {
    /// Create a collector, calibrating a fresh timer.
    pub fn new(repeats: usize, mode: TimingMode) -> Self {
        Self::with_timer(Timer::new(), repeats, mode)
    }

    /// Create a collector with a pre-calibrated timer.
    pub fn with_timer(timer: Timer, repeats: usize, mode: TimingMode) -> Self {
        tracing::debug!(resolution = timer.resolution(), "timer calibrated");
        Self {
            timer,
            repeats,
            warmup_iterations: 0,
            mode,
        }
    }

    /// Set the number of untimed warmup calls per operation.
    pub fn warmup(mut self, iterations: usize) -> Self {
        self.warmup_iterations = iterations;
        self
    }

    /// Get a reference to the internal timer.
    pub fn timer(&self) -> &Timer {
        &self.timer
    }

    /// Timing mode.
    pub fn mode(&self) -> TimingMode {
        self.mode
    }

    /// Calls per operation.
    pub fn repeats(&self) -> usize {
        self.repeats
    }

    /// Time every operation in order.
    ///
    /// # Errors
    ///
    /// The first failing call aborts the run with
    /// [`HarnessError::OperationFailed`]; later operations are not run and
    /// no partial result is returned.
    pub fn run(
        &self,
        ctx: &AnalysisContext,
        operations: &mut [Operation<'_>],
    ) -> Result<BenchmarkResult, HarnessError> {
        if self.repeats == 0 {
            return Err(HarnessError::ZeroRepeats);
        }

        let mut timings = Vec::with_capacity(operations.len());
        for (index, op) in operations.iter_mut().enumerate() {
            let timing = self.time_operation(ctx, index, op)?;
            tracing::info!(
                index,
                operation = %timing.name,
                seconds = timing.seconds,
                mode = self.mode.label(),
                "timed operation"
            );
            timings.push(timing);
        }

        Ok(BenchmarkResult {
            mode: self.mode,
            repeats: self.repeats,
            timer_resolution: self.timer.resolution(),
            timings,
        })
    }

    fn time_operation(
        &self,
        ctx: &AnalysisContext,
        index: usize,
        op: &mut Operation<'_>,
    ) -> Result<OperationTiming, HarnessError> {
        let name = op.name().to_string();
        let fail = |trial, source| HarnessError::OperationFailed {
            index,
            name: name.clone(),
            trial,
            source,
        };

        for _ in 0..self.warmup_iterations {
            black_box(op.call(ctx)).map_err(|e| fail(None, e))?;
        }

        let per_call = self.mode == TimingMode::Minimum;
        let mut samples = Vec::with_capacity(if per_call { self.repeats } else { 0 });

        let loop_start = self.timer.now();
        for trial in 0..self.repeats {
            let call_start = per_call.then(|| self.timer.now());
            let outcome = black_box(op.call(ctx));
            if let Some(start) = call_start {
                samples.push(self.timer.elapsed(start));
            }
            outcome.map_err(|e| fail(Some(trial), e))?;
        }
        let loop_elapsed = self.timer.elapsed(loop_start);

        let seconds = if per_call {
            samples.iter().copied().fold(f64::INFINITY, f64::min)
        } else {
            loop_elapsed
        };

        if per_call {
            self.check_samples(&name, seconds, &samples);
        }

        Ok(OperationTiming {
            name,
            seconds,
            samples,
        })
    }

    /// Log quality warnings for per-call samples.
    fn check_samples(&self, name: &str, minimum: f64, samples: &[f64]) {
        if self.timer.near_resolution(minimum, RESOLUTION_WARNING_FACTOR) {
            tracing::warn!(
                operation = name,
                minimum,
                resolution = self.timer.resolution(),
                "fastest call is close to the clock resolution"
            );
        }

        if samples.len() >= 10 {
            let rho = acf(samples, 1);
            if rho > DRIFT_ACF_THRESHOLD {
                tracing::warn!(operation = name, acf1 = rho, "call times drift across trials");
            }
        }
    }
}
