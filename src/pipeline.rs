//! Main `EwsBench` entry point and builder.

use std::path::PathBuf;

use rand::SeedableRng;
use rand_xoshiro::Xoshiro256PlusPlus;
use serde::{Deserialize, Serialize};

use crate::config::{Config, SuiteConfig};
use crate::constants::OPERATION_NAMES;
use crate::context::{AnalysisContext, DetrendMethod, TrendStatistic};
use crate::error::{EwsError, HarnessError};
use crate::hooks::ReportHook;
use crate::measurement::{Collector, Operation};
use crate::output::{stage_column, stage_json};
use crate::result::{BenchmarkResult, TimingMode};
use crate::simulate::simulate_ricker;
use crate::statistics::{block_bootstrap, counter_rng_seed};
use crate::types::IndicatorTable;

/// Stream index of the bootstrap RNG relative to the generator seed.
const BOOTSTRAP_STREAM: u64 = 1;

/// Everything a finished run produced.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RunReport {
    /// Timings in declared order.
    pub result: BenchmarkResult,
    /// Transition index the analysis used.
    pub transition: Option<usize>,
    /// Transition index computed from the harvesting ramp.
    pub computed_transition: Option<usize>,
    /// Harvesting rate at the fold.
    pub critical_f: f64,
    /// Kendall tau of each indicator over the analysed range.
    pub trends: Vec<TrendStatistic>,
    /// Residual file.
    pub residuals_path: PathBuf,
    /// Timing file.
    pub timings_path: PathBuf,
}

/// Compute every indicator Kendall tau is taken over.
///
/// Runs outside the timed region so the Kendall tau operation only times
/// the trend statistic itself.
pub fn indicator_table(ctx: &AnalysisContext, suite: &SuiteConfig) -> Result<IndicatorTable, EwsError> {
    let mut table = IndicatorTable::new();
    table.insert(ctx.compute_var(suite.rolling_window)?);
    table.insert(ctx.compute_cv(suite.default_window)?);
    table.insert(ctx.compute_skew(suite.rolling_window)?);
    table.insert(ctx.compute_kurt(suite.default_window)?);
    table.insert(ctx.compute_auto(suite.rolling_window, suite.lag)?);
    table.insert(ctx.compute_smax()?);
    Ok(table)
}

/// The eight benchmarked operations in declared order.
///
/// The bootstrap operation owns its RNG, seeded from `seed` on a separate
/// stream; each call draws one surrogate of the residuals.
pub fn standard_operations<'a>(
    suite: &SuiteConfig,
    seed: u64,
    indicators: &'a IndicatorTable,
) -> Vec<Operation<'a>> {
    let [var, cv, skew, kurt, auto, smax, ktau, bootstrap] = OPERATION_NAMES;
    let SuiteConfig {
        rolling_window,
        default_window,
        lag,
        bootstrap_block_size,
        bootstrap_kind,
    } = suite.clone();
    let mut rng = Xoshiro256PlusPlus::seed_from_u64(counter_rng_seed(seed, BOOTSTRAP_STREAM));

    vec![
        Operation::from_fn(var, move |ctx| ctx.compute_var(rolling_window)),
        Operation::from_fn(cv, move |ctx| ctx.compute_cv(default_window)),
        Operation::from_fn(skew, move |ctx| ctx.compute_skew(rolling_window)),
        Operation::from_fn(kurt, move |ctx| ctx.compute_kurt(default_window)),
        Operation::from_fn(auto, move |ctx| ctx.compute_auto(rolling_window, lag)),
        Operation::from_fn(smax, |ctx| ctx.compute_smax()),
        Operation::from_fn(ktau, move |ctx| ctx.compute_ktau(indicators, None, None)),
        Operation::from_fn(bootstrap, move |ctx| {
            block_bootstrap(ctx.residuals(), 1, bootstrap_kind, bootstrap_block_size, &mut rng)
        }),
    ]
}

/// Main entry point for a benchmark run.
///
/// Use the builder pattern to configure and run.
///
/// # Example
///
/// ```ignore
/// use ews_bench::{EwsBench, TimingMode};
///
/// let report = EwsBench::new()
///     .repeats(100)
///     .mode(TimingMode::Minimum)
///     .output_dir("results")
///     .run()?;
/// ```
pub struct EwsBench {
    config: Config,
    hooks: Vec<Box<dyn ReportHook>>,
    replacements: Vec<(usize, Operation<'static>)>,
}

impl EwsBench {
    /// Create with the reference configuration.
    pub fn new() -> Self {
        Self::with_config(Config::default())
    }

    /// Create from an explicit configuration.
    pub fn with_config(config: Config) -> Self {
        Self {
            config,
            hooks: Vec::new(),
            replacements: Vec::new(),
        }
    }

    /// Create with a fast configuration for smoke tests.
    ///
    /// Settings:
    /// - 5 repeats (vs 100 default)
    /// - everything else unchanged
    pub fn quick() -> Self {
        let mut config = Config::default();
        config.harness.repeats = 5;
        Self::with_config(config)
    }

    /// Set the generator seed.
    pub fn seed(mut self, seed: u64) -> Self {
        self.config.seed = seed;
        self
    }

    /// Set the series length.
    pub fn tmax(mut self, tmax: usize) -> Self {
        self.config.ricker.tmax = tmax;
        self
    }

    /// Set the harvesting schedule: one value or `[start, end]`.
    pub fn forcing(mut self, f: Vec<f64>) -> Self {
        self.config.ricker.f = f;
        self
    }

    /// Override the transition index; `None` uses the computed one.
    pub fn transition(mut self, transition: Option<usize>) -> Self {
        self.config.transition = transition;
        self
    }

    /// Set the detrending method and span.
    pub fn detrend(mut self, method: DetrendMethod, span: f64) -> Self {
        self.config.detrend.method = method;
        self.config.detrend.span = span;
        self
    }

    /// Set calls per operation.
    pub fn repeats(mut self, n: usize) -> Self {
        self.config.harness.repeats = n;
        self
    }

    /// Set untimed warmup calls per operation.
    pub fn warmup(mut self, n: usize) -> Self {
        self.config.harness.warmup = n;
        self
    }

    /// Set the timing mode.
    pub fn mode(mut self, mode: TimingMode) -> Self {
        self.config.harness.mode = mode;
        self
    }

    /// Set the output directory.
    pub fn output_dir(mut self, dir: impl Into<PathBuf>) -> Self {
        self.config.output.dir = dir.into();
        self
    }

    /// Register a hook called after preprocessing.
    pub fn hook(mut self, hook: impl ReportHook + 'static) -> Self {
        self.hooks.push(Box::new(hook));
        self
    }

    /// Replace the operation at `index` of the declared list.
    ///
    /// The replacement keeps the slot's position in the timing file.
    /// [`run`](Self::run) fails with [`HarnessError::NoSuchOperation`] if
    /// `index` is past the end of [`OPERATION_NAMES`].
    pub fn replace_operation(mut self, index: usize, operation: Operation<'static>) -> Self {
        self.replacements.push((index, operation));
        self
    }

    /// Get the current configuration.
    pub fn config(&self) -> &Config {
        &self.config
    }

    /// Run the whole pipeline.
    ///
    /// 1. Simulate the series from the seed
    /// 2. Detrend and compute the spectrum, once, untimed
    /// 3. Run the hooks
    /// 4. Time every operation
    /// 5. Write the residual and timing files
    ///
    /// Files are only written after every operation succeeded, and only
    /// renamed into place once all of them have been written.
    pub fn run(self) -> Result<RunReport, EwsError> {
        let Self {
            config,
            mut hooks,
            replacements,
        } = self;
        config.validate()?;
        if let Some(&(index, _)) = replacements.iter().find(|(i, _)| *i >= OPERATION_NAMES.len()) {
            return Err(HarnessError::NoSuchOperation {
                index,
                count: OPERATION_NAMES.len(),
            }
            .into());
        }

        let mut rng = Xoshiro256PlusPlus::seed_from_u64(config.seed);
        let simulation = simulate_ricker(&config.ricker, &mut rng)?;
        let computed_transition = simulation.transition();
        let transition = config.transition.or(computed_transition);
        tracing::info!(
            seed = config.seed,
            tmax = config.ricker.tmax,
            critical_f = simulation.critical_f,
            ?computed_transition,
            ?transition,
            "simulated series"
        );

        let mut ctx = AnalysisContext::new(simulation.series.with_transition(transition))?;
        ctx.detrend(config.detrend.method, config.detrend.span)?;
        ctx.compute_spectrum_with(config.spectrum.clone())?;

        for hook in &mut hooks {
            hook.after_preprocess(&ctx)?;
        }

        let indicators = indicator_table(&ctx, &config.suite)?;
        let trends = ctx.compute_ktau(&indicators, None, None)?;
        for trend in &trends {
            tracing::debug!(indicator = %trend.indicator, tau = trend.tau, "kendall tau");
        }

        let result = {
            let mut operations = standard_operations(&config.suite, config.seed, &indicators);
            for (index, operation) in replacements {
                operations[index] = operation;
            }
            let collector = Collector::new(config.harness.repeats, config.harness.mode)
                .warmup(config.harness.warmup);
            collector.run(&ctx, &mut operations)?
        };

        let residuals_path = config.output.residuals_path();
        let timings_path = config.output.timings_path(result.mode);
        let mut staged = vec![
            stage_column(&residuals_path, &ctx.residual_column())?,
            stage_column(&timings_path, &result.seconds())?,
        ];
        if let Some(path) = config.output.json_path() {
            staged.push(stage_json(&path, &result)?);
        }
        for file in staged {
            file.commit()?;
        }
        tracing::info!(
            residuals = %residuals_path.display(),
            timings = %timings_path.display(),
            "wrote results"
        );

        Ok(RunReport {
            result,
            transition,
            computed_transition,
            critical_f: simulation.critical_f,
            trends,
            residuals_path,
            timings_path,
        })
    }
}

impl Default for EwsBench {
    fn default() -> Self {
        Self::new()
    }
}

impl std::fmt::Debug for EwsBench {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("EwsBench")
            .field("config", &self.config)
            .field("hooks", &self.hooks.len())
            .field("replacements", &self.replacements.len())
            .finish()
    }
}
