//! CLI for the EWS estimator benchmark.
//!
//! # Usage
//!
//! ```bash
//! # Reference run: seed 0, 1000 points, 100 calls per operation
//! ews-bench
//!
//! # Fastest-call timings into ./results
//! ews-bench --mode minimum --output-dir results
//!
//! # Everything from a TOML file, with a CLI override
//! ews-bench --config bench.toml --repeats 20
//! ```

use std::path::PathBuf;
use std::process::ExitCode;

use clap::Parser;

use ews_bench::output::{format_result, to_json_pretty};
use ews_bench::{Config, EwsBench, EwsError, LogSummary, OutputError, SmoothingCsv, TimingMode};

/// Time early-warning-signal estimators on a simulated Ricker series
#[derive(Parser, Debug)]
#[command(name = "ews-bench")]
#[command(about = "Time early-warning-signal estimators on a simulated Ricker series")]
#[command(version)]
struct Args {
    /// TOML configuration file; flags below override it
    #[arg(short, long, value_name = "FILE")]
    config: Option<PathBuf>,

    /// Timing mode: aggregate (total of all calls) or minimum (fastest call)
    #[arg(short, long)]
    mode: Option<TimingMode>,

    /// Calls per operation
    #[arg(short = 'n', long)]
    repeats: Option<usize>,

    /// Seed of the series generator
    #[arg(short, long)]
    seed: Option<u64>,

    /// Directory the result files are written to
    #[arg(short, long, value_name = "DIR")]
    output_dir: Option<PathBuf>,

    /// Use the transition computed from the harvesting ramp instead of the configured one
    #[arg(long)]
    computed_transition: bool,

    /// Also write the state and smoothing columns to this file name
    #[arg(long, value_name = "FILE")]
    smoothing: Option<String>,

    /// Print the result as JSON instead of a table
    #[arg(long)]
    json: bool,

    /// Print nothing on success
    #[arg(short, long)]
    quiet: bool,
}

fn load_config(args: &Args) -> Result<Config, EwsError> {
    let mut config = match &args.config {
        Some(path) => Config::from_toml_file(path)?,
        None => Config::default(),
    };
    if let Some(mode) = args.mode {
        config.harness.mode = mode;
    }
    if let Some(repeats) = args.repeats {
        config.harness.repeats = repeats;
    }
    if let Some(seed) = args.seed {
        config.seed = seed;
    }
    if let Some(dir) = &args.output_dir {
        config.output.dir = dir.clone();
    }
    if args.computed_transition {
        config.transition = None;
    }
    if let Some(name) = &args.smoothing {
        config.output.smoothing = Some(name.clone());
    }
    config.validate()?;
    Ok(config)
}

fn run(args: &Args) -> Result<(), EwsError> {
    let config = load_config(args)?;
    let smoothing = config.output.smoothing_path();
    std::fs::create_dir_all(&config.output.dir).map_err(|source| OutputError::Io {
        path: config.output.dir.clone(),
        source,
    })?;

    let mut bench = EwsBench::with_config(config).hook(LogSummary);
    if let Some(path) = smoothing {
        bench = bench.hook(SmoothingCsv::new(path));
    }
    let report = bench.run()?;

    if args.json {
        println!("{}", to_json_pretty(&report.result).map_err(OutputError::from)?);
    } else if !args.quiet {
        print!("{}", format_result(&report.result));
    }
    Ok(())
}

fn main() -> ExitCode {
    let args = Args::parse();

    let default_level = if args.quiet { "warn" } else { "info" };
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new(default_level)),
        )
        .with_writer(std::io::stderr)
        .init();

    match run(&args) {
        Ok(()) => ExitCode::SUCCESS,
        Err(err) => {
            eprintln!("error: {err}");
            let mut source = std::error::Error::source(&err);
            while let Some(cause) = source {
                eprintln!("  caused by: {cause}");
                source = cause.source();
            }
            ExitCode::FAILURE
        }
    }
}
