//! Terminal output formatting with colors and box drawing.

use colored::Colorize;

use crate::result::{BenchmarkResult, TimingMode};

/// Format seconds with a unit that keeps three significant integer digits.
pub fn format_duration(seconds: f64) -> String {
    let abs = seconds.abs();
    if !seconds.is_finite() {
        format!("{seconds}")
    } else if abs >= 1.0 {
        format!("{seconds:.3} s")
    } else if abs >= 1e-3 {
        format!("{:.3} ms", seconds * 1e3)
    } else if abs >= 1e-6 {
        format!("{:.3} \u{00B5}s", seconds * 1e6)
    } else {
        format!("{:.1} ns", seconds * 1e9)
    }
}

/// Format a BenchmarkResult for human-readable terminal output.
pub fn format_result(result: &BenchmarkResult) -> String {
    let mut output = String::new();
    let sep = "\u{2500}".repeat(62);

    output.push_str("ews-bench\n");
    output.push_str(&sep);
    output.push('\n');
    output.push('\n');

    let mode = match result.mode {
        TimingMode::Aggregate => "aggregate (total over all calls)",
        TimingMode::Minimum => "minimum (fastest single call)",
    };
    output.push_str(&format!("  Mode:     {}\n", mode));
    output.push_str(&format!("  Repeats:  {}\n", result.repeats));
    output.push_str(&format!(
        "  Timer:    {} resolution\n",
        format_duration(result.timer_resolution)
    ));
    output.push('\n');

    output.push_str(&format!(
        "  {:<3} {:<26} {:>14} {:>14}\n",
        "#", "operation", "reported", "per call"
    ));
    for (index, timing) in result.timings.iter().enumerate() {
        let reported = format!("{:>14}", format_duration(timing.seconds));
        let reported = if timing.seconds < 10.0 * result.timer_resolution {
            reported.yellow().to_string()
        } else {
            reported.green().to_string()
        };
        output.push_str(&format!(
            "  {:<3} {:<26} {} {:>14}\n",
            index,
            timing.name,
            reported,
            format_duration(timing.per_call(result.repeats))
        ));
    }
    output.push('\n');

    output.push_str(&sep);
    output.push('\n');
    output.push_str(&format!(
        "  Total: {}\n",
        format_duration(result.total_seconds()).bold()
    ));

    output
}
