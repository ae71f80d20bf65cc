//! Monotonic wall-clock timing.
//!
//! All measurements go through `std::time::Instant`; durations are reported
//! in seconds as `f64`.

use std::hint::black_box as std_black_box;
use std::time::{Duration, Instant};

/// Wrapper around `std::hint::black_box` for preventing compiler optimizations.
///
/// Every operation result passes through this so the compiler cannot elide
/// the computation being timed.
#[inline]
pub fn black_box<T>(x: T) -> T {
    std_black_box(x)
}

/// Consecutive clock reads used to estimate the resolution.
const RESOLUTION_PROBES: usize = 1000;

/// Estimate the clock resolution in seconds.
///
/// Takes the smallest non-zero difference between consecutive reads. Falls
/// back to one nanosecond if every pair reads the same instant.
fn estimate_resolution() -> f64 {
    let mut min_diff = Duration::MAX;
    for _ in 0..RESOLUTION_PROBES {
        let t1 = Instant::now();
        let t2 = Instant::now();
        let diff = t2.duration_since(t1);
        if !diff.is_zero() && diff < min_diff {
            min_diff = diff;
        }
    }

    if min_diff == Duration::MAX {
        1e-9
    } else {
        min_diff.as_secs_f64()
    }
}

/// Timer for measuring closures.
#[derive(Debug, Clone)]
pub struct Timer {
    /// Estimated clock resolution in seconds.
    resolution: f64,
}

impl Timer {
    /// Create a new timer, measuring the clock resolution.
    pub fn new() -> Self {
        Self {
            resolution: estimate_resolution(),
        }
    }

    /// Create a timer with a known resolution.
    ///
    /// Useful for testing.
    pub fn with_resolution(resolution: f64) -> Self {
        Self { resolution }
    }

    /// Estimated clock resolution in seconds.
    pub fn resolution(&self) -> f64 {
        self.resolution
    }

    /// Read the clock.
    #[inline]
    pub fn now(&self) -> Instant {
        Instant::now()
    }

    /// Seconds elapsed since `start`.
    #[inline]
    pub fn elapsed(&self, start: Instant) -> f64 {
        start.elapsed().as_secs_f64()
    }

    /// Whether `seconds` is within `factor` ticks of the clock resolution.
    pub fn near_resolution(&self, seconds: f64, factor: f64) -> bool {
        seconds < self.resolution * factor
    }
}

impl Default for Timer {
    fn default() -> Self {
        Self::new()
    }
}
