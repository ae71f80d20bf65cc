//! Measurement infrastructure for the benchmark harness.
//!
//! This module provides:
//! - A monotonic wall-clock [`Timer`] with resolution estimation
//! - Named [`Operation`]s wrapping the timed closures
//! - The [`Collector`] that runs operations repeatedly and reduces samples
//!
//! # Timing modes
//!
//! - **Aggregate**: one clock read before and after `repeats` calls; the
//!   reported value is the total elapsed seconds.
//! - **Minimum**: one clock read around each call; the reported value is the
//!   fastest call.

mod collector;
mod operation;
mod timer;

pub use collector::Collector;
pub use operation::Operation;
pub use timer::{black_box, Timer};
