//! Result files and human-readable reports.
//!
//! - [`stage_column`]: one `%.18e` value per line, the residual and timing
//!   files, renamed into place by [`StagedFile::commit`]
//! - [`stage_json`]: full [`BenchmarkResult`](crate::BenchmarkResult) including samples
//! - [`format_result`]: colored terminal table

mod columns;
mod json;
mod terminal;

pub use columns::{format_value, stage_bytes, stage_column, write_table, StagedFile};
pub use json::{stage_json, to_json_pretty};
pub use terminal::{format_duration, format_result};
