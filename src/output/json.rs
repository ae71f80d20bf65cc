//! JSON serialization for benchmark results.

use std::path::Path;

use super::columns::{stage_bytes, StagedFile};
use crate::error::OutputError;
use crate::result::BenchmarkResult;

/// Serialize a BenchmarkResult to a pretty-printed JSON string.
pub fn to_json_pretty(result: &BenchmarkResult) -> Result<String, serde_json::Error> {
    serde_json::to_string_pretty(result)
}

/// Stage the pretty-printed report for `path`.
pub fn stage_json(path: &Path, result: &BenchmarkResult) -> Result<StagedFile, OutputError> {
    let json = to_json_pretty(result)?;
    stage_bytes(path, json.as_bytes())
}
