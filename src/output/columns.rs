//! Plain-text numeric output.
//!
//! Files are written to a temporary file in the destination directory and
//! renamed into place, so a reader never sees a half-written file and a
//! failed write leaves any previous file untouched. Writing is split into
//! [`stage_column`] (fill the temporary file) and [`StagedFile::commit`]
//! (rename it), so several files can be staged before any of them appears.

use std::io::Write;
use std::path::{Path, PathBuf};

use tempfile::NamedTempFile;

use crate::error::OutputError;

/// Format a value like C's `%.18e`: 18 fractional digits, signed exponent
/// with at least two digits. Non-finite values are `nan`, `inf`, `-inf`.
pub fn format_value(value: f64) -> String {
    if value.is_nan() {
        return "nan".to_string();
    }
    if value.is_infinite() {
        return if value > 0.0 { "inf" } else { "-inf" }.to_string();
    }

    let raw = format!("{value:.18e}");
    match raw.split_once('e') {
        Some((mantissa, exponent)) => {
            let exp: i32 = exponent.parse().unwrap_or(0);
            let sign = if exp < 0 { '-' } else { '+' };
            format!("{mantissa}e{sign}{:02}", exp.abs())
        }
        None => raw,
    }
}

fn io_error(path: &Path) -> impl FnOnce(std::io::Error) -> OutputError + '_ {
    move |source| OutputError::Io {
        path: path.to_path_buf(),
        source,
    }
}

fn csv_error(path: &Path) -> impl FnOnce(csv::Error) -> OutputError + '_ {
    move |source| OutputError::Csv {
        path: path.to_path_buf(),
        source,
    }
}

/// Directory a temporary file for `path` should live in.
fn parent_dir(path: &Path) -> PathBuf {
    match path.parent() {
        Some(dir) if !dir.as_os_str().is_empty() => dir.to_path_buf(),
        _ => PathBuf::from("."),
    }
}

/// A fully written temporary file waiting to be renamed to its destination.
///
/// Dropping it without [`commit`](StagedFile::commit) deletes the temporary
/// file and leaves the destination untouched.
#[derive(Debug)]
pub struct StagedFile {
    tmp: NamedTempFile,
    path: PathBuf,
}

impl StagedFile {
    /// Final destination.
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Rename the temporary file into place.
    pub fn commit(self) -> Result<(), OutputError> {
        let Self { tmp, path } = self;
        tmp.persist(&path).map_err(|e| OutputError::Io {
            path: path.clone(),
            source: e.error,
        })?;
        Ok(())
    }
}

/// Write rows to a temporary file next to `path`.
fn stage_rows<F>(path: &Path, has_headers: bool, fill: F) -> Result<StagedFile, OutputError>
where
    F: FnOnce(&mut csv::Writer<&std::fs::File>) -> Result<(), csv::Error>,
{
    let tmp = NamedTempFile::new_in(parent_dir(path)).map_err(io_error(path))?;
    {
        let mut writer = csv::WriterBuilder::new()
            .has_headers(has_headers)
            .from_writer(tmp.as_file());
        fill(&mut writer).map_err(csv_error(path))?;
        writer.flush().map_err(io_error(path))?;
    }
    tmp.as_file().sync_all().map_err(io_error(path))?;
    Ok(StagedFile {
        tmp,
        path: path.to_path_buf(),
    })
}

/// Stage `values` for `path`, one per line, with no header.
///
/// # Errors
///
/// Fails if the destination directory is missing or not writable.
pub fn stage_column(path: &Path, values: &[f64]) -> Result<StagedFile, OutputError> {
    let staged = stage_rows(path, false, |writer| {
        for &value in values {
            writer.write_record([format_value(value)])?;
        }
        Ok(())
    })?;
    tracing::debug!(path = %path.display(), rows = values.len(), "staged column");
    Ok(staged)
}

/// Write equal-length `columns` to `path` under a header row.
///
/// Rows stop at the shortest column.
pub fn write_table(path: &Path, headers: &[&str], columns: &[&[f64]]) -> Result<(), OutputError> {
    let rows = columns.iter().map(|c| c.len()).min().unwrap_or(0);
    stage_rows(path, true, |writer| {
        writer.write_record(headers)?;
        for row in 0..rows {
            writer.write_record(columns.iter().map(|c| format_value(c[row])))?;
        }
        Ok(())
    })?
    .commit()?;
    tracing::debug!(path = %path.display(), rows, "wrote table");
    Ok(())
}

/// Stage raw bytes for `path`.
pub fn stage_bytes(path: &Path, bytes: &[u8]) -> Result<StagedFile, OutputError> {
    let mut tmp = NamedTempFile::new_in(parent_dir(path)).map_err(io_error(path))?;
    tmp.write_all(bytes).map_err(io_error(path))?;
    tmp.as_file().sync_all().map_err(io_error(path))?;
    Ok(StagedFile {
        tmp,
        path: path.to_path_buf(),
    })
}
