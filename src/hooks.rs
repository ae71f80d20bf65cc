//! Optional reporting after preprocessing.
//!
//! Hooks see the context once, after detrending and the spectrum and before
//! any timing. They exist for inspection (logs, the data behind a plot) and
//! never influence what is measured.

use std::path::PathBuf;

use crate::context::AnalysisContext;
use crate::error::EwsError;
use crate::output::write_table;

/// Called once with the preprocessed context.
pub trait ReportHook {
    /// Inspect the context. Errors abort the run before timing starts.
    fn after_preprocess(&mut self, ctx: &AnalysisContext) -> Result<(), EwsError>;
}

impl<F> ReportHook for F
where
    F: FnMut(&AnalysisContext) -> Result<(), EwsError>,
{
    fn after_preprocess(&mut self, ctx: &AnalysisContext) -> Result<(), EwsError> {
        self(ctx)
    }
}

/// Logs a one-line summary of the decomposition and spectrum.
#[derive(Debug, Default, Clone, Copy)]
pub struct LogSummary;

impl ReportHook for LogSummary {
    fn after_preprocess(&mut self, ctx: &AnalysisContext) -> Result<(), EwsError> {
        let residuals = ctx.residuals();
        let n = residuals.len();
        let rms = if n == 0 {
            f64::NAN
        } else {
            (residuals.iter().map(|r| r * r).sum::<f64>() / n as f64).sqrt()
        };
        tracing::info!(
            len = ctx.series().len(),
            analysed = n,
            transition = ?ctx.series().transition(),
            method = ?ctx.decomposition().map(|d| d.method),
            residual_rms = rms,
            spectrum_frames = ctx.spectrum().map_or(0, |s| s.frames.len()),
            "preprocessing complete"
        );
        Ok(())
    }
}

/// Writes the `state,smoothing` columns of the decomposition to a CSV file.
#[derive(Debug, Clone)]
pub struct SmoothingCsv {
    path: PathBuf,
}

impl SmoothingCsv {
    /// Write to `path`.
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }
}

impl ReportHook for SmoothingCsv {
    fn after_preprocess(&mut self, ctx: &AnalysisContext) -> Result<(), EwsError> {
        let Some(decomposition) = ctx.decomposition() else {
            tracing::warn!(path = %self.path.display(), "series not detrended, skipping smoothing table");
            return Ok(());
        };
        write_table(
            &self.path,
            &["state", "smoothing"],
            &[&decomposition.state, &decomposition.smoothing],
        )?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::context::DetrendMethod;
    use crate::types::TimeSeries;

    fn detrended() -> AnalysisContext {
        let values = (0..60).map(|i| (i as f64 * 0.3).sin() + 2.0).collect();
        let mut ctx = AnalysisContext::new(TimeSeries::new(values, Some(49))).unwrap();
        ctx.detrend(DetrendMethod::Lowess, 0.3).unwrap();
        ctx
    }

    #[test]
    fn test_closure_hook() {
        let mut seen = 0;
        let mut hook = |ctx: &AnalysisContext| {
            seen = ctx.series().len();
            Ok::<(), EwsError>(())
        };
        hook.after_preprocess(&detrended()).unwrap();
        assert_eq!(seen, 60);
    }

    #[test]
    fn test_log_summary_never_fails() {
        let ctx = AnalysisContext::new(TimeSeries::new(vec![1.0, 2.0], None)).unwrap();
        assert!(LogSummary.after_preprocess(&ctx).is_ok());
    }

    #[test]
    fn test_smoothing_csv() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("smooth.csv");
        SmoothingCsv::new(&path).after_preprocess(&detrended()).unwrap();

        let text = std::fs::read_to_string(&path).unwrap();
        let lines: Vec<&str> = text.lines().collect();
        assert_eq!(lines[0], "state,smoothing");
        assert_eq!(lines.len(), 61);
        assert!(lines[60].ends_with(",nan"));
    }
}
