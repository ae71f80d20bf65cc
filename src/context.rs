//! Analysis context: a series plus its one-time preprocessing.
//!
//! [`AnalysisContext::detrend`] and [`AnalysisContext::compute_spectrum`] are
//! the setup cost of a benchmark run; they mutate the context and run once,
//! outside the timed region. Every `compute_*` estimator borrows the context
//! immutably and returns its result, so timed operations cannot leak state
//! into one another.
//!
//! Only the part of the series up to and including the transition is
//! analysed; derived columns are `NaN` after it.

use serde::{Deserialize, Serialize};

use crate::constants::{
    DEFAULT_HAM_LENGTH, DEFAULT_HAM_OFFSET, DEFAULT_PSPEC_ROLL_OFFSET, DEFAULT_ROLLING_WINDOW,
    DEFAULT_W_CUTOFF,
};
use crate::error::{PreprocessingError, StatsError};
use crate::statistics::{
    gaussian_filter, kendall_tau_time, lowess, rolling_autocorrelation, rolling_cv,
    rolling_kurtosis, rolling_skewness, rolling_variance, welch, window_size, SpectrumPoint,
};
use crate::types::{Indicator, IndicatorTable, TimeSeries};

/// Smoother used to split the series into trend and residuals.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum DetrendMethod {
    /// Robust local linear regression; `span` is the neighbourhood fraction.
    #[default]
    Lowess,
    /// Gaussian kernel; `span` is the kernel bandwidth as a fraction of the length.
    Gaussian,
}

/// Result of [`AnalysisContext::detrend`].
///
/// All columns have the full series length.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Decomposition {
    /// Method that produced the smoothing.
    pub method: DetrendMethod,
    /// Span used.
    pub span: f64,
    /// Original values.
    pub state: Vec<f64>,
    /// Smoothed trend, `NaN` after the transition.
    pub smoothing: Vec<f64>,
    /// `state - smoothing`, `NaN` after the transition.
    pub residuals: Vec<f64>,
}

/// Parameters of the rolling power spectrum.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SpectrumParams {
    /// Window length as a fraction of the pre-transition length.
    pub rolling_window: f64,
    /// Hamming window length in points.
    pub ham_length: usize,
    /// Overlap between Hamming windows as a fraction of `ham_length`.
    pub ham_offset: f64,
    /// Step between consecutive frames, in points.
    pub roll_offset: usize,
    /// Fraction of the frequency range to keep.
    pub w_cutoff: f64,
}

impl Default for SpectrumParams {
    fn default() -> Self {
        Self {
            rolling_window: DEFAULT_ROLLING_WINDOW,
            ham_length: DEFAULT_HAM_LENGTH,
            ham_offset: DEFAULT_HAM_OFFSET,
            roll_offset: DEFAULT_PSPEC_ROLL_OFFSET,
            w_cutoff: DEFAULT_W_CUTOFF,
        }
    }
}

/// Power spectrum of the window ending at `time`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SpectrumFrame {
    /// Index of the last point in the window.
    pub time: usize,
    /// Spectrum sorted by frequency.
    pub points: Vec<SpectrumPoint>,
}

/// Rolling power spectrum, one frame per window end.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PowerSpectrum {
    /// Parameters the frames were computed with.
    pub params: SpectrumParams,
    /// Frames in time order.
    pub frames: Vec<SpectrumFrame>,
}

/// Kendall tau of one indicator against time.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TrendStatistic {
    /// Indicator column name.
    pub indicator: String,
    /// Kendall tau-b, `NaN` if undefined.
    pub tau: f64,
}

fn check_fraction(what: &'static str, value: f64) -> Result<(), PreprocessingError> {
    if value > 0.0 && value <= 1.0 {
        Ok(())
    } else {
        Err(PreprocessingError::InvalidFraction { what, value })
    }
}

/// A time series together with its detrending and power spectrum.
#[derive(Debug, Clone)]
pub struct AnalysisContext {
    series: TimeSeries,
    decomposition: Option<Decomposition>,
    spectrum: Option<PowerSpectrum>,
}

impl AnalysisContext {
    /// Wrap a series.
    ///
    /// # Errors
    ///
    /// Fails if the transition index lies outside the series.
    pub fn new(series: TimeSeries) -> Result<Self, PreprocessingError> {
        if let Some(transition) = series.transition() {
            if transition >= series.len() {
                return Err(PreprocessingError::TransitionOutOfRange {
                    transition,
                    len: series.len(),
                });
            }
        }
        Ok(Self {
            series,
            decomposition: None,
            spectrum: None,
        })
    }

    /// The wrapped series.
    pub fn series(&self) -> &TimeSeries {
        &self.series
    }

    /// The detrending result, if [`detrend`](Self::detrend) has run.
    pub fn decomposition(&self) -> Option<&Decomposition> {
        self.decomposition.as_ref()
    }

    /// The rolling spectrum, if [`compute_spectrum`](Self::compute_spectrum) has run.
    pub fn spectrum(&self) -> Option<&PowerSpectrum> {
        self.spectrum.as_ref()
    }

    /// Number of points the estimators look at.
    pub fn analysed_len(&self) -> usize {
        self.series.pre_transition_len()
    }

    /// Full-length residual column (`NaN` after the transition).
    ///
    /// Before detrending this is the state itself.
    pub fn residual_column(&self) -> Vec<f64> {
        match &self.decomposition {
            Some(d) => d.residuals.clone(),
            None => self.series.values().to_vec(),
        }
    }

    /// Pre-transition residuals, or the pre-transition state if not detrended.
    pub fn residuals(&self) -> &[f64] {
        let n = self.analysed_len();
        match &self.decomposition {
            Some(d) => &d.residuals[..n],
            None => self.series.pre_transition(),
        }
    }

    fn state(&self) -> &[f64] {
        self.series.pre_transition()
    }

    /// Split the pre-transition series into smoothing and residuals.
    ///
    /// # Errors
    ///
    /// Fails if `span` is not in `(0, 1]`, there are fewer than three points,
    /// or the series was already detrended. Detrending twice is rejected
    /// rather than silently recomputed.
    pub fn detrend(&mut self, method: DetrendMethod, span: f64) -> Result<(), PreprocessingError> {
        if self.decomposition.is_some() {
            return Err(PreprocessingError::AlreadyDetrended);
        }
        check_fraction("span", span)?;

        let pre = self.state();
        let n = pre.len();
        if n < 3 {
            return Err(PreprocessingError::InsufficientData {
                what: "detrend",
                needed: 3,
                got: n,
            });
        }

        let smooth_pre = match method {
            DetrendMethod::Lowess => {
                let index: Vec<f64> = (0..n).map(|t| t as f64).collect();
                lowess(&index, pre, span)
            }
            DetrendMethod::Gaussian => gaussian_filter(pre, span * n as f64),
        };

        let state = self.series.values().to_vec();
        let mut smoothing = vec![f64::NAN; state.len()];
        smoothing[..n].copy_from_slice(&smooth_pre);
        let residuals = state.iter().zip(&smoothing).map(|(s, m)| s - m).collect();

        tracing::debug!(?method, span, points = n, "detrended series");

        self.decomposition = Some(Decomposition {
            method,
            span,
            state,
            smoothing,
            residuals,
        });
        Ok(())
    }

    /// Compute the rolling power spectrum with default overlap, step and cutoff.
    pub fn compute_spectrum(&mut self, rolling_window: f64, ham_length: usize) -> Result<(), PreprocessingError> {
        self.compute_spectrum_with(SpectrumParams {
            rolling_window,
            ham_length,
            ..SpectrumParams::default()
        })
    }

    /// Compute the rolling power spectrum of the residuals.
    ///
    /// Frames end at `w - 1, w - 1 + roll_offset, ...` where
    /// `w = floor(rolling_window * n)`. Recomputing replaces the previous
    /// spectrum.
    ///
    /// # Errors
    ///
    /// Fails on fractions outside `(0, 1]`, an offset outside `[0, 1)`, a zero
    /// Hamming length or step, or a window of fewer than two points.
    pub fn compute_spectrum_with(&mut self, params: SpectrumParams) -> Result<(), PreprocessingError> {
        check_fraction("rolling_window", params.rolling_window)?;
        if !(0.0..1.0).contains(&params.ham_offset) {
            return Err(PreprocessingError::InvalidOffset {
                what: "ham_offset",
                value: params.ham_offset,
            });
        }
        check_fraction("w_cutoff", params.w_cutoff)?;
        if params.ham_length == 0 || params.roll_offset == 0 {
            return Err(PreprocessingError::InsufficientData {
                what: "spectrum hamming window and roll offset",
                needed: 1,
                got: 0,
            });
        }

        let data = self.residuals();
        let n = data.len();
        let window = (params.rolling_window * n as f64) as usize;
        if window < 2 {
            return Err(PreprocessingError::InsufficientData {
                what: "spectrum window",
                needed: 2,
                got: window,
            });
        }

        let frames: Vec<SpectrumFrame> = (window - 1..n)
            .step_by(params.roll_offset)
            .map(|time| SpectrumFrame {
                time,
                points: welch(
                    &data[time + 1 - window..=time],
                    1.0,
                    params.ham_length,
                    params.ham_offset,
                    params.w_cutoff,
                ),
            })
            .collect();

        tracing::debug!(frames = frames.len(), window, "computed rolling spectrum");

        self.spectrum = Some(PowerSpectrum { params, frames });
        Ok(())
    }

    /// Rolling variance of the residuals.
    pub fn compute_var(&self, rolling_window: f64) -> Result<Indicator, StatsError> {
        let w = window_size(rolling_window, self.analysed_len())?;
        Ok(Indicator::new("variance", rolling_variance(self.residuals(), w)?))
    }

    /// Rolling coefficient of variation: residual std over state mean.
    pub fn compute_cv(&self, rolling_window: f64) -> Result<Indicator, StatsError> {
        let w = window_size(rolling_window, self.analysed_len())?;
        Ok(Indicator::new("cv", rolling_cv(self.residuals(), self.state(), w)?))
    }

    /// Rolling skewness of the residuals.
    pub fn compute_skew(&self, rolling_window: f64) -> Result<Indicator, StatsError> {
        let w = window_size(rolling_window, self.analysed_len())?;
        Ok(Indicator::new("skew", rolling_skewness(self.residuals(), w)?))
    }

    /// Rolling excess kurtosis of the residuals.
    pub fn compute_kurt(&self, rolling_window: f64) -> Result<Indicator, StatsError> {
        let w = window_size(rolling_window, self.analysed_len())?;
        Ok(Indicator::new("kurtosis", rolling_kurtosis(self.residuals(), w)?))
    }

    /// Rolling lag-`lag` autocorrelation of the residuals.
    pub fn compute_auto(&self, rolling_window: f64, lag: usize) -> Result<Indicator, StatsError> {
        let w = window_size(rolling_window, self.analysed_len())?;
        Ok(Indicator::new(
            format!("ac{lag}"),
            rolling_autocorrelation(self.residuals(), w, lag)?,
        ))
    }

    /// Peak power of each spectrum frame, placed at the frame's end time.
    pub fn compute_smax(&self) -> Result<Indicator, StatsError> {
        let spectrum = self.spectrum.as_ref().ok_or(StatsError::SpectrumMissing)?;
        let mut values = vec![f64::NAN; self.analysed_len()];
        for frame in &spectrum.frames {
            values[frame.time] = frame
                .points
                .iter()
                .map(|p| p.power)
                .fold(f64::NAN, f64::max);
        }
        Ok(Indicator::new("smax", values))
    }

    /// Kendall tau of each indicator against time over `[tmin, tmax]`.
    ///
    /// `None` bounds mean the earliest and latest analysed times.
    ///
    /// # Errors
    ///
    /// Fails if the range selects no points.
    pub fn compute_ktau(
        &self,
        indicators: &IndicatorTable,
        tmin: Option<usize>,
        tmax: Option<usize>,
    ) -> Result<Vec<TrendStatistic>, StatsError> {
        let n = self.analysed_len();
        let lo = tmin.unwrap_or(0);
        let hi = tmax.unwrap_or(n.saturating_sub(1)).min(n.saturating_sub(1));
        if n == 0 || lo > hi {
            return Err(StatsError::EmptyRange { tmin: lo, tmax: hi });
        }

        Ok(indicators
            .iter()
            .map(|indicator| {
                let end = (hi + 1).min(indicator.values.len());
                let tau = if lo < end {
                    kendall_tau_time(&indicator.values[lo..end], lo)
                } else {
                    f64::NAN
                };
                TrendStatistic {
                    indicator: indicator.name.clone(),
                    tau,
                }
            })
            .collect())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn noisy_series(n: usize, transition: Option<usize>) -> TimeSeries {
        let values = (0..n)
            .map(|i| {
                let t = i as f64;
                5.0 + 0.01 * t + 0.3 * (t * 2.1).sin() + 0.2 * (t * 0.77).cos()
            })
            .collect();
        TimeSeries::new(values, transition)
    }

    fn prepared(n: usize, transition: Option<usize>) -> AnalysisContext {
        let mut ctx = AnalysisContext::new(noisy_series(n, transition)).unwrap();
        ctx.detrend(DetrendMethod::Lowess, 0.2).unwrap();
        ctx.compute_spectrum(0.5, 40).unwrap();
        ctx
    }

    #[test]
    fn test_transition_out_of_range() {
        let err = AnalysisContext::new(noisy_series(10, Some(10))).unwrap_err();
        assert_eq!(
            err,
            PreprocessingError::TransitionOutOfRange {
                transition: 10,
                len: 10
            }
        );
    }

    #[test]
    fn test_detrend_columns() {
        let ctx = prepared(200, Some(149));
        let d = ctx.decomposition().unwrap();
        assert_eq!(d.state.len(), 200);
        assert_eq!(d.residuals.len(), 200);
        assert!(d.residuals[..150].iter().all(|v| v.is_finite()));
        assert!(d.residuals[150..].iter().all(|v| v.is_nan()));
        for i in 0..150 {
            assert!((d.state[i] - d.smoothing[i] - d.residuals[i]).abs() < 1e-12);
        }
        assert_eq!(ctx.residuals().len(), 150);
    }

    #[test]
    fn test_detrend_twice_rejected() {
        let mut ctx = prepared(100, None);
        assert_eq!(
            ctx.detrend(DetrendMethod::Lowess, 0.2),
            Err(PreprocessingError::AlreadyDetrended)
        );
    }

    #[test]
    fn test_detrend_validates_span() {
        let mut ctx = AnalysisContext::new(noisy_series(100, None)).unwrap();
        assert!(matches!(
            ctx.detrend(DetrendMethod::Gaussian, 0.0),
            Err(PreprocessingError::InvalidFraction { what: "span", .. })
        ));
        // A failed call leaves the context undetrended.
        assert!(ctx.decomposition().is_none());
        ctx.detrend(DetrendMethod::Gaussian, 0.1).unwrap();
    }

    #[test]
    fn test_detrend_too_short() {
        let mut ctx = AnalysisContext::new(TimeSeries::new(vec![1.0, 2.0], None)).unwrap();
        assert!(matches!(
            ctx.detrend(DetrendMethod::Lowess, 0.5),
            Err(PreprocessingError::InsufficientData { .. })
        ));
    }

    #[test]
    fn test_spectrum_frames() {
        let ctx = prepared(200, None);
        let spec = ctx.spectrum().unwrap();
        // window 100: frames end at 99, 119, ..., 199
        let times: Vec<usize> = spec.frames.iter().map(|f| f.time).collect();
        assert_eq!(times, vec![99, 119, 139, 159, 179, 199]);
        assert!(spec.frames.iter().all(|f| f.points.len() == 40));
    }

    #[test]
    fn test_spectrum_window_too_small() {
        let mut ctx = AnalysisContext::new(noisy_series(3, None)).unwrap();
        assert!(ctx.compute_spectrum(0.5, 40).is_err());
    }

    #[test]
    fn test_indicators_have_analysed_length() {
        let ctx = prepared(300, Some(199));
        for ind in [
            ctx.compute_var(0.5).unwrap(),
            ctx.compute_cv(0.25).unwrap(),
            ctx.compute_skew(0.5).unwrap(),
            ctx.compute_kurt(0.25).unwrap(),
            ctx.compute_auto(0.5, 1).unwrap(),
            ctx.compute_smax().unwrap(),
        ] {
            assert_eq!(ind.values.len(), 200, "{}", ind.name);
            assert!(ind.defined() > 0, "{}", ind.name);
        }
    }

    #[test]
    fn test_variance_warmup_is_nan() {
        let ctx = prepared(100, None);
        let var = ctx.compute_var(0.5).unwrap();
        assert!(var.values[..49].iter().all(|v| v.is_nan()));
        assert!(var.values[49..].iter().all(|v| *v > 0.0));
    }

    #[test]
    fn test_smax_requires_spectrum() {
        let mut ctx = AnalysisContext::new(noisy_series(100, None)).unwrap();
        ctx.detrend(DetrendMethod::Lowess, 0.2).unwrap();
        assert_eq!(ctx.compute_smax(), Err(StatsError::SpectrumMissing));
    }

    #[test]
    fn test_estimators_before_detrend_use_state() {
        let ctx = AnalysisContext::new(noisy_series(100, None)).unwrap();
        assert_eq!(ctx.residuals(), ctx.series().values());
        assert!(ctx.compute_var(0.5).is_ok());
    }

    #[test]
    fn test_ktau() {
        let ctx = prepared(100, None);
        let mut table = IndicatorTable::new();
        table.insert(Indicator::new("up", (0..100).map(f64::from).collect()));
        table.insert(Indicator::new("down", (0..100).map(|i| -f64::from(i)).collect()));

        let taus = ctx.compute_ktau(&table, None, None).unwrap();
        assert_eq!(taus.len(), 2);
        assert_eq!(taus[0].indicator, "up");
        assert!((taus[0].tau - 1.0).abs() < 1e-12);
        assert!((taus[1].tau + 1.0).abs() < 1e-12);

        let windowed = ctx.compute_ktau(&table, Some(10), Some(20)).unwrap();
        assert!((windowed[0].tau - 1.0).abs() < 1e-12);

        assert!(ctx.compute_ktau(&table, Some(50), Some(10)).is_err());
    }

    #[test]
    fn test_estimators_do_not_mutate_context() {
        let ctx = prepared(150, None);
        let before = ctx.residual_column();
        for _ in 0..3 {
            ctx.compute_var(0.5).unwrap();
            ctx.compute_auto(0.5, 1).unwrap();
        }
        let after = ctx.residual_column();
        assert_eq!(
            before.iter().map(|v| v.to_bits()).collect::<Vec<_>>(),
            after.iter().map(|v| v.to_bits()).collect::<Vec<_>>()
        );
    }
}
