//! Synthetic series generator: the Ricker model with a harvesting ramp.
//!
//! The map
//!
//! ```text
//! x[t+1] = x[t] * exp(r (1 - x[t]/k) + eps[t]) - F[t] x[t]^2 / (x[t]^2 + h^2)
//! ```
//!
//! has a fold bifurcation in the harvesting rate `F`. Ramping `F` across the
//! fold produces a series that approaches a critical transition, which is
//! what the EWS estimators are designed to detect.
//!
//! The random source is always supplied by the caller; the generator never
//! touches a global RNG. For a given seed and parameters the output is
//! bit-identical across runs.

use rand::Rng;
use rand_distr::{Distribution, Normal};
use serde::{Deserialize, Serialize};

use crate::constants::{
    RICKER_H, RICKER_K, RICKER_R, RICKER_SIGMA, RICKER_TBURN, RICKER_TMAX, RICKER_X0,
};
use crate::error::GenerationError;
use crate::types::TimeSeries;

/// Number of grid points used to locate the fold of the deterministic map.
const FOLD_GRID: usize = 100_000;

/// Parameters of the stochastic Ricker model.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct RickerParams {
    /// Series length.
    pub tmax: usize,
    /// Burn-in iterations discarded before `x[0]`.
    pub tburn: usize,
    /// Intrinsic growth rate.
    pub r: f64,
    /// Carrying capacity.
    pub k: f64,
    /// Half-saturation constant of the harvesting term.
    pub h: f64,
    /// Harvesting schedule: one value (constant) or `[start, end]` (linear ramp).
    pub f: Vec<f64>,
    /// Standard deviation of the multiplicative noise.
    pub sigma: f64,
    /// Initial condition before burn-in.
    pub x0: f64,
}

impl Default for RickerParams {
    fn default() -> Self {
        Self {
            tmax: RICKER_TMAX,
            tburn: RICKER_TBURN,
            r: RICKER_R,
            k: RICKER_K,
            h: RICKER_H,
            f: vec![0.0, 2.7],
            sigma: RICKER_SIGMA,
            x0: RICKER_X0,
        }
    }
}

/// Output of [`simulate_ricker`].
#[derive(Debug, Clone, PartialEq)]
pub struct Simulation {
    /// The simulated trajectory, with `transition` set to the fold crossing.
    pub series: TimeSeries,
    /// Harvesting rate applied at each step.
    pub forcing: Vec<f64>,
    /// Harvesting rate at which the upper equilibrium disappears.
    pub critical_f: f64,
}

impl Simulation {
    /// Index where the ramp first reaches the fold, if it does.
    pub fn transition(&self) -> Option<usize> {
        self.series.transition()
    }
}

impl RickerParams {
    fn validate(&self) -> Result<(), GenerationError> {
        if self.tmax == 0 {
            return Err(GenerationError::InvalidLength { tmax: self.tmax });
        }
        if self.f.is_empty() || self.f.len() > 2 {
            return Err(GenerationError::MalformedSchedule { len: self.f.len() });
        }
        let scalars = [
            ("r", self.r),
            ("k", self.k),
            ("h", self.h),
            ("sigma", self.sigma),
            ("x0", self.x0),
        ];
        for (name, value) in scalars.into_iter().chain(self.f.iter().map(|&v| ("F", v))) {
            if !value.is_finite() {
                return Err(GenerationError::NonFinite { name, value });
            }
        }
        if self.sigma < 0.0 {
            return Err(GenerationError::NegativeNoise { sigma: self.sigma });
        }
        Ok(())
    }

    /// Harvesting rate at each step (`linspace(F0, F1, tmax)` for a ramp).
    pub fn forcing(&self) -> Vec<f64> {
        match *self.f.as_slice() {
            [start, end] if self.tmax > 1 => {
                let step = (end - start) / (self.tmax - 1) as f64;
                (0..self.tmax).map(|t| start + step * t as f64).collect()
            }
            [start, ..] => vec![start; self.tmax],
            [] => Vec::new(),
        }
    }

    /// One step of the deterministic-plus-noise map, clamped at zero.
    #[inline]
    fn step(&self, x: f64, f: f64, eps: f64) -> f64 {
        let next = x * (self.r * (1.0 - x / self.k) + eps).exp() - f * x * x / (x * x + self.h * self.h);
        next.max(0.0)
    }

    /// Harvesting rate at the upper fold of the deterministic map.
    ///
    /// Positive equilibria satisfy `F = g(x) = (exp(r (1 - x/k)) - 1)(x^2 + h^2) / x`.
    /// The upper branch disappears at the largest local maximum of `g` on
    /// `(0, k)`. Falls back to the global maximum when `g` is monotone there.
    pub fn critical_harvest(&self) -> f64 {
        let g = |x: f64| ((self.r * (1.0 - x / self.k)).exp() - 1.0) * (x * x + self.h * self.h) / x;
        let dx = self.k / FOLD_GRID as f64;

        let mut prev = g(dx);
        let mut curr = g(2.0 * dx);
        let mut fold = None;
        let mut global = prev.max(curr);
        for i in 3..FOLD_GRID {
            let next = g(i as f64 * dx);
            if curr >= prev && curr > next {
                fold = Some(curr);
            }
            global = global.max(next);
            prev = curr;
            curr = next;
        }
        fold.unwrap_or(global)
    }
}

/// Simulate the Ricker model.
///
/// Consumes exactly `tburn + tmax` normal draws from `rng`: the burn-in draws
/// first, then one draw per step of the retained trajectory (the last draw is
/// unused so the consumption order does not depend on the schedule).
///
/// # Errors
///
/// Fails before drawing anything if `tmax == 0`, the schedule does not have
/// one or two values, or a parameter is not finite.
pub fn simulate_ricker<R: Rng + ?Sized>(
    params: &RickerParams,
    rng: &mut R,
) -> Result<Simulation, GenerationError> {
    params.validate()?;

    let forcing = params.forcing();
    let critical_f = params.critical_harvest();

    let noise = Normal::new(0.0, params.sigma).map_err(|_| GenerationError::NegativeNoise {
        sigma: params.sigma,
    })?;
    let burn_in: Vec<f64> = (0..params.tburn).map(|_| noise.sample(rng)).collect();
    let increments: Vec<f64> = (0..params.tmax).map(|_| noise.sample(rng)).collect();

    let mut x0 = params.x0;
    for &eps in &burn_in {
        x0 = params.step(x0, forcing[0], eps);
    }

    let mut values = Vec::with_capacity(params.tmax);
    values.push(x0);
    for t in 0..params.tmax - 1 {
        let next = params.step(values[t], forcing[t], increments[t]);
        values.push(next);
    }

    let transition = forcing.iter().position(|&f| f >= critical_f);

    tracing::debug!(
        tmax = params.tmax,
        critical_f,
        ?transition,
        "simulated ricker series"
    );

    Ok(Simulation {
        series: TimeSeries::new(values, transition),
        forcing,
        critical_f,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::SeedableRng;
    use rand_xoshiro::Xoshiro256PlusPlus;

    fn rng(seed: u64) -> Xoshiro256PlusPlus {
        Xoshiro256PlusPlus::seed_from_u64(seed)
    }

    #[test]
    fn test_reproducible_for_fixed_seed() {
        let params = RickerParams::default();
        let a = simulate_ricker(&params, &mut rng(0)).unwrap();
        let b = simulate_ricker(&params, &mut rng(0)).unwrap();

        let bits_a: Vec<u64> = a.series.values().iter().map(|v| v.to_bits()).collect();
        let bits_b: Vec<u64> = b.series.values().iter().map(|v| v.to_bits()).collect();
        assert_eq!(bits_a, bits_b);
    }

    #[test]
    fn test_different_seeds_differ() {
        let params = RickerParams::default();
        let a = simulate_ricker(&params, &mut rng(0)).unwrap();
        let b = simulate_ricker(&params, &mut rng(1)).unwrap();
        assert_ne!(a.series.values(), b.series.values());
    }

    #[test]
    fn test_length_and_non_negative() {
        let params = RickerParams::default();
        let sim = simulate_ricker(&params, &mut rng(7)).unwrap();
        assert_eq!(sim.series.len(), 1000);
        assert_eq!(sim.forcing.len(), 1000);
        assert!(sim.series.values().iter().all(|&v| v >= 0.0 && v.is_finite()));
    }

    #[test]
    fn test_fold_location() {
        let params = RickerParams::default();
        let fc = params.critical_harvest();
        assert!(fc > 2.3 && fc < 2.4, "critical F = {fc}");

        let sim = simulate_ricker(&params, &mut rng(0)).unwrap();
        let t = sim.transition().expect("ramp crosses the fold");
        assert!(sim.forcing[t] >= fc);
        assert!(sim.forcing[t - 1] < fc);
        assert!((850..900).contains(&t), "transition = {t}");
    }

    #[test]
    fn test_constant_schedule_below_fold_has_no_transition() {
        let params = RickerParams {
            f: vec![1.0],
            ..RickerParams::default()
        };
        let sim = simulate_ricker(&params, &mut rng(0)).unwrap();
        assert!(sim.forcing.iter().all(|&f| f == 1.0));
        assert_eq!(sim.transition(), None);
    }

    #[test]
    fn test_ramp_endpoints() {
        let params = RickerParams::default();
        let forcing = params.forcing();
        assert_eq!(forcing[0], 0.0);
        assert!((forcing[999] - 2.7).abs() < 1e-12);
    }

    #[test]
    fn test_invalid_parameters_fail_fast() {
        let zero = RickerParams {
            tmax: 0,
            ..RickerParams::default()
        };
        assert_eq!(
            simulate_ricker(&zero, &mut rng(0)),
            Err(GenerationError::InvalidLength { tmax: 0 })
        );

        let empty = RickerParams {
            f: vec![],
            ..RickerParams::default()
        };
        assert_eq!(
            simulate_ricker(&empty, &mut rng(0)),
            Err(GenerationError::MalformedSchedule { len: 0 })
        );

        let triple = RickerParams {
            f: vec![0.0, 1.0, 2.0],
            ..RickerParams::default()
        };
        assert_eq!(
            simulate_ricker(&triple, &mut rng(0)),
            Err(GenerationError::MalformedSchedule { len: 3 })
        );

        let nan = RickerParams {
            r: f64::NAN,
            ..RickerParams::default()
        };
        assert!(matches!(
            simulate_ricker(&nan, &mut rng(0)),
            Err(GenerationError::NonFinite { name: "r", .. })
        ));
    }

    #[test]
    fn test_single_point_series() {
        let params = RickerParams {
            tmax: 1,
            ..RickerParams::default()
        };
        let sim = simulate_ricker(&params, &mut rng(0)).unwrap();
        assert_eq!(sim.series.len(), 1);
    }
}
