//! Mean-field variational inference over the log noise scales.
//!
//! Each log scale `u_i` gets a Gaussian surrogate `N(loc_i, exp(rho_i)^2)`.
//! The ELBO is estimated with a single reparameterised draw per step,
//! `u = loc + exp(rho) * eps`, and maximised with Adam for a fixed number of
//! steps. Gradients of the log joint are taken by central differences, which
//! is cheap for four parameters.

use crate::error::{ForecastError, Result};
use crate::models::structural::state_space::{LocalTrendSeasonal, NoiseScales, StateEstimate};
use crate::utils::optimization::{central_difference, minimize_adam, AdamConfig};
use rand::Rng;
use rand_distr::StandardNormal;
use statrs::distribution::{Continuous, Normal};
use std::f64::consts::PI;

/// Number of variational parameters per surrogate (one per noise term).
pub const NUM_PARAMS: usize = 4;

/// Initial surrogate standard deviation on the log scale.
const INITIAL_SURROGATE_SCALE: f64 = 0.1;
/// Noise scales never fall below this fraction of the series spread.
const SCALE_FLOOR: f64 = 1e-4;
/// Upper clamp on the noise scales, as a multiple of the series spread.
const SCALE_CEILING: f64 = 1e4;
const GRADIENT_STEP: f64 = 1e-4;

/// Log-normal priors on the noise scales, expressed as Normal priors on
/// their logarithms.
#[derive(Debug, Clone)]
pub struct ScalePriors {
    locs: Vec<f64>,
    priors: Vec<Normal>,
    spread: f64,
}

impl ScalePriors {
    /// Priors centred on small fractions of the observed spread: observation
    /// noise at 1%, level and slope drift at 5%, seasonal drift at 1%.
    pub fn for_spread(spread: f64) -> Result<Self> {
        let specs = [(0.01, 2.0), (0.05, 3.0), (0.05, 3.0), (0.01, 3.0)];
        let locs: Vec<f64> = specs.iter().map(|&(f, _)| (f * spread).ln()).collect();
        let priors = specs
            .iter()
            .zip(&locs)
            .map(|(&(_, width), &loc)| {
                Normal::new(loc, width).map_err(|e| ForecastError::ComputationError(e.to_string()))
            })
            .collect::<Result<Vec<_>>>()?;
        Ok(Self {
            locs,
            priors,
            spread,
        })
    }

    /// Prior means on the log scale, used to initialise the surrogate.
    pub fn locs(&self) -> Vec<f64> {
        self.locs.clone()
    }

    pub fn log_density(&self, log_scales: &[f64]) -> f64 {
        self.priors
            .iter()
            .zip(log_scales)
            .map(|(p, &u)| p.ln_pdf(u))
            .sum()
    }

    /// Map log scales to noise scales, clamped relative to the spread.
    pub fn scales(&self, log_scales: &[f64]) -> NoiseScales {
        let lo = SCALE_FLOOR * self.spread;
        let hi = SCALE_CEILING * self.spread;
        let mut values = [0.0; NUM_PARAMS];
        for (v, &u) in values.iter_mut().zip(log_scales) {
            *v = u.exp().clamp(lo, hi);
        }
        NoiseScales::from_array(values)
    }
}

/// Factored Gaussian posterior over the log noise scales.
#[derive(Debug, Clone, PartialEq)]
pub struct VariationalPosterior {
    /// Surrogate means of the log scales.
    pub loc: Vec<f64>,
    /// Surrogate standard deviations of the log scales.
    pub scale: Vec<f64>,
}

impl VariationalPosterior {
    /// Draw one set of log scales.
    pub fn sample_log_scales<R: Rng>(&self, rng: &mut R) -> Vec<f64> {
        self.loc
            .iter()
            .zip(&self.scale)
            .map(|(m, s)| {
                let eps: f64 = rng.sample(StandardNormal);
                m + s * eps
            })
            .collect()
    }
}

/// Outcome of the optimisation.
#[derive(Debug, Clone)]
pub struct VariationalFit {
    pub posterior: VariationalPosterior,
    /// Negative ELBO estimate at every step.
    pub loss_curve: Vec<f64>,
}

/// Log joint density of the series and the log scales.
pub fn log_joint(
    series: &[f64],
    num_seasons: usize,
    initial: &StateEstimate,
    priors: &ScalePriors,
    log_scales: &[f64],
) -> f64 {
    let model = LocalTrendSeasonal::new(num_seasons, priors.scales(log_scales));
    let ll = model.filter(series, initial.clone()).log_likelihood;
    ll + priors.log_density(log_scales)
}

/// Fit the surrogate by stochastic ELBO maximisation.
pub fn fit_surrogate<R: Rng>(
    series: &[f64],
    num_seasons: usize,
    initial: &StateEstimate,
    priors: &ScalePriors,
    num_steps: usize,
    learning_rate: f64,
    rng: &mut R,
) -> VariationalFit {
    // params = [loc_0..loc_3, rho_0..rho_3]
    let mut start = priors.locs();
    start.extend(std::iter::repeat(INITIAL_SURROGATE_SCALE.ln()).take(NUM_PARAMS));
    let entropy_const = 0.5 * (2.0 * PI * std::f64::consts::E).ln();

    let result = minimize_adam(
        |params: &[f64]| {
            let (loc, rho) = params.split_at(NUM_PARAMS);
            let eps: Vec<f64> = (0..NUM_PARAMS).map(|_| rng.sample(StandardNormal)).collect();
            let sigma: Vec<f64> = rho.iter().map(|r| r.exp()).collect();
            let u: Vec<f64> = (0..NUM_PARAMS).map(|i| loc[i] + sigma[i] * eps[i]).collect();

            let target = |x: &[f64]| log_joint(series, num_seasons, initial, priors, x);
            let value = target(&u);
            let grad_u = central_difference(target, &u, GRADIENT_STEP);

            let entropy: f64 = rho.iter().map(|r| r + entropy_const).sum();
            let loss = -(value + entropy);

            let mut grad = Vec::with_capacity(2 * NUM_PARAMS);
            grad.extend(grad_u.iter().map(|g| -g));
            grad.extend((0..NUM_PARAMS).map(|i| -(grad_u[i] * eps[i] * sigma[i] + 1.0)));
            (loss, grad)
        },
        &start,
        num_steps,
        AdamConfig::new(learning_rate),
    );

    let (loc, rho) = result.optimal_point.split_at(NUM_PARAMS);
    VariationalFit {
        posterior: VariationalPosterior {
            loc: loc.to_vec(),
            scale: rho.iter().map(|r| r.exp()).collect(),
        },
        loss_curve: result.loss_curve,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;
    use rand::rngs::StdRng;
    use rand::SeedableRng;

    #[test]
    fn priors_centre_on_fractions_of_spread() {
        let priors = ScalePriors::for_spread(10.0).unwrap();
        let locs = priors.locs();
        assert_relative_eq!(locs[0], 0.1_f64.ln(), epsilon = 1e-12);
        assert_relative_eq!(locs[1], 0.5_f64.ln(), epsilon = 1e-12);
        let scales = priors.scales(&locs);
        assert_relative_eq!(scales.observation, 0.1, epsilon = 1e-12);
        assert_relative_eq!(scales.seasonal, 0.1, epsilon = 1e-12);
    }

    #[test]
    fn scales_are_clamped() {
        let priors = ScalePriors::for_spread(2.0).unwrap();
        let s = priors.scales(&[-100.0, 100.0, 0.0, 0.0]);
        assert_relative_eq!(s.observation, 2e-4, epsilon = 1e-15);
        assert_relative_eq!(s.level, 2e4, epsilon = 1e-9);
    }

    #[test]
    fn optimisation_reduces_loss() {
        let series: Vec<f64> = (0..36)
            .map(|t| 50.0 + 0.2 * t as f64 + 2.0 * (2.0 * PI * t as f64 / 12.0).cos())
            .collect();
        let spread = crate::utils::stats::population_std_dev(&series);
        let priors = ScalePriors::for_spread(spread).unwrap();
        let model = LocalTrendSeasonal::new(12, priors.scales(&priors.locs()));
        let initial = model.initial_state(series[0], spread);
        let mut rng = StdRng::seed_from_u64(11);

        let fit = fit_surrogate(&series, 12, &initial, &priors, 60, 0.1, &mut rng);
        assert_eq!(fit.loss_curve.len(), 60);
        let early: f64 = fit.loss_curve[..10].iter().sum::<f64>() / 10.0;
        let late: f64 = fit.loss_curve[50..].iter().sum::<f64>() / 10.0;
        assert!(late < early);
        assert!(fit.posterior.scale.iter().all(|s| *s > 0.0));
    }
}
