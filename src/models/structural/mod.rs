//! Bayesian structural time-series forecaster.
//!
//! A local linear trend plus a dummy seasonal component, with the four noise
//! scales inferred by variational inference. Forecasts are posterior
//! predictive mixtures over draws from the fitted surrogate.
//!
//! # Example
//!
//! ```
//! use realty_forecast::models::structural::{StructuralConfig, StructuralForecaster};
//!
//! let series: Vec<f64> = (0..36)
//!     .map(|t| 100.0 + t as f64 + 4.0 * (t as f64 * std::f64::consts::PI / 6.0).sin())
//!     .collect();
//!
//! let config = StructuralConfig::new().with_variational_steps(20).with_seed(7);
//! let mut model = StructuralForecaster::new(config);
//! model.fit(&series).unwrap();
//!
//! let bundle = model.forecast(6, 10).unwrap();
//! assert_eq!(bundle.horizon(), 6);
//! assert_eq!(bundle.num_samples(), 10);
//! ```

pub mod state_space;
pub mod variational;

pub use state_space::{LocalTrendSeasonal, NoiseScales, StateEstimate};
pub use variational::{ScalePriors, VariationalPosterior};

use crate::core::ForecastBundle;
use crate::error::{ForecastError, Result};
use crate::utils::bootstrap::seeded_rng;
use crate::utils::stats::population_std_dev;
use rand::rngs::StdRng;
use rand::Rng;
use tracing::{debug, info};

/// Configuration for [`StructuralForecaster`].
#[derive(Debug, Clone)]
pub struct StructuralConfig {
    /// Seasonal period (default: 12).
    pub num_seasons: usize,
    /// Adam steps for the variational fit (default: 200).
    pub variational_steps: usize,
    /// Adam learning rate (default: 0.1).
    pub learning_rate: f64,
    /// Posterior parameter draws used for forecasting (default: series length).
    pub num_posterior_draws: Option<usize>,
    /// Random seed for reproducibility (None for random).
    pub seed: Option<u64>,
}

impl Default for StructuralConfig {
    fn default() -> Self {
        Self {
            num_seasons: 12,
            variational_steps: 200,
            learning_rate: 0.1,
            num_posterior_draws: None,
            seed: None,
        }
    }
}

impl StructuralConfig {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_num_seasons(mut self, num_seasons: usize) -> Self {
        self.num_seasons = num_seasons;
        self
    }

    pub fn with_variational_steps(mut self, steps: usize) -> Self {
        self.variational_steps = steps;
        self
    }

    pub fn with_learning_rate(mut self, learning_rate: f64) -> Self {
        self.learning_rate = learning_rate;
        self
    }

    pub fn with_posterior_draws(mut self, draws: usize) -> Self {
        self.num_posterior_draws = Some(draws);
        self
    }

    pub fn with_seed(mut self, seed: u64) -> Self {
        self.seed = Some(seed);
        self
    }

    pub fn validate(&self) -> Result<()> {
        if self.num_seasons < 2 {
            return Err(ForecastError::InvalidParameter(
                "num_seasons must be at least 2".to_string(),
            ));
        }
        if self.variational_steps == 0 {
            return Err(ForecastError::InvalidParameter(
                "variational_steps must be at least 1".to_string(),
            ));
        }
        if !(self.learning_rate > 0.0 && self.learning_rate.is_finite()) {
            return Err(ForecastError::InvalidParameter(format!(
                "learning_rate must be positive, got {}",
                self.learning_rate
            )));
        }
        if self.num_posterior_draws == Some(0) {
            return Err(ForecastError::InvalidParameter(
                "num_posterior_draws must be at least 1".to_string(),
            ));
        }
        Ok(())
    }
}

/// One posterior draw conditioned on the training series.
#[derive(Debug, Clone)]
struct PosteriorDraw {
    model: LocalTrendSeasonal,
    next_state: StateEstimate,
    factor: Vec<Vec<f64>>,
}

#[derive(Debug, Clone)]
struct FittedState {
    posterior: VariationalPosterior,
    loss_curve: Vec<f64>,
    draws: Vec<PosteriorDraw>,
    n_obs: usize,
}

/// Trend + seasonal forecaster fit by variational inference.
///
/// Each call to [`fit`](Self::fit) starts from scratch on the given series;
/// there is no incremental update. The random generator is reseeded at every
/// fit, so equal seeds and inputs give identical forecasts.
#[derive(Debug, Clone)]
pub struct StructuralForecaster {
    config: StructuralConfig,
    rng: StdRng,
    fitted: Option<FittedState>,
}

impl StructuralForecaster {
    pub fn new(config: StructuralConfig) -> Self {
        let rng = seeded_rng(config.seed);
        Self {
            config,
            rng,
            fitted: None,
        }
    }

    pub fn config(&self) -> &StructuralConfig {
        &self.config
    }

    pub fn is_fitted(&self) -> bool {
        self.fitted.is_some()
    }

    /// Negative ELBO per optimisation step of the last fit.
    pub fn loss_curve(&self) -> Option<&[f64]> {
        self.fitted.as_ref().map(|f| f.loss_curve.as_slice())
    }

    pub fn posterior(&self) -> Option<&VariationalPosterior> {
        self.fitted.as_ref().map(|f| &f.posterior)
    }

    /// Noise scales at the surrogate means.
    pub fn posterior_mean_scales(&self) -> Option<NoiseScales> {
        let posterior = self.posterior()?;
        let mut values = [0.0; 4];
        for (v, loc) in values.iter_mut().zip(&posterior.loc) {
            *v = loc.exp();
        }
        Some(NoiseScales::from_array(values))
    }

    /// Fit the model to an observed series.
    ///
    /// Requires at least two full seasonal cycles of finite values.
    pub fn fit(&mut self, series: &[f64]) -> Result<()> {
        self.config.validate()?;
        let needed = 2 * self.config.num_seasons;
        if series.len() < needed {
            return Err(ForecastError::InsufficientData {
                needed,
                got: series.len(),
            });
        }
        if series.iter().any(|v| !v.is_finite()) {
            return Err(ForecastError::MissingValues);
        }

        self.rng = seeded_rng(self.config.seed);
        self.fitted = None;

        let spread = match population_std_dev(series) {
            s if s > 0.0 && s.is_finite() => s,
            _ => 1.0,
        };
        let num_seasons = self.config.num_seasons;
        let priors = ScalePriors::for_spread(spread)?;
        let prior_model = LocalTrendSeasonal::new(num_seasons, priors.scales(&priors.locs()));
        let initial = prior_model.initial_state(series[0], spread);

        let fit = variational::fit_surrogate(
            series,
            num_seasons,
            &initial,
            &priors,
            self.config.variational_steps,
            self.config.learning_rate,
            &mut self.rng,
        );

        let n_draws = self.config.num_posterior_draws.unwrap_or(series.len());
        let mut draws = Vec::with_capacity(n_draws);
        for _ in 0..n_draws {
            let log_scales = fit.posterior.sample_log_scales(&mut self.rng);
            let model = LocalTrendSeasonal::new(num_seasons, priors.scales(&log_scales));
            let next_state = model.filter(series, initial.clone()).next_state;
            let factor = model.state_factor(&next_state);
            draws.push(PosteriorDraw {
                model,
                next_state,
                factor,
            });
        }

        info!(
            n_obs = series.len(),
            steps = self.config.variational_steps,
            final_loss = fit.loss_curve.last().copied().unwrap_or(f64::NAN),
            draws = n_draws,
            "structural model fit"
        );
        debug!(loc = ?fit.posterior.loc, scale = ?fit.posterior.scale, "variational posterior");

        self.fitted = Some(FittedState {
            posterior: fit.posterior,
            loss_curve: fit.loss_curve,
            draws,
            n_obs: series.len(),
        });
        Ok(())
    }

    /// Posterior predictive forecast for `steps` future periods.
    ///
    /// `point` is the mixture mean over posterior draws, `scale` the mixture
    /// standard deviation, and each of the `num_samples` paths is simulated
    /// from a randomly chosen draw.
    pub fn forecast(&mut self, steps: usize, num_samples: usize) -> Result<ForecastBundle> {
        let fitted = self.fitted.as_ref().ok_or(ForecastError::FitRequired)?;
        if steps == 0 {
            return Ok(ForecastBundle::empty(num_samples));
        }

        let n_draws = fitted.draws.len();
        let mut first = vec![0.0; steps];
        let mut second = vec![0.0; steps];
        for draw in &fitted.draws {
            let moments = draw.model.forecast_moments(&draw.next_state, steps);
            for (k, (mean, var)) in moments.into_iter().enumerate() {
                first[k] += mean;
                second[k] += var + mean * mean;
            }
        }
        let point: Vec<f64> = first.iter().map(|s| s / n_draws as f64).collect();
        let scale: Vec<f64> = second
            .iter()
            .zip(&point)
            .map(|(s, m)| (s / n_draws as f64 - m * m).max(0.0).sqrt())
            .collect();

        let mut samples = Vec::with_capacity(num_samples);
        for _ in 0..num_samples {
            let draw = &fitted.draws[self.rng.gen_range(0..n_draws)];
            samples.push(
                draw.model
                    .simulate(&draw.next_state.mean, &draw.factor, steps, &mut self.rng),
            );
        }

        debug!(steps, num_samples, n_obs = fitted.n_obs, "structural forecast");
        ForecastBundle::new(point, scale, samples)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::f64::consts::PI;

    fn truth(t: usize) -> f64 {
        200.0 + 0.5 * t as f64 + 5.0 * (2.0 * PI * t as f64 / 12.0).sin()
    }

    #[test]
    fn forecast_requires_fit() {
        let mut model = StructuralForecaster::new(StructuralConfig::default());
        assert_eq!(model.forecast(3, 5).unwrap_err(), ForecastError::FitRequired);
    }

    #[test]
    fn short_series_is_rejected() {
        let mut model = StructuralForecaster::new(StructuralConfig::default());
        let series: Vec<f64> = (0..23).map(truth).collect();
        assert_eq!(
            model.fit(&series).unwrap_err(),
            ForecastError::InsufficientData { needed: 24, got: 23 }
        );
        assert!(!model.is_fitted());
    }

    #[test]
    fn non_finite_series_is_rejected() {
        let mut model = StructuralForecaster::new(StructuralConfig::default());
        let mut series: Vec<f64> = (0..30).map(truth).collect();
        series[10] = f64::NAN;
        assert_eq!(model.fit(&series).unwrap_err(), ForecastError::MissingValues);
    }

    #[test]
    fn recovers_noiseless_trend_and_season() {
        let series: Vec<f64> = (0..48).map(truth).collect();
        let config = StructuralConfig::new().with_seed(42);
        let mut model = StructuralForecaster::new(config);
        model.fit(&series).unwrap();
        assert_eq!(model.loss_curve().unwrap().len(), 200);

        let bundle = model.forecast(6, 20).unwrap();
        for k in 0..6 {
            let expected = truth(48 + k);
            assert!((bundle.point()[k] - expected).abs() < 0.01 * expected);
            assert!(bundle.scale()[k] >= 0.0);
        }
        assert_eq!(bundle.samples().len(), 20);
        assert!(bundle.samples().iter().all(|s| s.len() == 6));
    }

    #[test]
    fn equal_seeds_give_identical_forecasts() {
        let series: Vec<f64> = (0..30).map(truth).collect();
        let config = StructuralConfig::new()
            .with_variational_steps(15)
            .with_posterior_draws(5)
            .with_seed(9);
        let mut a = StructuralForecaster::new(config.clone());
        let mut b = StructuralForecaster::new(config);
        a.fit(&series).unwrap();
        b.fit(&series).unwrap();
        assert_eq!(a.forecast(4, 8).unwrap(), b.forecast(4, 8).unwrap());
    }

    #[test]
    fn zero_steps_gives_empty_bundle() {
        let series: Vec<f64> = (0..24).map(truth).collect();
        let mut model =
            StructuralForecaster::new(StructuralConfig::new().with_variational_steps(5).with_seed(1));
        model.fit(&series).unwrap();
        let bundle = model.forecast(0, 4).unwrap();
        assert!(bundle.is_empty());
        assert_eq!(bundle.num_samples(), 4);
    }
}
