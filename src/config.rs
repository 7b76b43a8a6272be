//! Run configuration for the combined forecaster.
//!
//! Loadable from JSON; unspecified fields take their defaults.
//!
//! # Example
//!
//! ```
//! use realty_forecast::config::ForecastConfig;
//! use realty_forecast::regression::ModelKind;
//!
//! let config = ForecastConfig::from_json(
//!     r#"{
//!         "target_column": "count_sale",
//!         "feature_column_names": ["count_sale", "count_list"],
//!         "modelName": "tree",
//!         "blend_weights": [0.7, 0.3]
//!     }"#,
//! )
//! .unwrap();
//!
//! assert_eq!(config.model_name, ModelKind::Tree);
//! assert_eq!(config.prediction_horizon, 3);
//! assert_eq!(config.predict_horizon_total, 6);
//! ```

use crate::error::{ForecastError, Result};
use crate::models::structural::StructuralConfig;
use crate::models::RegressionConfig;
use crate::regression::{LassoCvConfig, ModelKind};
use serde::{Deserialize, Serialize};
use std::path::Path;

/// All options of a forecasting run.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ForecastConfig {
    /// Short horizon covered by the regression ensemble.
    pub prediction_horizon: usize,
    /// Full forecast length; the remainder comes from the structural model.
    pub predict_horizon_total: usize,
    /// Column to forecast.
    pub target_column: String,
    /// Regression inputs, in order.
    pub feature_column_names: Vec<String>,
    /// Regress on differences rather than raw future values.
    pub lead_target: bool,
    /// Final regressor after feature selection.
    #[serde(alias = "modelName")]
    pub model_name: ModelKind,
    /// `(regression, structural)` weights of the short-horizon blend. Their
    /// sum is not checked.
    pub blend_weights: (f64, f64),
    /// Warm-up rows skipped when training the regressions.
    pub start_fit: usize,
    /// Bootstrap resamples, also used as the structural sample-path count.
    pub num_bootstrap_samples: usize,
    /// Adam steps of the variational fit.
    pub variational_steps: usize,
    /// Adam learning rate of the variational fit.
    pub learning_rate: f64,
    /// Seed for every random draw; entropy when absent.
    pub seed: Option<u64>,
    /// Penalties on the lasso path.
    pub lasso_alphas: usize,
    /// Lasso cross-validation folds.
    pub lasso_folds: usize,
}

impl Default for ForecastConfig {
    fn default() -> Self {
        Self {
            prediction_horizon: 3,
            predict_horizon_total: 6,
            target_column: String::new(),
            feature_column_names: Vec::new(),
            lead_target: true,
            model_name: ModelKind::Linear,
            blend_weights: (0.5, 0.5),
            start_fit: 3,
            num_bootstrap_samples: 50,
            variational_steps: 200,
            learning_rate: 0.1,
            seed: None,
            lasso_alphas: 100,
            lasso_folds: 5,
        }
    }
}

impl ForecastConfig {
    pub fn new(target_column: &str, feature_column_names: Vec<String>) -> Self {
        Self {
            target_column: target_column.to_string(),
            feature_column_names,
            ..Default::default()
        }
    }

    pub fn with_horizons(mut self, prediction_horizon: usize, predict_horizon_total: usize) -> Self {
        self.prediction_horizon = prediction_horizon;
        self.predict_horizon_total = predict_horizon_total;
        self
    }

    pub fn with_model_name(mut self, model_name: ModelKind) -> Self {
        self.model_name = model_name;
        self
    }

    pub fn with_lead_target(mut self, lead_target: bool) -> Self {
        self.lead_target = lead_target;
        self
    }

    pub fn with_blend_weights(mut self, w_regression: f64, w_structural: f64) -> Self {
        self.blend_weights = (w_regression, w_structural);
        self
    }

    pub fn with_start_fit(mut self, start_fit: usize) -> Self {
        self.start_fit = start_fit;
        self
    }

    pub fn with_num_bootstrap_samples(mut self, n: usize) -> Self {
        self.num_bootstrap_samples = n;
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

    pub fn with_seed(mut self, seed: u64) -> Self {
        self.seed = Some(seed);
        self
    }

    pub fn with_lasso(mut self, alphas: usize, folds: usize) -> Self {
        self.lasso_alphas = alphas;
        self.lasso_folds = folds;
        self
    }

    /// Parse a JSON document.
    pub fn from_json(json: &str) -> Result<Self> {
        let config: Self = serde_json::from_str(json)?;
        config.validate()?;
        Ok(config)
    }

    /// Read and parse a JSON file.
    pub fn from_json_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();
        let text = std::fs::read_to_string(path).map_err(|e| {
            ForecastError::DataFormat(format!("cannot read {}: {}", path.display(), e))
        })?;
        Self::from_json(&text)
    }

    pub fn to_json(&self) -> Result<String> {
        Ok(serde_json::to_string_pretty(self)?)
    }

    pub fn validate(&self) -> Result<()> {
        let invalid = |msg: String| Err(ForecastError::InvalidParameter(msg));
        if self.prediction_horizon == 0 {
            return invalid("prediction_horizon must be at least 1".to_string());
        }
        if self.predict_horizon_total < self.prediction_horizon {
            return invalid(format!(
                "predict_horizon_total ({}) must be at least prediction_horizon ({})",
                self.predict_horizon_total, self.prediction_horizon
            ));
        }
        if self.target_column.is_empty() {
            return invalid("target_column must be set".to_string());
        }
        if self.feature_column_names.is_empty() {
            return invalid("feature_column_names must not be empty".to_string());
        }
        if self.num_bootstrap_samples == 0 {
            return invalid("num_bootstrap_samples must be at least 1".to_string());
        }
        if self.variational_steps == 0 {
            return invalid("variational_steps must be at least 1".to_string());
        }
        if !(self.learning_rate > 0.0 && self.learning_rate.is_finite()) {
            return invalid(format!("learning_rate must be positive, got {}", self.learning_rate));
        }
        if !(self.blend_weights.0.is_finite() && self.blend_weights.1.is_finite()) {
            return invalid("blend_weights must be finite".to_string());
        }
        Ok(())
    }

    /// Settings of the regression ensemble.
    pub fn regression_config(&self) -> RegressionConfig {
        RegressionConfig {
            prediction_horizon: self.prediction_horizon,
            model_kind: self.model_name,
            lead_target: self.lead_target,
            start_fit: self.start_fit,
            num_samples: self.num_bootstrap_samples,
            seed: self.seed,
            lasso: LassoCvConfig::new()
                .with_n_alphas(self.lasso_alphas)
                .with_folds(self.lasso_folds),
            ..Default::default()
        }
    }

    /// Settings of the structural model. Its seed is offset from the run
    /// seed so the two components draw independent streams.
    pub fn structural_config(&self) -> StructuralConfig {
        StructuralConfig {
            variational_steps: self.variational_steps,
            learning_rate: self.learning_rate,
            seed: self.seed.map(|s| s.wrapping_add(1)),
            ..Default::default()
        }
    }
}
