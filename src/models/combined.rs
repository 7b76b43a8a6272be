//! Combined rolling forecaster.
//!
//! For each window the regression ensemble and the structural model both
//! forecast the short horizon; their outputs are blended with fixed weights.
//! The structural model is then refit on the history extended by the blended
//! path and supplies the remaining steps up to the full horizon.

use crate::config::ForecastConfig;
use crate::core::{FeatureMatrix, ForecastBundle, Frame};
use crate::error::{ForecastError, Result};
use crate::models::regression_ensemble::{HorizonDiagnostics, RollingRegression};
use crate::models::structural::StructuralForecaster;
use crate::utils::metrics::{overlap_metrics, AccuracyMetrics};
use crate::utils::split::{rolling_split, SplitSpec};
use tracing::{debug, info, warn};

/// Forecast for one rolling-origin window.
#[derive(Debug, Clone, PartialEq)]
pub struct WindowForecast {
    /// Group index in the split.
    pub group: usize,
    /// Number of training rows; the forecast starts at this row.
    pub origin: usize,
    pub bundle: ForecastBundle,
    /// Point accuracy over the test rows that exist.
    pub metrics: Option<AccuracyMetrics>,
}

/// Regression + structural forecaster over a configured dataset.
#[derive(Debug, Clone)]
pub struct RollingCombined {
    config: ForecastConfig,
    x: FeatureMatrix,
    y: Vec<f64>,
}

impl RollingCombined {
    /// Bind a configuration to a frame.
    ///
    /// Fails with `MissingColumn` if the target or any feature is absent.
    pub fn new(frame: &Frame, config: ForecastConfig) -> Result<Self> {
        config.validate()?;
        frame.require_columns(&[config.target_column.as_str()])?;
        let x = frame.select(&config.feature_column_names)?;
        let y = frame.column(&config.target_column)?.to_vec();
        Ok(Self { config, x, y })
    }

    /// Bind a configuration to an already assembled matrix and target.
    pub fn from_parts(x: FeatureMatrix, y: Vec<f64>, config: ForecastConfig) -> Result<Self> {
        config.validate()?;
        if x.n_rows() != y.len() {
            return Err(ForecastError::DimensionMismatch {
                expected: y.len(),
                got: x.n_rows(),
            });
        }
        Ok(Self { config, x, y })
    }

    pub fn config(&self) -> &ForecastConfig {
        &self.config
    }

    pub fn features(&self) -> &FeatureMatrix {
        &self.x
    }

    pub fn target(&self) -> &[f64] {
        &self.y
    }

    /// Forecast `predict_horizon_total` steps after the end of `(x, y)`.
    ///
    /// Scales of the blended segment are combined linearly and sample paths
    /// are paired by rank, which assumes the two components are perfectly
    /// correlated. For independent components the combined spread is
    /// overstated. When the total horizon equals the short horizon the
    /// structural model is not refit.
    pub fn make_prediction(&self, x: &FeatureMatrix, y: &[f64]) -> Result<ForecastBundle> {
        let short = self.config.prediction_horizon;
        let total = self.config.predict_horizon_total;
        let num_samples = self.config.num_bootstrap_samples;
        let (w_reg, w_ts) = self.config.blend_weights;

        let mut regression = RollingRegression::new(self.config.regression_config());
        let reg_bundle = regression.fit_predict(x, y)?.bundle()?;

        let mut structural = StructuralForecaster::new(self.config.structural_config());
        structural.fit(y)?;
        let ts_bundle = structural.forecast(short, num_samples)?;

        let blended = reg_bundle.blend(&ts_bundle, w_reg, w_ts)?;
        if blended.point().iter().any(|v| v.is_nan()) {
            warn!("blended forecast contains NaN");
        }
        debug!(
            regression = ?reg_bundle.point(),
            structural = ?ts_bundle.point(),
            w_reg,
            w_ts,
            "short horizon blend"
        );

        if total == short {
            return Ok(blended);
        }

        let mut extended = y.to_vec();
        extended.extend_from_slice(blended.point());
        structural.fit(&extended)?;
        let tail = structural.forecast(total - short, num_samples)?;

        blended.concat(&tail)
    }

    /// Train/test diagnostics of the regression ensemble on the bound
    /// dataset, holding out the last `test_size` share of each horizon's rows.
    pub fn regression_diagnostics(&self, test_size: f64) -> Result<Vec<HorizonDiagnostics>> {
        RollingRegression::new(self.config.regression_config()).diagnostics(
            &self.x,
            &self.y,
            test_size,
        )
    }

    /// Rolling-origin forecasts for groups `[start_group, end_group)` of the
    /// bound dataset, one window per `predict_horizon_total` rows.
    pub fn rolling_prediction(
        &self,
        start_group: usize,
        end_group: usize,
    ) -> Result<Vec<WindowForecast>> {
        let split = rolling_split(
            self.y.len(),
            SplitSpec::WindowLength(self.config.predict_horizon_total),
        )?;
        split.check_group_range(start_group, end_group)?;

        let mut windows = Vec::with_capacity(end_group - start_group);
        for group in start_group..end_group {
            let fold = split.fold(group)?;
            let bundle = self.make_prediction(&fold.train_rows(&self.x)?, fold.train_slice(&self.y))?;
            let metrics = overlap_metrics(fold.test_slice(&self.y), bundle.point());
            if metrics.is_none() {
                warn!(group, "no test rows for window, skipping metrics");
            }
            info!(
                group,
                origin = fold.train.end,
                mse = metrics.map(|m| m.mse),
                "combined window done"
            );
            windows.push(WindowForecast {
                group,
                origin: fold.train.end,
                bundle,
                metrics,
            });
        }
        Ok(windows)
    }
}
