//! Structural-model-only rolling forecasts, used as a baseline for the
//! combined forecaster.

use crate::error::Result;
use crate::models::combined::WindowForecast;
use crate::models::structural::{StructuralConfig, StructuralForecaster};
use crate::utils::metrics::overlap_metrics;
use crate::utils::split::{rolling_split, SplitSpec};
use tracing::info;

/// Refit the structural model per window and forecast `horizon` steps.
#[derive(Debug, Clone)]
pub struct RollingStructural {
    config: StructuralConfig,
    horizon: usize,
    num_samples: usize,
}

impl RollingStructural {
    pub fn new(config: StructuralConfig, horizon: usize, num_samples: usize) -> Self {
        Self {
            config,
            horizon,
            num_samples,
        }
    }

    /// Forecasts for groups `[start_group, end_group)` with windows of
    /// `horizon` rows; each window is scored on its available test rows.
    pub fn rolling_prediction(
        &self,
        series: &[f64],
        start_group: usize,
        end_group: usize,
    ) -> Result<Vec<WindowForecast>> {
        let split = rolling_split(series.len(), SplitSpec::WindowLength(self.horizon))?;
        split.check_group_range(start_group, end_group)?;

        let mut model = StructuralForecaster::new(self.config.clone());
        let mut windows = Vec::with_capacity(end_group - start_group);
        for group in start_group..end_group {
            let fold = split.fold(group)?;
            model.fit(fold.train_slice(series))?;
            let bundle = model.forecast(self.horizon, self.num_samples)?;
            let metrics = overlap_metrics(fold.test_slice(series), bundle.point());
            info!(
                group,
                origin = fold.train.end,
                mse = metrics.map(|m| m.mse),
                "structural window done"
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

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::ForecastError;

    #[test]
    fn windows_follow_the_split() {
        let series: Vec<f64> = (0..32)
            .map(|t| 20.0 + 0.3 * t as f64 + (t % 12) as f64 * 0.1)
            .collect();
        let config = StructuralConfig::new()
            .with_variational_steps(10)
            .with_posterior_draws(4)
            .with_seed(2);
        let rolling = RollingStructural::new(config, 4, 5);

        // windows of 4: group 6 trains on 28 rows, group 7 on all 32
        let out = rolling.rolling_prediction(&series, 6, 8).unwrap();
        assert_eq!(out.len(), 2);
        assert_eq!(out[0].origin, 28);
        assert_eq!(out[0].bundle.horizon(), 4);
        assert_eq!(out[0].bundle.num_samples(), 5);
        assert_eq!(out[0].metrics.unwrap().n, 4);
        assert!(out[1].metrics.is_none());
    }

    #[test]
    fn early_groups_are_too_short() {
        let series: Vec<f64> = (0..40).map(|t| t as f64).collect();
        let rolling = RollingStructural::new(StructuralConfig::new().with_seed(1), 4, 5);
        assert!(matches!(
            rolling.rolling_prediction(&series, 0, 1),
            Err(ForecastError::InsufficientData { .. })
        ));
    }
}
