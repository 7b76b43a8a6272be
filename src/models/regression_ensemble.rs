//! Direct multi-horizon regression ensemble with bootstrap uncertainty.
//!
//! One [`HorizonModel`] per horizon `h = 1..=H`, each trained on its own
//! target: the `h`-step change of the series (lead mode) or the value `h`
//! steps ahead. Nothing is shared between horizons.

use crate::core::{FeatureMatrix, ForecastBundle};
use crate::error::{ForecastError, Result};
use crate::regression::{HorizonModel, LassoCvConfig, ModelKind, TreeConfig};
use crate::utils::bootstrap::{resample_indices, seeded_rng, summarize};
use crate::utils::metrics::{calculate_metrics, overlap_metrics, AccuracyMetrics};
use crate::utils::split::{rolling_split, SplitSpec};
use tracing::{debug, info, warn};

/// Configuration for [`RollingRegression`].
#[derive(Debug, Clone)]
pub struct RegressionConfig {
    /// Number of horizons, one model each (default: 3).
    pub prediction_horizon: usize,
    /// Final regressor after lasso selection (default: linear).
    pub model_kind: ModelKind,
    /// Regress on `y[t+h] - y[t]` instead of `y[t+h]` (default: true).
    pub lead_target: bool,
    /// Leading rows skipped during training (default: 3).
    pub start_fit: usize,
    /// Bootstrap resamples per horizon (default: 50).
    pub num_samples: usize,
    /// Random seed for reproducibility (None for random).
    pub seed: Option<u64>,
    /// Lasso selection settings.
    pub lasso: LassoCvConfig,
    /// Tree settings, used when `model_kind` is `Tree`.
    pub tree: TreeConfig,
}

impl Default for RegressionConfig {
    fn default() -> Self {
        Self {
            prediction_horizon: 3,
            model_kind: ModelKind::Linear,
            lead_target: true,
            start_fit: 3,
            num_samples: 50,
            seed: None,
            lasso: LassoCvConfig::default(),
            tree: TreeConfig::default(),
        }
    }
}

impl RegressionConfig {
    pub fn new(prediction_horizon: usize) -> Self {
        Self {
            prediction_horizon,
            ..Default::default()
        }
    }

    pub fn with_model_kind(mut self, kind: ModelKind) -> Self {
        self.model_kind = kind;
        self
    }

    pub fn with_lead_target(mut self, lead_target: bool) -> Self {
        self.lead_target = lead_target;
        self
    }

    pub fn with_start_fit(mut self, start_fit: usize) -> Self {
        self.start_fit = start_fit;
        self
    }

    pub fn with_num_samples(mut self, num_samples: usize) -> Self {
        self.num_samples = num_samples;
        self
    }

    pub fn with_seed(mut self, seed: u64) -> Self {
        self.seed = Some(seed);
        self
    }

    pub fn with_lasso(mut self, lasso: LassoCvConfig) -> Self {
        self.lasso = lasso;
        self
    }

    pub fn with_tree(mut self, tree: TreeConfig) -> Self {
        self.tree = tree;
        self
    }

    pub fn validate(&self) -> Result<()> {
        if self.prediction_horizon == 0 {
            return Err(ForecastError::InvalidParameter(
                "prediction_horizon must be at least 1".to_string(),
            ));
        }
        if self.num_samples == 0 {
            return Err(ForecastError::InvalidParameter(
                "num_samples must be at least 1".to_string(),
            ));
        }
        self.lasso.validate()
    }
}

/// Target for horizon `h`: `y[t+h] - y[t]` in lead mode, `y[t+h]`
/// otherwise. The last `h` entries have no future value and are NaN.
pub fn horizon_target(y: &[f64], h: usize, lead: bool) -> Vec<f64> {
    (0..y.len())
        .map(|t| match y.get(t + h) {
            Some(future) if lead => future - y[t],
            Some(future) => *future,
            None => f64::NAN,
        })
        .collect()
}

/// Output of [`RollingRegression::fit_predict`] for steps `1..=H`.
#[derive(Debug, Clone, PartialEq)]
pub struct RegressionForecast {
    /// Prediction of the model fit on the full training window.
    pub point: Vec<f64>,
    /// Mean of the bootstrap predictions.
    pub mean: Vec<f64>,
    /// Population standard deviation of the bootstrap predictions.
    pub scale: Vec<f64>,
    /// Bootstrap predictions, `samples[draw][step]`.
    pub samples: Vec<Vec<f64>>,
}

impl RegressionForecast {
    /// Bundle with the bootstrap mean as point estimate.
    pub fn bundle(&self) -> Result<ForecastBundle> {
        ForecastBundle::new(self.mean.clone(), self.scale.clone(), self.samples.clone())
    }
}

/// One rolling-origin window of [`RollingRegression::rolling_prediction`].
#[derive(Debug, Clone)]
pub struct RegressionWindow {
    pub group: usize,
    /// Number of training rows (first test row).
    pub origin: usize,
    pub forecast: RegressionForecast,
    /// Accuracy of `forecast.point` over the available test rows.
    pub metrics: Option<AccuracyMetrics>,
}

/// Concatenated rolling output.
#[derive(Debug, Clone)]
pub struct RollingRegressionResult {
    pub point: Vec<f64>,
    pub scale: Vec<f64>,
    pub windows: Vec<RegressionWindow>,
}

/// Held-out accuracy of one horizon model, see
/// [`RollingRegression::diagnostics`].
#[derive(Debug, Clone, PartialEq)]
pub struct HorizonDiagnostics {
    pub horizon: usize,
    /// Feature names kept by the lasso on the training part.
    pub selected_features: Vec<String>,
    /// In-sample accuracy on the training part.
    pub train: AccuracyMetrics,
    /// Accuracy on the chronologically last rows; None when the test share
    /// rounds to zero rows.
    pub test: Option<AccuracyMetrics>,
    /// Mean squared error of contiguous k-fold CV on the training part.
    pub cv_mse: f64,
}

/// Training rows and target for one horizon.
struct HorizonData {
    x: FeatureMatrix,
    y: Vec<f64>,
    /// Output of an uninformative model for each row, in target units.
    neutral: Vec<f64>,
}

/// Per-horizon regression ensemble.
#[derive(Debug)]
pub struct RollingRegression {
    config: RegressionConfig,
    models: Vec<HorizonModel>,
    train: Option<(FeatureMatrix, Vec<f64>)>,
}

impl RollingRegression {
    pub fn new(config: RegressionConfig) -> Self {
        let models = (1..=config.prediction_horizon)
            .map(|h| Self::horizon_model(&config, h))
            .collect();
        Self {
            config,
            models,
            train: None,
        }
    }

    fn horizon_model(config: &RegressionConfig, h: usize) -> HorizonModel {
        HorizonModel::new(
            h,
            config.model_kind,
            config.lasso.clone(),
            config.tree.clone(),
        )
    }

    pub fn config(&self) -> &RegressionConfig {
        &self.config
    }

    /// Fitted per-horizon models, index `h - 1`.
    pub fn models(&self) -> &[HorizonModel] {
        &self.models
    }

    pub fn is_fitted(&self) -> bool {
        self.train.is_some()
    }

    /// Names of the features each horizon model kept, index `h - 1`.
    pub fn selected_features(&self) -> Result<Vec<Vec<String>>> {
        let (x, _) = self.train.as_ref().ok_or(ForecastError::FitRequired)?;
        Ok(self
            .models
            .iter()
            .map(|m| selected_names(m, x))
            .collect())
    }

    fn horizon_data(&self, x: &FeatureMatrix, y: &[f64], h: usize) -> Result<HorizonData> {
        let n = y.len();
        let start = self.config.start_fit;
        let needed = start + h + 2;
        if n < needed {
            return Err(ForecastError::InsufficientData { needed, got: n });
        }
        let target = horizon_target(y, h, self.config.lead_target);
        let neutral = if self.config.lead_target {
            vec![0.0; n - h - start]
        } else {
            y[start..n - h].to_vec()
        };
        Ok(HorizonData {
            x: x.slice_rows(start, n - h)?,
            y: target[start..n - h].to_vec(),
            neutral,
        })
    }

    fn check_inputs(&self, x: &FeatureMatrix, y: &[f64]) -> Result<()> {
        self.config.validate()?;
        if x.n_rows() != y.len() {
            return Err(ForecastError::DimensionMismatch {
                expected: y.len(),
                got: x.n_rows(),
            });
        }
        Ok(())
    }

    /// Turn a model output on the final row into a forecast value.
    ///
    /// An uninformative model forecasts the last observed value in both
    /// target modes.
    fn to_value(&self, model: &HorizonModel, rows: &FeatureMatrix, y: &[f64]) -> Result<f64> {
        let origin = y.last().copied().ok_or(ForecastError::EmptyData)?;
        if model.is_uninformative() {
            return Ok(origin);
        }
        let raw = model.predict(rows)?;
        let last = raw.last().copied().ok_or(ForecastError::EmptyData)?;
        Ok(if self.config.lead_target {
            last + origin
        } else {
            last
        })
    }

    fn prediction_rows(&self, x: &FeatureMatrix) -> FeatureMatrix {
        x.last_rows(self.config.start_fit.max(1))
    }

    /// Fit every horizon model on the training window `(x, y)`.
    pub fn fit(&mut self, x: &FeatureMatrix, y: &[f64]) -> Result<()> {
        self.check_inputs(x, y)?;
        self.train = None;
        for h in 1..=self.config.prediction_horizon {
            let data = self.horizon_data(x, y, h)?;
            self.models[h - 1].fit(&data.x, &data.y)?;
        }
        self.train = Some((x.clone(), y.to_vec()));
        Ok(())
    }

    /// Point forecasts for steps `1..=H` from the end of the training window.
    pub fn predict(&self) -> Result<Vec<f64>> {
        let (x, y) = self.train.as_ref().ok_or(ForecastError::FitRequired)?;
        let rows = self.prediction_rows(x);
        self.models
            .iter()
            .map(|m| self.to_value(m, &rows, y))
            .collect()
    }

    /// Fit, predict, and estimate uncertainty by refitting each horizon on
    /// bootstrap resamples of its training rows.
    pub fn fit_predict(&mut self, x: &FeatureMatrix, y: &[f64]) -> Result<RegressionForecast> {
        self.fit(x, y)?;
        let point = self.predict()?;

        let mut rng = seeded_rng(self.config.seed);
        let rows = self.prediction_rows(x);
        let horizons = self.config.prediction_horizon;
        let num_samples = self.config.num_samples;
        let mut samples = vec![vec![0.0; horizons]; num_samples];
        let mut mean = Vec::with_capacity(horizons);
        let mut scale = Vec::with_capacity(horizons);

        for h in 1..=horizons {
            let data = self.horizon_data(x, y, h)?;
            let mut draws = Vec::with_capacity(num_samples);
            let mut uninformative = 0;
            for sample in samples.iter_mut() {
                let idx = resample_indices(data.y.len(), &mut rng);
                let xs = data.x.take_rows(&idx)?;
                let ys: Vec<f64> = idx.iter().map(|&i| data.y[i]).collect();
                let mut model = Self::horizon_model(&self.config, h);
                model.fit(&xs, &ys)?;
                if model.is_uninformative() {
                    uninformative += 1;
                }
                let value = self.to_value(&model, &rows, y)?;
                sample[h - 1] = value;
                draws.push(value);
            }
            let summary = summarize(&draws);
            debug!(
                horizon = h,
                point = point[h - 1],
                mean = summary.mean,
                scale = summary.scale,
                uninformative,
                "bootstrap summary"
            );
            mean.push(summary.mean);
            scale.push(summary.scale);
        }

        Ok(RegressionForecast {
            point,
            mean,
            scale,
            samples,
        })
    }

    /// Per-horizon accuracy on a chronological train/test split.
    ///
    /// For every horizon the training rows are split without shuffling, the
    /// last `ceil(test_size * rows)` rows held out. A fresh model is fit on
    /// the training part (standardised on its own statistics) and scored in
    /// target units on both parts. `cv_mse` refits the whole pipeline on
    /// contiguous folds of the training part. Fitted models are untouched.
    pub fn diagnostics(
        &self,
        x: &FeatureMatrix,
        y: &[f64],
        test_size: f64,
    ) -> Result<Vec<HorizonDiagnostics>> {
        self.check_inputs(x, y)?;
        if !(0.0..1.0).contains(&test_size) {
            return Err(ForecastError::InvalidParameter(format!(
                "test_size must be in [0, 1), got {}",
                test_size
            )));
        }

        let mut out = Vec::with_capacity(self.config.prediction_horizon);
        for h in 1..=self.config.prediction_horizon {
            let data = self.horizon_data(x, y, h)?;
            let rows = data.y.len();
            let n_test = (test_size * rows as f64).ceil() as usize;
            let n_train = rows - n_test.min(rows);
            if n_train < 4 {
                return Err(ForecastError::InsufficientData {
                    needed: 4 + n_test,
                    got: rows,
                });
            }

            let train_x = data.x.slice_rows(0, n_train)?;
            let mut model = Self::horizon_model(&self.config, h);
            model.fit(&train_x, &data.y[..n_train])?;
            let fitted = horizon_output(&model, &train_x, &data.neutral[..n_train])?;
            let train = calculate_metrics(&data.y[..n_train], &fitted)?;
            let test = if n_train < rows {
                let test_x = data.x.slice_rows(n_train, rows)?;
                let predicted = horizon_output(&model, &test_x, &data.neutral[n_train..])?;
                Some(calculate_metrics(&data.y[n_train..], &predicted)?)
            } else {
                None
            };
            let cv_mse = self.cv_mse(&train_x, &data.y[..n_train], &data.neutral[..n_train], h)?;

            info!(
                horizon = h,
                r2_train = train.r2,
                r2_test = test.map(|m| m.r2),
                cv_mse,
                "horizon diagnostics"
            );
            out.push(HorizonDiagnostics {
                horizon: h,
                selected_features: selected_names(&model, &train_x),
                train,
                test,
                cv_mse,
            });
        }
        Ok(out)
    }

    /// Contiguous k-fold CV error of a fresh horizon model.
    fn cv_mse(&self, x: &FeatureMatrix, y: &[f64], neutral: &[f64], h: usize) -> Result<f64> {
        let n = y.len();
        let folds = self.config.lasso.folds.min(n / 2).max(2);
        let mut mse = 0.0;
        for f in 0..folds {
            let start = f * n / folds;
            let end = (f + 1) * n / folds;
            let train: Vec<usize> = (0..start).chain(end..n).collect();
            let ys: Vec<f64> = train.iter().map(|&i| y[i]).collect();
            let mut model = Self::horizon_model(&self.config, h);
            model.fit(&x.take_rows(&train)?, &ys)?;
            let held_out = x.slice_rows(start, end)?;
            let predicted = horizon_output(&model, &held_out, &neutral[start..end])?;
            mse += calculate_metrics(&y[start..end], &predicted)?.mse / folds as f64;
        }
        Ok(mse)
    }

    /// Rolling-origin forecasts over groups `[start_group, end_group)`,
    /// with the window length equal to the prediction horizon.
    pub fn rolling_prediction(
        &mut self,
        x: &FeatureMatrix,
        y: &[f64],
        start_group: usize,
        end_group: usize,
    ) -> Result<RollingRegressionResult> {
        self.check_inputs(x, y)?;
        let split = rolling_split(y.len(), SplitSpec::WindowLength(self.config.prediction_horizon))?;
        split.check_group_range(start_group, end_group)?;

        let mut result = RollingRegressionResult {
            point: Vec::new(),
            scale: Vec::new(),
            windows: Vec::with_capacity(end_group - start_group),
        };
        for group in start_group..end_group {
            let fold = split.fold(group)?;
            let forecast = self.fit_predict(&fold.train_rows(x)?, fold.train_slice(y))?;
            let actual = fold.test_slice(y);
            let metrics = overlap_metrics(actual, &forecast.point);
            if metrics.is_none() {
                warn!(group, "no test rows for window, skipping metrics");
            }
            info!(
                group,
                origin = fold.train.end,
                mse = metrics.map(|m| m.mse),
                "regression window done"
            );
            result.point.extend_from_slice(&forecast.point);
            result.scale.extend_from_slice(&forecast.scale);
            result.windows.push(RegressionWindow {
                group,
                origin: fold.train.end,
                forecast,
                metrics,
            });
        }
        Ok(result)
    }
}

/// Model output per row of `x`, with `neutral` standing in when the lasso
/// kept nothing.
fn horizon_output(model: &HorizonModel, x: &FeatureMatrix, neutral: &[f64]) -> Result<Vec<f64>> {
    if model.is_uninformative() {
        return Ok(neutral.to_vec());
    }
    model.predict(x)
}

fn selected_names(model: &HorizonModel, x: &FeatureMatrix) -> Vec<String> {
    model
        .selected()
        .iter()
        .filter_map(|&i| x.names().get(i).cloned())
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    /// Trend plus a month-of-year effect, with the month indicators as
    /// features.
    fn dataset(n: usize) -> (FeatureMatrix, Vec<f64>) {
        let y: Vec<f64> = (0..n)
            .map(|t| 50.0 + 0.5 * t as f64 + [0.0, 2.0, -1.0, 1.0][t % 4])
            .collect();
        let mut columns = vec![y.clone()];
        let mut names = vec!["y".to_string()];
        for k in 0..4 {
            names.push(format!("q{}", k));
            columns.push((0..n).map(|t| if t % 4 == k { 1.0 } else { 0.0 }).collect());
        }
        (FeatureMatrix::new(names, columns).unwrap(), y)
    }

    fn config() -> RegressionConfig {
        RegressionConfig::new(3)
            .with_num_samples(10)
            .with_seed(5)
            .with_lasso(LassoCvConfig::new().with_n_alphas(20))
    }

    #[test]
    fn horizon_target_modes() {
        let y = [1.0, 3.0, 6.0, 10.0];
        let lead = horizon_target(&y, 2, true);
        assert_eq!(&lead[..2], &[5.0, 7.0]);
        assert!(lead[2].is_nan() && lead[3].is_nan());
        let raw = horizon_target(&y, 1, false);
        assert_eq!(&raw[..3], &[3.0, 6.0, 10.0]);
    }

    #[test]
    fn fit_predict_tracks_seasonal_trend() {
        let (x, y) = dataset(40);
        let mut model = RollingRegression::new(config());
        let out = model.fit_predict(&x, &y).unwrap();
        assert_eq!(out.point.len(), 3);
        assert_eq!(out.samples.len(), 10);
        assert!(out.samples.iter().all(|s| s.len() == 3));

        for h in 1..=3 {
            let t = 39 + h;
            let expected = 50.0 + 0.5 * t as f64 + [0.0, 2.0, -1.0, 1.0][t % 4];
            assert_relative_eq!(out.point[h - 1], expected, epsilon = 0.1);
            assert!(out.scale[h - 1] >= 0.0);
        }
        assert_eq!(model.predict().unwrap(), out.point);
    }

    #[test]
    fn equal_seeds_reproduce_bootstrap() {
        let (x, y) = dataset(30);
        let a = RollingRegression::new(config()).fit_predict(&x, &y).unwrap();
        let b = RollingRegression::new(config()).fit_predict(&x, &y).unwrap();
        assert_eq!(a, b);
        let bundle = a.bundle().unwrap();
        assert_eq!(bundle.point(), a.mean.as_slice());
    }

    #[test]
    fn flat_series_gives_last_value() {
        let n = 24;
        let y = vec![7.0; n];
        let x = FeatureMatrix::new(
            vec!["t".into()],
            vec![(0..n).map(|t| t as f64).collect()],
        )
        .unwrap();
        let mut model = RollingRegression::new(config());
        let out = model.fit_predict(&x, &y).unwrap();
        assert!(model.models().iter().all(|m| m.is_uninformative()));
        assert_eq!(out.point, vec![7.0; 3]);
        assert_eq!(out.scale, vec![0.0; 3]);
    }

    #[test]
    fn flat_series_gives_last_value_without_lead() {
        let n = 24;
        let y = vec![120.0; n];
        let x = FeatureMatrix::new(
            vec!["t".into()],
            vec![(0..n).map(|t| t as f64).collect()],
        )
        .unwrap();
        let mut model = RollingRegression::new(config().with_lead_target(false));
        let out = model.fit_predict(&x, &y).unwrap();
        assert!(model.models().iter().all(|m| m.is_uninformative()));
        assert_eq!(out.point, vec![120.0; 3]);
        assert_eq!(out.mean, vec![120.0; 3]);
        assert_eq!(out.scale, vec![0.0; 3]);
        assert!(out.samples.iter().all(|s| s == &vec![120.0; 3]));
    }

    #[test]
    fn non_lead_mode_predicts_values_directly() {
        let (x, y) = dataset(40);
        let mut model = RollingRegression::new(config().with_lead_target(false));
        let out = model.fit_predict(&x, &y).unwrap();
        let expected = 50.0 + 0.5 * 40.0;
        assert_relative_eq!(out.point[0], expected, epsilon = 0.5);
    }

    #[test]
    fn diagnostics_score_chronological_holdout() {
        let (x, y) = dataset(40);
        let model = RollingRegression::new(config());
        let diagnostics = model.diagnostics(&x, &y, 0.25).unwrap();
        assert_eq!(diagnostics.len(), 3);
        for (h, d) in (1..=3).zip(&diagnostics) {
            assert_eq!(d.horizon, h);
            assert!(!d.selected_features.is_empty());
            assert!(d
                .selected_features
                .iter()
                .all(|name| x.names().contains(name)));
            // rows 3..40-h, last quarter held out
            let rows = 37 - h;
            let n_test = (rows as f64 * 0.25).ceil() as usize;
            assert_eq!(d.train.n, rows - n_test);
            let test = d.test.unwrap();
            assert_eq!(test.n, n_test);
            assert!(d.train.r2 > 0.9, "train r2 {}", d.train.r2);
            assert!(test.mse < 0.25, "test mse {}", test.mse);
            assert!(d.cv_mse.is_finite() && d.cv_mse >= 0.0);
        }
        assert!(!model.is_fitted());
    }

    #[test]
    fn diagnostics_without_holdout_and_bad_share() {
        let (x, y) = dataset(30);
        let config = RegressionConfig::new(1)
            .with_seed(5)
            .with_lasso(LassoCvConfig::new().with_n_alphas(20));
        let model = RollingRegression::new(config);
        let d = model.diagnostics(&x, &y, 0.0).unwrap();
        assert!(d[0].test.is_none());
        assert_eq!(d[0].train.n, 26);
        assert!(matches!(
            model.diagnostics(&x, &y, 1.0),
            Err(ForecastError::InvalidParameter(_))
        ));
        assert!(matches!(
            model.diagnostics(&x, &y, 0.9),
            Err(ForecastError::InsufficientData { .. })
        ));
    }

    #[test]
    fn flat_market_diagnostics_score_last_value_baseline() {
        let n = 24;
        let y = vec![120.0; n];
        let x = FeatureMatrix::new(
            vec!["t".into()],
            vec![(0..n).map(|t| t as f64).collect()],
        )
        .unwrap();
        let model = RollingRegression::new(config().with_lead_target(false));
        for d in model.diagnostics(&x, &y, 0.2).unwrap() {
            assert!(d.selected_features.is_empty());
            assert_eq!(d.train.mse, 0.0);
            assert!(d.train.r2.is_nan());
            assert_eq!(d.test.unwrap().mse, 0.0);
            assert_eq!(d.cv_mse, 0.0);
        }
    }

    #[test]
    fn selected_features_map_to_column_names() {
        let (x, y) = dataset(40);
        let mut model = RollingRegression::new(config());
        assert_eq!(
            model.selected_features().unwrap_err(),
            ForecastError::FitRequired
        );
        model.fit(&x, &y).unwrap();
        let names = model.selected_features().unwrap();
        assert_eq!(names.len(), 3);
        for (m, kept) in model.models().iter().zip(&names) {
            assert_eq!(kept.len(), m.selected().len());
            for (&i, name) in m.selected().iter().zip(kept) {
                assert_eq!(&x.names()[i], name);
            }
        }
    }

    #[test]
    fn short_window_is_rejected() {
        let (x, y) = dataset(7);
        let mut model = RollingRegression::new(config());
        assert!(matches!(
            model.fit(&x, &y),
            Err(ForecastError::InsufficientData { .. })
        ));
        assert_eq!(model.predict().unwrap_err(), ForecastError::FitRequired);
    }

    #[test]
    fn rolling_prediction_scores_overlap() {
        let (x, y) = dataset(31);
        let mut model = RollingRegression::new(config().with_num_samples(3));
        let out = model.rolling_prediction(&x, &y, 8, 11).unwrap();
        assert_eq!(out.windows.len(), 3);
        assert_eq!(out.point.len(), 9);
        assert_eq!(out.windows[0].origin, 27);
        assert_eq!(out.windows[1].origin, 30);
        // group 9 tests on the single remaining row, group 10 on nothing
        assert_eq!(out.windows[1].metrics.unwrap().n, 1);
        assert!(out.windows[2].metrics.is_none());
        assert!(model.rolling_prediction(&x, &y, 0, 12).is_err());
    }
}
