//! Single-horizon learner: standardise, select features with the lasso, then
//! fit the final regressor on the selected columns.

use crate::core::FeatureMatrix;
use crate::error::{ForecastError, Result};
use crate::regression::lasso::{LassoCv, LassoCvConfig};
use crate::regression::ridge::RidgeCv;
use crate::regression::traits::{check_training_data, BoxedRegressor, Regressor};
use crate::regression::tree::{DecisionTree, TreeConfig};
use crate::regression::ModelKind;
use crate::transform::ColumnScaler;
use tracing::{debug, warn};

/// Feature-selected regressor for one forecast horizon.
///
/// When the lasso keeps no feature the model is *uninformative* and predicts
/// 0.0 for every row. Callers check [`HorizonModel::is_uninformative`] and
/// substitute the last observed value.
pub struct HorizonModel {
    horizon: usize,
    kind: ModelKind,
    lasso_config: LassoCvConfig,
    tree_config: TreeConfig,
    scaler: ColumnScaler,
    selected: Vec<usize>,
    regressor: Option<BoxedRegressor>,
    n_features: usize,
    fitted: bool,
}

impl std::fmt::Debug for HorizonModel {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("HorizonModel")
            .field("horizon", &self.horizon)
            .field("kind", &self.kind)
            .field("selected", &self.selected)
            .field("fitted", &self.fitted)
            .finish()
    }
}

impl HorizonModel {
    pub fn new(
        horizon: usize,
        kind: ModelKind,
        lasso_config: LassoCvConfig,
        tree_config: TreeConfig,
    ) -> Self {
        Self {
            horizon,
            kind,
            lasso_config,
            tree_config,
            scaler: ColumnScaler::new(),
            selected: Vec::new(),
            regressor: None,
            n_features: 0,
            fitted: false,
        }
    }

    pub fn horizon(&self) -> usize {
        self.horizon
    }

    pub fn kind(&self) -> ModelKind {
        self.kind
    }

    /// Column indices kept by the last fit.
    pub fn selected(&self) -> &[usize] {
        &self.selected
    }

    /// True when the last fit selected no feature.
    pub fn is_uninformative(&self) -> bool {
        self.fitted && self.regressor.is_none()
    }

    pub fn is_fitted(&self) -> bool {
        self.fitted
    }

    /// Fit on training rows `x` and the horizon target `y`.
    pub fn fit(&mut self, x: &FeatureMatrix, y: &[f64]) -> Result<()> {
        check_training_data(x, y, 2)?;
        self.n_features = x.n_cols();
        self.regressor = None;
        self.selected.clear();

        if x.n_cols() == 0 {
            self.fitted = true;
            warn!(horizon = self.horizon, "no input features, horizon is uninformative");
            return Ok(());
        }

        let z = self.scaler.fit_transform(x)?;
        let mut lasso = LassoCv::new(self.lasso_config.clone());
        lasso.fit(&z, y)?;
        self.selected = lasso.selected();

        if self.selected.is_empty() {
            self.fitted = true;
            warn!(
                horizon = self.horizon,
                "lasso selected no features, predicting neutral value"
            );
            return Ok(());
        }

        let mut regressor: BoxedRegressor = match self.kind {
            ModelKind::Linear => Box::new(RidgeCv::default()),
            ModelKind::Tree => Box::new(DecisionTree::new(self.tree_config.clone())),
        };
        let inputs = match self.kind {
            ModelKind::Linear => z.select_columns(&self.selected)?,
            ModelKind::Tree => x.select_columns(&self.selected)?,
        };
        regressor.fit(&inputs, y)?;
        debug!(
            horizon = self.horizon,
            model = regressor.name(),
            selected = self.selected.len(),
            features = x.n_cols(),
            "horizon model fit"
        );
        self.regressor = Some(regressor);
        self.fitted = true;
        Ok(())
    }

    /// Predict one value per row of `x` (raw, unstandardised features).
    pub fn predict(&self, x: &FeatureMatrix) -> Result<Vec<f64>> {
        if !self.fitted {
            return Err(ForecastError::FitRequired);
        }
        if x.n_cols() != self.n_features {
            return Err(ForecastError::DimensionMismatch {
                expected: self.n_features,
                got: x.n_cols(),
            });
        }
        let Some(regressor) = &self.regressor else {
            return Ok(vec![0.0; x.n_rows()]);
        };
        let inputs = match self.kind {
            ModelKind::Linear => self.scaler.transform(x)?.select_columns(&self.selected)?,
            ModelKind::Tree => x.select_columns(&self.selected)?,
        };
        regressor.predict(&inputs)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    fn data(n: usize) -> (FeatureMatrix, Vec<f64>) {
        let a: Vec<f64> = (0..n).map(|i| (i as f64 * 0.5).sin() * 10.0).collect();
        let b: Vec<f64> = (0..n).map(|i| (i % 4) as f64).collect();
        let y: Vec<f64> = a.iter().map(|v| 0.5 * v + 3.0).collect();
        (
            FeatureMatrix::new(vec!["a".into(), "b".into()], vec![a, b]).unwrap(),
            y,
        )
    }

    fn model(kind: ModelKind) -> HorizonModel {
        HorizonModel::new(
            1,
            kind,
            LassoCvConfig::new().with_n_alphas(20),
            TreeConfig::default(),
        )
    }

    #[test]
    fn linear_model_tracks_signal() {
        let (x, y) = data(40);
        let mut m = model(ModelKind::Linear);
        m.fit(&x, &y).unwrap();
        assert!(m.selected().contains(&0));
        assert!(!m.is_uninformative());
        let pred = m.predict(&x.last_rows(1)).unwrap();
        assert_relative_eq!(pred[0], y[39], epsilon = 0.05);
    }

    #[test]
    fn tree_model_fits_training_rows() {
        let (x, y) = data(40);
        let mut m = model(ModelKind::Tree);
        m.fit(&x, &y).unwrap();
        let pred = m.predict(&x).unwrap();
        let mse: f64 = pred.iter().zip(&y).map(|(p, t)| (p - t).powi(2)).sum::<f64>() / 40.0;
        let mean = y.iter().sum::<f64>() / 40.0;
        let var: f64 = y.iter().map(|t| (t - mean).powi(2)).sum::<f64>() / 40.0;
        assert!(mse < 0.05 * var);
    }

    #[test]
    fn constant_target_is_uninformative() {
        let (x, _) = data(20);
        let mut m = model(ModelKind::Linear);
        m.fit(&x, &[1.5; 20]).unwrap();
        assert!(m.is_uninformative());
        assert_eq!(m.predict(&x.last_rows(3)).unwrap(), vec![0.0; 3]);
    }

    #[test]
    fn predict_requires_fit_and_matching_columns() {
        let (x, y) = data(20);
        let mut m = model(ModelKind::Linear);
        assert_eq!(m.predict(&x), Err(ForecastError::FitRequired));
        m.fit(&x, &y).unwrap();
        assert!(m.predict(&x.select_columns(&[0]).unwrap()).is_err());
    }
}
