//! Column standardisation for regression inputs.
//!
//! Statistics are learned on a training window and reused unchanged on any
//! later rows, so prediction never sees information from outside the window.

use crate::core::FeatureMatrix;
use crate::error::{ForecastError, Result};

/// Centre and scale learned for a single column.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ScaleResult {
    /// Mean of the training values.
    pub center: f64,
    /// Population standard deviation, or 1.0 for a constant column.
    pub scale: f64,
}

impl ScaleResult {
    /// Transform new data using the learned parameters.
    pub fn transform(&self, data: &[f64]) -> Vec<f64> {
        data.iter()
            .map(|&x| (x - self.center) / self.scale)
            .collect()
    }

    /// Inverse transform to recover original scale.
    pub fn inverse(&self, data: &[f64]) -> Vec<f64> {
        data.iter().map(|&x| x * self.scale + self.center).collect()
    }
}

/// Standardisation parameters of one column (zero mean, unit population
/// variance). Constant columns keep unit scale so they map to zero.
pub fn standardize(series: &[f64]) -> ScaleResult {
    if series.is_empty() {
        return ScaleResult {
            center: 0.0,
            scale: 1.0,
        };
    }

    let n = series.len() as f64;
    let mean = series.iter().sum::<f64>() / n;
    let variance = series.iter().map(|x| (x - mean).powi(2)).sum::<f64>() / n;
    let std = variance.sqrt();

    ScaleResult {
        center: mean,
        scale: if std < 1e-10 { 1.0 } else { std },
    }
}

/// Per-column standardiser for a [`FeatureMatrix`].
#[derive(Debug, Clone, Default)]
pub struct ColumnScaler {
    params: Vec<ScaleResult>,
}

impl ColumnScaler {
    pub fn new() -> Self {
        Self::default()
    }

    /// Learn centre and scale of every column.
    pub fn fit(&mut self, x: &FeatureMatrix) -> Result<()> {
        if x.n_rows() == 0 {
            return Err(ForecastError::EmptyData);
        }
        self.params = x.columns().iter().map(|c| standardize(c)).collect();
        Ok(())
    }

    pub fn is_fitted(&self) -> bool {
        !self.params.is_empty()
    }

    pub fn params(&self) -> &[ScaleResult] {
        &self.params
    }

    /// Apply the learned parameters; the column count must match the fit.
    pub fn transform(&self, x: &FeatureMatrix) -> Result<FeatureMatrix> {
        if !self.is_fitted() {
            return Err(ForecastError::FitRequired);
        }
        if x.n_cols() != self.params.len() {
            return Err(ForecastError::DimensionMismatch {
                expected: self.params.len(),
                got: x.n_cols(),
            });
        }
        let columns = x
            .columns()
            .iter()
            .zip(&self.params)
            .map(|(c, p)| p.transform(c))
            .collect();
        FeatureMatrix::new(x.names().to_vec(), columns)
    }

    pub fn fit_transform(&mut self, x: &FeatureMatrix) -> Result<FeatureMatrix> {
        self.fit(x)?;
        self.transform(x)
    }
}
