//! Regressor trait defining the common interface for the per-horizon learners.

use crate::core::FeatureMatrix;
use crate::error::{ForecastError, Result};

/// Common interface for supervised regressors on a [`FeatureMatrix`].
///
/// This trait is object-safe and can be used with `Box<dyn Regressor>`.
pub trait Regressor {
    /// Fit the model to rows of `x` and the aligned targets `y`.
    fn fit(&mut self, x: &FeatureMatrix, y: &[f64]) -> Result<()>;

    /// Predict one value per row of `x`.
    fn predict(&self, x: &FeatureMatrix) -> Result<Vec<f64>>;

    /// Get the model name.
    fn name(&self) -> &str;

    /// Check if the model has been fitted.
    fn is_fitted(&self) -> bool;
}

/// Type alias for boxed regressor trait objects.
pub type BoxedRegressor = Box<dyn Regressor>;

/// Shared input checks for `fit`: aligned, non-empty and finite.
pub(crate) fn check_training_data(x: &FeatureMatrix, y: &[f64], min_rows: usize) -> Result<()> {
    if y.is_empty() {
        return Err(ForecastError::EmptyData);
    }
    if x.n_rows() != y.len() {
        return Err(ForecastError::DimensionMismatch {
            expected: y.len(),
            got: x.n_rows(),
        });
    }
    if y.len() < min_rows {
        return Err(ForecastError::InsufficientData {
            needed: min_rows,
            got: y.len(),
        });
    }
    if x.has_non_finite() || y.iter().any(|v| !v.is_finite()) {
        return Err(ForecastError::MissingValues);
    }
    Ok(())
}

/// Check that prediction input has the fitted column count.
pub(crate) fn check_columns(x: &FeatureMatrix, expected: usize) -> Result<()> {
    if x.n_cols() != expected {
        return Err(ForecastError::DimensionMismatch {
            expected,
            got: x.n_cols(),
        });
    }
    Ok(())
}
