//! Accuracy metrics for forecast evaluation.

use crate::error::{ForecastError, Result};

/// Accuracy metrics for evaluating forecast performance.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct AccuracyMetrics {
    /// Mean Absolute Error
    pub mae: f64,
    /// Mean Squared Error
    pub mse: f64,
    /// Root Mean Squared Error
    pub rmse: f64,
    /// Coefficient of determination, NaN when `actual` is constant.
    pub r2: f64,
    /// Number of compared points.
    pub n: usize,
}

/// Calculate accuracy metrics between actual and predicted values.
///
/// Both slices must have the same non-zero length.
pub fn calculate_metrics(actual: &[f64], predicted: &[f64]) -> Result<AccuracyMetrics> {
    if actual.is_empty() || predicted.is_empty() {
        return Err(ForecastError::EmptyData);
    }

    if actual.len() != predicted.len() {
        return Err(ForecastError::DimensionMismatch {
            expected: actual.len(),
            got: predicted.len(),
        });
    }

    let n = actual.len() as f64;

    let mae: f64 = actual
        .iter()
        .zip(predicted.iter())
        .map(|(a, p)| (a - p).abs())
        .sum::<f64>()
        / n;

    let mse: f64 = actual
        .iter()
        .zip(predicted.iter())
        .map(|(a, p)| (a - p).powi(2))
        .sum::<f64>()
        / n;

    let mean = actual.iter().sum::<f64>() / n;
    let variance = actual.iter().map(|a| (a - mean).powi(2)).sum::<f64>() / n;
    let r2 = if variance > 0.0 {
        1.0 - mse / variance
    } else {
        f64::NAN
    };

    Ok(AccuracyMetrics {
        mae,
        mse,
        rmse: mse.sqrt(),
        r2,
        n: actual.len(),
    })
}

/// Metrics over the overlapping prefix of `actual` and `predicted`.
///
/// Test slices can be shorter than the forecast horizon; only the steps that
/// have an observed value are scored. Returns `None` when nothing overlaps.
pub fn overlap_metrics(actual: &[f64], predicted: &[f64]) -> Option<AccuracyMetrics> {
    let n = actual.len().min(predicted.len());
    if n == 0 {
        return None;
    }
    calculate_metrics(&actual[..n], &predicted[..n]).ok()
}
