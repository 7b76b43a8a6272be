//! Forecast bundle holding point estimates, scales and sample paths.

use crate::error::{ForecastError, Result};
use crate::utils::stats::quantile_normal;

/// Output of a forecaster over `horizon` steps.
///
/// `point` and `scale` are indexed by forecast step; `samples` is a
/// `(num_samples, horizon)` matrix stored as `samples[draw][step]`.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ForecastBundle {
    point: Vec<f64>,
    scale: Vec<f64>,
    samples: Vec<Vec<f64>>,
}

impl ForecastBundle {
    /// Create a bundle, checking that every sequence covers the same horizon.
    pub fn new(point: Vec<f64>, scale: Vec<f64>, samples: Vec<Vec<f64>>) -> Result<Self> {
        let horizon = point.len();
        if scale.len() != horizon {
            return Err(ForecastError::DimensionMismatch {
                expected: horizon,
                got: scale.len(),
            });
        }
        if let Some(bad) = samples.iter().find(|s| s.len() != horizon) {
            return Err(ForecastError::DimensionMismatch {
                expected: horizon,
                got: bad.len(),
            });
        }
        Ok(Self {
            point,
            scale,
            samples,
        })
    }

    /// A zero-step bundle that still carries `num_samples` (empty) paths.
    pub fn empty(num_samples: usize) -> Self {
        Self {
            point: Vec::new(),
            scale: Vec::new(),
            samples: vec![Vec::new(); num_samples],
        }
    }

    /// Number of forecast steps.
    pub fn horizon(&self) -> usize {
        self.point.len()
    }

    /// Number of sample paths.
    pub fn num_samples(&self) -> usize {
        self.samples.len()
    }

    pub fn is_empty(&self) -> bool {
        self.point.is_empty()
    }

    pub fn point(&self) -> &[f64] {
        &self.point
    }

    pub fn scale(&self) -> &[f64] {
        &self.scale
    }

    /// Sample-path matrix, `samples()[draw][step]`.
    pub fn samples(&self) -> &[Vec<f64>] {
        &self.samples
    }

    /// All sampled values for one forecast step (0-based).
    pub fn step_samples(&self, step: usize) -> Result<Vec<f64>> {
        if step >= self.horizon() {
            return Err(ForecastError::IndexOutOfBounds {
                index: step,
                size: self.horizon(),
            });
        }
        Ok(self.samples.iter().map(|s| s[step]).collect())
    }

    /// Append `other` after the last step of `self`.
    pub fn concat(&self, other: &ForecastBundle) -> Result<Self> {
        if self.num_samples() != other.num_samples() {
            return Err(ForecastError::DimensionMismatch {
                expected: self.num_samples(),
                got: other.num_samples(),
            });
        }
        let mut point = self.point.clone();
        point.extend_from_slice(&other.point);
        let mut scale = self.scale.clone();
        scale.extend_from_slice(&other.scale);
        let samples = self
            .samples
            .iter()
            .zip(other.samples.iter())
            .map(|(a, b)| {
                let mut row = a.clone();
                row.extend_from_slice(b);
                row
            })
            .collect();
        Ok(Self {
            point,
            scale,
            samples,
        })
    }

    /// Linear combination `w_self * self + w_other * other`.
    ///
    /// The same weights are applied to point and scale. Combining scales
    /// linearly assumes perfectly correlated components, so sample paths are
    /// combined under the same assumption: at every step the k-th smallest
    /// draw of `self` is paired with the k-th smallest draw of `other`. The
    /// result keeps the path order of `other`, and the spread of the blended
    /// paths matches the blended scale. With `w_other == 0.0` the paths of
    /// `self` are scaled in place. NaN inputs propagate.
    pub fn blend(&self, other: &ForecastBundle, w_self: f64, w_other: f64) -> Result<Self> {
        if self.horizon() != other.horizon() {
            return Err(ForecastError::DimensionMismatch {
                expected: self.horizon(),
                got: other.horizon(),
            });
        }
        if self.num_samples() != other.num_samples() {
            return Err(ForecastError::DimensionMismatch {
                expected: self.num_samples(),
                got: other.num_samples(),
            });
        }
        let combine = |a: &[f64], b: &[f64]| -> Vec<f64> {
            a.iter()
                .zip(b.iter())
                .map(|(x, y)| w_self * x + w_other * y)
                .collect()
        };
        let samples = if w_other == 0.0 {
            self.samples
                .iter()
                .map(|a| a.iter().map(|x| w_self * x).collect())
                .collect()
        } else {
            let mut samples = other.samples.clone();
            for step in 0..self.horizon() {
                let order_self = rank_order(&self.samples, step);
                let order_other = rank_order(&other.samples, step);
                for (&i, &j) in order_self.iter().zip(order_other.iter()) {
                    samples[j][step] =
                        w_self * self.samples[i][step] + w_other * other.samples[j][step];
                }
            }
            samples
        };
        Ok(Self {
            point: combine(&self.point, &other.point),
            scale: combine(&self.scale, &other.scale),
            samples,
        })
    }

    /// Gaussian interval `point ± z * scale` at the given confidence level.
    pub fn normal_interval(&self, level: f64) -> Result<(Vec<f64>, Vec<f64>)> {
        if !(level > 0.0 && level < 1.0) {
            return Err(ForecastError::InvalidParameter(format!(
                "confidence level must be in (0, 1), got {}",
                level
            )));
        }
        let z = quantile_normal((1.0 + level) / 2.0);
        let lower = self
            .point
            .iter()
            .zip(self.scale.iter())
            .map(|(p, s)| p - z * s)
            .collect();
        let upper = self
            .point
            .iter()
            .zip(self.scale.iter())
            .map(|(p, s)| p + z * s)
            .collect();
        Ok((lower, upper))
    }
}

/// Path indices sorted by their value at `step`.
fn rank_order(samples: &[Vec<f64>], step: usize) -> Vec<usize> {
    let mut order: Vec<usize> = (0..samples.len()).collect();
    order.sort_by(|&a, &b| samples[a][step].total_cmp(&samples[b][step]));
    order
}
