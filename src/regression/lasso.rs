//! L1-penalised linear regression with the penalty chosen by cross-validation.
//!
//! Minimises `1/(2n) * ||y - b - Xw||^2 + alpha * ||w||_1` by cyclic
//! coordinate descent on the Gram matrix of the centred inputs. The penalty
//! is picked from a descending path by contiguous k-fold CV and the model is
//! then refit on all rows. Coefficients that end exactly at zero mark the
//! features the model discards.

use crate::core::FeatureMatrix;
use crate::error::{ForecastError, Result};
use crate::regression::traits::{check_columns, check_training_data, Regressor};
use tracing::debug;

/// Configuration for [`LassoCv`].
#[derive(Debug, Clone)]
pub struct LassoCvConfig {
    /// Number of penalties on the automatic path (default: 100).
    pub n_alphas: usize,
    /// Ratio of the smallest to the largest penalty on the path (default: 1e-3).
    pub eps: f64,
    /// Explicit penalties; overrides the automatic path when set.
    pub alphas: Option<Vec<f64>>,
    /// Number of contiguous CV folds (default: 5).
    pub folds: usize,
    /// Maximum coordinate-descent sweeps per penalty (default: 1000).
    pub max_iter: usize,
    /// Convergence tolerance on the largest coefficient update (default: 1e-4).
    pub tol: f64,
}

impl Default for LassoCvConfig {
    fn default() -> Self {
        Self {
            n_alphas: 100,
            eps: 1e-3,
            alphas: None,
            folds: 5,
            max_iter: 1000,
            tol: 1e-4,
        }
    }
}

impl LassoCvConfig {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_n_alphas(mut self, n_alphas: usize) -> Self {
        self.n_alphas = n_alphas;
        self
    }

    pub fn with_alphas(mut self, alphas: Vec<f64>) -> Self {
        self.alphas = Some(alphas);
        self
    }

    pub fn with_folds(mut self, folds: usize) -> Self {
        self.folds = folds;
        self
    }

    pub fn with_max_iter(mut self, max_iter: usize) -> Self {
        self.max_iter = max_iter;
        self
    }

    pub fn validate(&self) -> Result<()> {
        if self.n_alphas == 0 {
            return Err(ForecastError::InvalidParameter(
                "n_alphas must be at least 1".to_string(),
            ));
        }
        if self.folds < 2 {
            return Err(ForecastError::InvalidParameter(
                "lasso needs at least 2 CV folds".to_string(),
            ));
        }
        if !(self.eps > 0.0 && self.eps < 1.0) {
            return Err(ForecastError::InvalidParameter(
                "eps must be in (0, 1)".to_string(),
            ));
        }
        if let Some(alphas) = &self.alphas {
            if alphas.is_empty() || alphas.iter().any(|a| !a.is_finite() || *a < 0.0) {
                return Err(ForecastError::InvalidParameter(
                    "explicit alphas must be non-empty, finite and non-negative".to_string(),
                ));
            }
        }
        Ok(())
    }
}

/// Centred design summarised by its Gram matrix.
struct Centered {
    gram: Vec<Vec<f64>>,
    xty: Vec<f64>,
    x_mean: Vec<f64>,
    y_mean: f64,
    /// Largest absolute deviation of the target from its mean.
    y_range: f64,
    n: f64,
}

impl Centered {
    fn new(columns: &[Vec<f64>], y: &[f64], rows: &[usize]) -> Self {
        let n = rows.len() as f64;
        let y_mean = rows.iter().map(|&i| y[i]).sum::<f64>() / n;
        let x_mean: Vec<f64> = columns
            .iter()
            .map(|c| rows.iter().map(|&i| c[i]).sum::<f64>() / n)
            .collect();
        let centred: Vec<Vec<f64>> = columns
            .iter()
            .zip(&x_mean)
            .map(|(c, m)| rows.iter().map(|&i| c[i] - m).collect())
            .collect();
        let yc: Vec<f64> = rows.iter().map(|&i| y[i] - y_mean).collect();
        let y_range = yc.iter().fold(0.0_f64, |acc, v| acc.max(v.abs()));

        let p = columns.len();
        let mut gram = vec![vec![0.0; p]; p];
        for a in 0..p {
            for b in a..p {
                let dot: f64 = centred[a].iter().zip(&centred[b]).map(|(u, v)| u * v).sum();
                gram[a][b] = dot;
                gram[b][a] = dot;
            }
        }
        let xty = centred
            .iter()
            .map(|c| c.iter().zip(&yc).map(|(u, v)| u * v).sum())
            .collect();

        Self {
            gram,
            xty,
            x_mean,
            y_mean,
            y_range,
            n,
        }
    }

    /// Target constant up to rounding; every coefficient is then zero.
    fn constant_target(&self) -> bool {
        self.y_range <= 1e-12 * (1.0 + self.y_mean.abs())
    }

    fn alpha_max(&self) -> f64 {
        self.xty
            .iter()
            .map(|v| v.abs() / self.n)
            .fold(0.0, f64::max)
    }

    fn intercept(&self, w: &[f64]) -> f64 {
        self.y_mean - self.x_mean.iter().zip(w).map(|(m, c)| m * c).sum::<f64>()
    }
}

fn soft_threshold(value: f64, threshold: f64) -> f64 {
    if value > threshold {
        value - threshold
    } else if value < -threshold {
        value + threshold
    } else {
        0.0
    }
}

/// Coordinate descent for one penalty, warm-started from `w`.
fn coordinate_descent(data: &Centered, alpha: f64, w: &mut [f64], max_iter: usize, tol: f64) {
    let p = w.len();
    // q = X'r with r the current residual
    let mut q: Vec<f64> = (0..p)
        .map(|j| data.xty[j] - (0..p).map(|k| data.gram[j][k] * w[k]).sum::<f64>())
        .collect();
    let threshold = alpha * data.n;

    for _ in 0..max_iter {
        let mut max_update = 0.0_f64;
        let mut max_coef = 0.0_f64;
        for j in 0..p {
            let norm = data.gram[j][j];
            if norm <= 1e-12 {
                w[j] = 0.0;
                continue;
            }
            let old = w[j];
            let rho = q[j] + norm * old;
            let new = soft_threshold(rho, threshold) / norm;
            let delta = new - old;
            if delta != 0.0 {
                for (k, qk) in q.iter_mut().enumerate() {
                    *qk -= data.gram[k][j] * delta;
                }
                w[j] = new;
            }
            max_update = max_update.max(delta.abs());
            max_coef = max_coef.max(new.abs());
        }
        if max_update <= tol * max_coef.max(1e-12) {
            break;
        }
    }
}

/// L1 regression with cross-validated penalty.
#[derive(Debug, Clone)]
pub struct LassoCv {
    config: LassoCvConfig,
    coefficients: Option<Vec<f64>>,
    intercept: f64,
    alpha: f64,
    mse_path: Vec<f64>,
}

impl LassoCv {
    pub fn new(config: LassoCvConfig) -> Self {
        Self {
            config,
            coefficients: None,
            intercept: 0.0,
            alpha: 0.0,
            mse_path: Vec::new(),
        }
    }

    /// Fitted coefficients, one per input column.
    pub fn coefficients(&self) -> Option<&[f64]> {
        self.coefficients.as_deref()
    }

    pub fn intercept(&self) -> f64 {
        self.intercept
    }

    /// Penalty chosen by cross-validation.
    pub fn alpha(&self) -> f64 {
        self.alpha
    }

    /// Mean held-out MSE for every penalty on the path.
    pub fn mse_path(&self) -> &[f64] {
        &self.mse_path
    }

    /// Indices of the columns with non-zero coefficients.
    pub fn selected(&self) -> Vec<usize> {
        self.coefficients
            .as_deref()
            .unwrap_or(&[])
            .iter()
            .enumerate()
            .filter(|(_, c)| c.abs() > 0.0)
            .map(|(i, _)| i)
            .collect()
    }

    fn alpha_path(&self, full: &Centered) -> Vec<f64> {
        if let Some(alphas) = &self.config.alphas {
            let mut alphas = alphas.clone();
            alphas.sort_by(|a, b| b.total_cmp(a));
            return alphas;
        }
        let max = full.alpha_max();
        let k = self.config.n_alphas;
        if k == 1 || max <= 0.0 {
            return vec![max];
        }
        let log_max = max.ln();
        let log_min = (max * self.config.eps).ln();
        (0..k)
            .map(|i| (log_max + (log_min - log_max) * i as f64 / (k - 1) as f64).exp())
            .collect()
    }
}

impl Regressor for LassoCv {
    fn fit(&mut self, x: &FeatureMatrix, y: &[f64]) -> Result<()> {
        self.config.validate()?;
        check_training_data(x, y, 2)?;

        let n = y.len();
        let p = x.n_cols();
        let columns = x.columns();
        let all_rows: Vec<usize> = (0..n).collect();
        let full = Centered::new(columns, y, &all_rows);
        if full.constant_target() {
            debug!(features = p, "constant target, lasso keeps no feature");
            self.intercept = full.y_mean;
            self.alpha = 0.0;
            self.mse_path = Vec::new();
            self.coefficients = Some(vec![0.0; p]);
            return Ok(());
        }
        let alphas = self.alpha_path(&full);

        let folds = self.config.folds.min(n);
        let mut mse = vec![0.0; alphas.len()];
        for f in 0..folds {
            let start = f * n / folds;
            let end = (f + 1) * n / folds;
            let train: Vec<usize> = (0..start).chain(end..n).collect();
            let data = Centered::new(columns, y, &train);
            let mut w = vec![0.0; p];
            for (a, &alpha) in alphas.iter().enumerate() {
                coordinate_descent(&data, alpha, &mut w, self.config.max_iter, self.config.tol);
                let b = data.intercept(&w);
                let sse: f64 = (start..end)
                    .map(|i| {
                        let pred = b + (0..p).map(|j| columns[j][i] * w[j]).sum::<f64>();
                        (y[i] - pred).powi(2)
                    })
                    .sum();
                mse[a] += sse / (end - start) as f64 / folds as f64;
            }
        }

        let best = mse
            .iter()
            .enumerate()
            .fold(0, |best, (i, v)| if *v < mse[best] { i } else { best });
        let alpha = alphas[best];

        let mut w = vec![0.0; p];
        for &a in alphas.iter().take(best + 1) {
            coordinate_descent(&full, a, &mut w, self.config.max_iter, self.config.tol);
        }
        self.intercept = full.intercept(&w);
        self.alpha = alpha;
        self.mse_path = mse;

        debug!(
            alpha,
            selected = w.iter().filter(|c| c.abs() > 0.0).count(),
            features = p,
            "lasso fit"
        );
        self.coefficients = Some(w);
        Ok(())
    }

    fn predict(&self, x: &FeatureMatrix) -> Result<Vec<f64>> {
        let w = self.coefficients.as_ref().ok_or(ForecastError::FitRequired)?;
        check_columns(x, w.len())?;
        Ok((0..x.n_rows())
            .map(|i| {
                self.intercept
                    + x.columns()
                        .iter()
                        .zip(w)
                        .map(|(c, wj)| c[i] * wj)
                        .sum::<f64>()
            })
            .collect())
    }

    fn name(&self) -> &str {
        "LassoCV"
    }

    fn is_fitted(&self) -> bool {
        self.coefficients.is_some()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    fn design(n: usize) -> (FeatureMatrix, Vec<f64>) {
        // y depends on a and b only; c is an unrelated deterministic signal.
        let a: Vec<f64> = (0..n).map(|i| (i as f64 * 0.7).sin()).collect();
        let b: Vec<f64> = (0..n).map(|i| (i as f64 * 0.3).cos()).collect();
        let c: Vec<f64> = (0..n).map(|i| ((i * 7919) % 13) as f64 / 13.0).collect();
        let y: Vec<f64> = (0..n).map(|i| 1.0 + 3.0 * a[i] - 2.0 * b[i]).collect();
        let x = FeatureMatrix::new(vec!["a".into(), "b".into(), "c".into()], vec![a, b, c])
            .unwrap();
        (x, y)
    }

    #[test]
    fn recovers_sparse_linear_signal() {
        let (x, y) = design(60);
        let mut lasso = LassoCv::new(LassoCvConfig::new().with_n_alphas(30));
        lasso.fit(&x, &y).unwrap();

        let w = lasso.coefficients().unwrap();
        assert_relative_eq!(w[0], 3.0, epsilon = 0.05);
        assert_relative_eq!(w[1], -2.0, epsilon = 0.05);
        assert!(w[2].abs() < 0.05);
        assert_eq!(lasso.mse_path().len(), 30);

        let pred = lasso.predict(&x).unwrap();
        assert_relative_eq!(pred[10], y[10], epsilon = 0.05);
    }

    #[test]
    fn large_penalty_selects_nothing() {
        let (x, y) = design(40);
        let mut lasso = LassoCv::new(LassoCvConfig::new().with_alphas(vec![1e6]));
        lasso.fit(&x, &y).unwrap();
        assert!(lasso.selected().is_empty());
        let mean = y.iter().sum::<f64>() / y.len() as f64;
        assert_relative_eq!(lasso.intercept(), mean, epsilon = 1e-12);
    }

    #[test]
    fn constant_target_selects_nothing() {
        let (x, _) = design(20);
        let mut lasso = LassoCv::new(LassoCvConfig::new().with_n_alphas(10));
        lasso.fit(&x, &[5.0; 20]).unwrap();
        assert!(lasso.selected().is_empty());
        assert_relative_eq!(lasso.predict(&x).unwrap()[3], 5.0);
    }

    #[test]
    fn rejects_missing_values_and_unfitted_use() {
        let (x, mut y) = design(10);
        let lasso = LassoCv::new(LassoCvConfig::default());
        assert_eq!(lasso.predict(&x), Err(ForecastError::FitRequired));

        y[4] = f64::NAN;
        let mut lasso = LassoCv::new(LassoCvConfig::default());
        assert_eq!(lasso.fit(&x, &y), Err(ForecastError::MissingValues));
    }

    #[test]
    fn soft_threshold_shrinks_toward_zero() {
        assert_eq!(soft_threshold(3.0, 1.0), 2.0);
        assert_eq!(soft_threshold(-3.0, 1.0), -2.0);
        assert_eq!(soft_threshold(0.5, 1.0), 0.0);
    }
}
