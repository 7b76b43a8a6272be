//! L2-penalised linear regression with the penalty chosen by exact
//! leave-one-out error.

use crate::core::FeatureMatrix;
use crate::error::{ForecastError, Result};
use crate::regression::traits::{check_columns, check_training_data, Regressor};
use crate::utils::linalg::{cholesky, solve_cholesky};
use tracing::debug;

/// Default candidate penalties.
pub const DEFAULT_RIDGE_ALPHAS: [f64; 3] = [0.1, 1.0, 10.0];

/// Ridge regression with an unpenalised intercept.
///
/// For each candidate penalty the leave-one-out residuals are computed in
/// closed form from the hat-matrix diagonal, `e_i / (1 - h_ii)`, and the
/// penalty with the lowest mean squared LOO residual is kept.
#[derive(Debug, Clone)]
pub struct RidgeCv {
    alphas: Vec<f64>,
    coefficients: Option<Vec<f64>>,
    intercept: f64,
    alpha: f64,
}

impl Default for RidgeCv {
    fn default() -> Self {
        Self::new(DEFAULT_RIDGE_ALPHAS.to_vec())
    }
}

impl RidgeCv {
    pub fn new(alphas: Vec<f64>) -> Self {
        Self {
            alphas,
            coefficients: None,
            intercept: 0.0,
            alpha: 0.0,
        }
    }

    pub fn coefficients(&self) -> Option<&[f64]> {
        self.coefficients.as_deref()
    }

    pub fn intercept(&self) -> f64 {
        self.intercept
    }

    /// Penalty chosen by leave-one-out.
    pub fn alpha(&self) -> f64 {
        self.alpha
    }
}

/// Solution for one penalty plus its mean squared LOO residual.
fn solve_penalty(
    centred: &[Vec<f64>],
    yc: &[f64],
    gram: &[Vec<f64>],
    xty: &[f64],
    alpha: f64,
) -> Option<(Vec<f64>, f64)> {
    let p = gram.len();
    let n = yc.len();
    let mut a = gram.to_vec();
    for (j, row) in a.iter_mut().enumerate() {
        row[j] += alpha;
    }
    let l = if p == 0 { Vec::new() } else { cholesky(&a)? };
    let w = if p == 0 {
        Vec::new()
    } else {
        solve_cholesky(&l, xty)
    };

    let mut loo = 0.0;
    for i in 0..n {
        let xi: Vec<f64> = centred.iter().map(|c| c[i]).collect();
        let fitted: f64 = xi.iter().zip(&w).map(|(x, c)| x * c).sum();
        let leverage = if p == 0 {
            0.0
        } else {
            let z = solve_cholesky(&l, &xi);
            xi.iter().zip(&z).map(|(x, v)| x * v).sum::<f64>()
        };
        let h = 1.0 / n as f64 + leverage;
        let denom = 1.0 - h;
        if denom.abs() < 1e-12 {
            return Some((w, f64::INFINITY));
        }
        loo += ((yc[i] - fitted) / denom).powi(2);
    }
    Some((w, loo / n as f64))
}

impl Regressor for RidgeCv {
    fn fit(&mut self, x: &FeatureMatrix, y: &[f64]) -> Result<()> {
        if self.alphas.is_empty() || self.alphas.iter().any(|a| !(*a > 0.0)) {
            return Err(ForecastError::InvalidParameter(
                "ridge penalties must be positive".to_string(),
            ));
        }
        check_training_data(x, y, 2)?;

        let n = y.len() as f64;
        let y_mean = y.iter().sum::<f64>() / n;
        let x_mean: Vec<f64> = x.columns().iter().map(|c| c.iter().sum::<f64>() / n).collect();
        let centred: Vec<Vec<f64>> = x
            .columns()
            .iter()
            .zip(&x_mean)
            .map(|(c, m)| c.iter().map(|v| v - m).collect())
            .collect();
        let yc: Vec<f64> = y.iter().map(|v| v - y_mean).collect();

        let p = centred.len();
        let mut gram = vec![vec![0.0; p]; p];
        for a in 0..p {
            for b in a..p {
                let dot: f64 = centred[a].iter().zip(&centred[b]).map(|(u, v)| u * v).sum();
                gram[a][b] = dot;
                gram[b][a] = dot;
            }
        }
        let xty: Vec<f64> = centred
            .iter()
            .map(|c| c.iter().zip(&yc).map(|(u, v)| u * v).sum())
            .collect();

        let mut best: Option<(f64, Vec<f64>, f64)> = None;
        for &alpha in &self.alphas {
            let Some((w, loo)) = solve_penalty(&centred, &yc, &gram, &xty, alpha) else {
                continue;
            };
            if best.as_ref().map_or(true, |(_, _, b)| loo < *b) {
                best = Some((alpha, w, loo));
            }
        }
        let (alpha, w, loo) = best.ok_or_else(|| {
            ForecastError::ComputationError("ridge system is not positive definite".to_string())
        })?;

        self.intercept = y_mean - x_mean.iter().zip(&w).map(|(m, c)| m * c).sum::<f64>();
        self.alpha = alpha;
        debug!(alpha, loo_mse = loo, features = p, "ridge fit");
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
        "RidgeCV"
    }

    fn is_fitted(&self) -> bool {
        self.coefficients.is_some()
    }
}
