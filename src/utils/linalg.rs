//! Small dense linear algebra helpers (row-major `Vec<Vec<f64>>`).
//!
//! Used by the ridge solver and by the structural model when drawing
//! correlated state samples.

/// Cholesky factor `L` with `A = L L'`; `None` if `A` is not positive definite.
pub fn cholesky(a: &[Vec<f64>]) -> Option<Vec<Vec<f64>>> {
    let n = a.len();
    let mut l = vec![vec![0.0; n]; n];

    for i in 0..n {
        if a[i].len() != n {
            return None;
        }
        for j in 0..=i {
            let mut sum = a[i][j];
            for k in 0..j {
                sum -= l[i][k] * l[j][k];
            }

            if i == j {
                if sum <= 0.0 || !sum.is_finite() {
                    return None;
                }
                l[i][j] = sum.sqrt();
            } else {
                l[i][j] = sum / l[j][j];
            }
        }
    }

    Some(l)
}

/// Solve `L L' x = b` given the Cholesky factor `L`.
pub fn solve_cholesky(l: &[Vec<f64>], b: &[f64]) -> Vec<f64> {
    let n = b.len();

    // Forward substitution: L @ y = b
    let mut y = vec![0.0; n];
    for i in 0..n {
        let mut sum = b[i];
        for j in 0..i {
            sum -= l[i][j] * y[j];
        }
        y[i] = sum / l[i][i];
    }

    // Backward substitution: L' @ x = y
    let mut x = vec![0.0; n];
    for i in (0..n).rev() {
        let mut sum = y[i];
        for j in (i + 1)..n {
            sum -= l[j][i] * x[j];
        }
        x[i] = sum / l[i][i];
    }

    x
}

/// Cholesky factor of a covariance matrix that may be numerically singular.
///
/// Adds growing diagonal jitter until the factorisation succeeds and falls
/// back to the square root of the (clamped) diagonal.
pub fn cholesky_psd(a: &[Vec<f64>]) -> Vec<Vec<f64>> {
    let n = a.len();
    let trace: f64 = (0..n).map(|i| a[i][i].abs()).sum::<f64>().max(1e-300);
    let mut jitter = 0.0;

    for _ in 0..8 {
        let mut m = a.to_vec();
        for (i, row) in m.iter_mut().enumerate() {
            row[i] += jitter;
        }
        if let Some(l) = cholesky(&m) {
            return l;
        }
        jitter = if jitter == 0.0 {
            1e-12 * trace / n as f64
        } else {
            jitter * 100.0
        };
    }

    let mut l = vec![vec![0.0; n]; n];
    for i in 0..n {
        l[i][i] = a[i][i].max(0.0).sqrt();
    }
    l
}

/// `L z` for a lower-triangular `L`.
pub fn lower_mul(l: &[Vec<f64>], z: &[f64]) -> Vec<f64> {
    l.iter()
        .enumerate()
        .map(|(i, row)| (0..=i).map(|j| row[j] * z[j]).sum())
        .collect()
}
