//! Local linear trend plus dummy seasonal state-space model.
//!
//! State vector (dimension `num_seasons + 1`):
//! `[level, slope, s_0, s_1, ..., s_{m-2}]` where `s_0` is the seasonal
//! effect of the current period. Dynamics:
//!
//! ```text
//! level' = level + slope + e_level
//! slope' = slope + e_slope
//! s_0'   = -(s_0 + ... + s_{m-2}) + e_season
//! s_j'   = s_{j-1}                     (j >= 1)
//! y      = level + s_0 + e_obs
//! ```
//!
//! The transition matrix is applied implicitly, so a filter step costs
//! `O(d^2)` instead of `O(d^3)`.

use crate::utils::linalg::{cholesky_psd, lower_mul};
use rand::Rng;
use rand_distr::StandardNormal;
use std::f64::consts::PI;

/// Standard deviations of the four noise terms.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct NoiseScales {
    pub observation: f64,
    pub level: f64,
    pub slope: f64,
    pub seasonal: f64,
}

impl NoiseScales {
    pub fn from_array(values: [f64; 4]) -> Self {
        Self {
            observation: values[0],
            level: values[1],
            slope: values[2],
            seasonal: values[3],
        }
    }

    pub fn to_array(self) -> [f64; 4] {
        [self.observation, self.level, self.slope, self.seasonal]
    }
}

/// Gaussian state estimate `N(mean, cov)`.
#[derive(Debug, Clone, PartialEq)]
pub struct StateEstimate {
    pub mean: Vec<f64>,
    pub cov: Vec<Vec<f64>>,
}

/// Result of running the Kalman filter over a series.
#[derive(Debug, Clone)]
pub struct FilterOutput {
    /// Marginal log-likelihood of the observations.
    pub log_likelihood: f64,
    /// One-step-ahead state prediction for the period after the last
    /// observation.
    pub next_state: StateEstimate,
}

/// Trend + seasonal model with fixed noise scales.
#[derive(Debug, Clone)]
pub struct LocalTrendSeasonal {
    num_seasons: usize,
    scales: NoiseScales,
}

impl LocalTrendSeasonal {
    pub fn new(num_seasons: usize, scales: NoiseScales) -> Self {
        Self {
            num_seasons,
            scales,
        }
    }

    pub fn state_dim(&self) -> usize {
        self.num_seasons + 1
    }

    pub fn scales(&self) -> NoiseScales {
        self.scales
    }

    /// Diffuse-ish prior for the first state: level at the first observation,
    /// every component with standard deviation `spread`.
    pub fn initial_state(&self, first: f64, spread: f64) -> StateEstimate {
        let d = self.state_dim();
        let mut mean = vec![0.0; d];
        mean[0] = first;
        let mut cov = vec![vec![0.0; d]; d];
        for (i, row) in cov.iter_mut().enumerate() {
            row[i] = spread * spread;
        }
        StateEstimate { mean, cov }
    }

    /// `T x` for a state vector.
    pub fn transition(&self, x: &[f64]) -> Vec<f64> {
        let d = self.state_dim();
        let mut out = vec![0.0; d];
        out[0] = x[0] + x[1];
        out[1] = x[1];
        out[2] = -x[2..].iter().sum::<f64>();
        out[3..d].copy_from_slice(&x[2..d - 1]);
        out
    }

    /// `T M` for a square matrix, row by row.
    fn transition_left(&self, m: &[Vec<f64>]) -> Vec<Vec<f64>> {
        let d = self.state_dim();
        let mut out = Vec::with_capacity(d);
        out.push(m[0].iter().zip(&m[1]).map(|(a, b)| a + b).collect::<Vec<f64>>());
        out.push(m[1].clone());
        let mut seasonal = vec![0.0; d];
        for row in &m[2..] {
            for (s, v) in seasonal.iter_mut().zip(row) {
                *s -= v;
            }
        }
        out.push(seasonal);
        for row in &m[2..d - 1] {
            out.push(row.clone());
        }
        out
    }

    /// Time update of a state estimate: `(T a, T P T' + Q)`.
    pub fn predict(&self, state: &StateEstimate) -> StateEstimate {
        let tp = self.transition_left(&state.cov);
        let tp_t = transpose(&tp);
        let mut cov = self.transition_left(&tp_t);
        cov[0][0] += self.scales.level.powi(2);
        cov[1][1] += self.scales.slope.powi(2);
        cov[2][2] += self.scales.seasonal.powi(2);
        symmetrize(&mut cov);
        StateEstimate {
            mean: self.transition(&state.mean),
            cov,
        }
    }

    /// Mean and variance of the observation implied by a state estimate.
    pub fn observation_moments(&self, state: &StateEstimate) -> (f64, f64) {
        let p = &state.cov;
        let mean = state.mean[0] + state.mean[2];
        let var = p[0][0] + p[0][2] + p[2][0] + p[2][2] + self.scales.observation.powi(2);
        (mean, var)
    }

    /// Kalman filter from `initial` over `series`.
    pub fn filter(&self, series: &[f64], initial: StateEstimate) -> FilterOutput {
        let d = self.state_dim();
        let mut state = initial;
        let mut log_likelihood = 0.0;

        for &y in series {
            let (pred, f) = self.observation_moments(&state);
            let v = y - pred;
            log_likelihood -= 0.5 * ((2.0 * PI).ln() + f.ln() + v * v / f);

            // P Z' with Z selecting level and the current season
            let pz: Vec<f64> = (0..d).map(|i| state.cov[i][0] + state.cov[i][2]).collect();
            for i in 0..d {
                state.mean[i] += pz[i] * v / f;
            }
            for i in 0..d {
                for j in 0..d {
                    state.cov[i][j] -= pz[i] * pz[j] / f;
                }
            }
            state = self.predict(&state);
        }

        FilterOutput {
            log_likelihood,
            next_state: state,
        }
    }

    /// Observation mean and variance for `steps` periods after `start`.
    pub fn forecast_moments(&self, start: &StateEstimate, steps: usize) -> Vec<(f64, f64)> {
        let mut state = start.clone();
        let mut out = Vec::with_capacity(steps);
        for k in 0..steps {
            out.push(self.observation_moments(&state));
            if k + 1 < steps {
                state = self.predict(&state);
            }
        }
        out
    }

    /// One simulated observation path of `steps` periods, starting from a
    /// state drawn from `start` (given as mean and Cholesky factor).
    pub fn simulate<R: Rng>(
        &self,
        mean: &[f64],
        chol: &[Vec<f64>],
        steps: usize,
        rng: &mut R,
    ) -> Vec<f64> {
        let d = self.state_dim();
        let z: Vec<f64> = (0..d).map(|_| rng.sample(StandardNormal)).collect();
        let mut x: Vec<f64> = lower_mul(chol, &z)
            .iter()
            .zip(mean)
            .map(|(dz, m)| m + dz)
            .collect();

        let mut path = Vec::with_capacity(steps);
        for _ in 0..steps {
            let eps: f64 = rng.sample(StandardNormal);
            path.push(x[0] + x[2] + self.scales.observation * eps);

            x = self.transition(&x);
            let e_level: f64 = rng.sample(StandardNormal);
            let e_slope: f64 = rng.sample(StandardNormal);
            let e_season: f64 = rng.sample(StandardNormal);
            x[0] += self.scales.level * e_level;
            x[1] += self.scales.slope * e_slope;
            x[2] += self.scales.seasonal * e_season;
        }
        path
    }

    /// Cholesky factor of a state covariance, tolerant of near-singularity.
    pub fn state_factor(&self, state: &StateEstimate) -> Vec<Vec<f64>> {
        cholesky_psd(&state.cov)
    }
}

fn transpose(m: &[Vec<f64>]) -> Vec<Vec<f64>> {
    let n = m.len();
    (0..n).map(|j| (0..n).map(|i| m[i][j]).collect()).collect()
}

fn symmetrize(m: &mut [Vec<f64>]) {
    let n = m.len();
    for i in 0..n {
        for j in (i + 1)..n {
            let avg = 0.5 * (m[i][j] + m[j][i]);
            m[i][j] = avg;
            m[j][i] = avg;
        }
    }
}
