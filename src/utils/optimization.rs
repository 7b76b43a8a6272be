//! First-order stochastic optimisation used by variational inference.

/// Configuration for the Adam optimiser.
#[derive(Debug, Clone)]
pub struct AdamConfig {
    /// Step size.
    pub learning_rate: f64,
    /// Exponential decay of the first-moment estimate (default: 0.9).
    pub beta1: f64,
    /// Exponential decay of the second-moment estimate (default: 0.999).
    pub beta2: f64,
    /// Denominator guard (default: 1e-7).
    pub epsilon: f64,
}

impl Default for AdamConfig {
    fn default() -> Self {
        Self {
            learning_rate: 0.1,
            beta1: 0.9,
            beta2: 0.999,
            epsilon: 1e-7,
        }
    }
}

impl AdamConfig {
    pub fn new(learning_rate: f64) -> Self {
        Self {
            learning_rate,
            ..Default::default()
        }
    }
}

/// Adam optimiser state for a fixed-length parameter vector.
#[derive(Debug, Clone)]
pub struct Adam {
    config: AdamConfig,
    m: Vec<f64>,
    v: Vec<f64>,
    t: i32,
}

impl Adam {
    pub fn new(n_params: usize, config: AdamConfig) -> Self {
        Self {
            config,
            m: vec![0.0; n_params],
            v: vec![0.0; n_params],
            t: 0,
        }
    }

    /// Apply one descent step in place.
    pub fn step(&mut self, params: &mut [f64], grad: &[f64]) {
        self.t += 1;
        let c = &self.config;
        let bias1 = 1.0 - c.beta1.powi(self.t);
        let bias2 = 1.0 - c.beta2.powi(self.t);

        for i in 0..params.len() {
            self.m[i] = c.beta1 * self.m[i] + (1.0 - c.beta1) * grad[i];
            self.v[i] = c.beta2 * self.v[i] + (1.0 - c.beta2) * grad[i] * grad[i];
            let m_hat = self.m[i] / bias1;
            let v_hat = self.v[i] / bias2;
            params[i] -= c.learning_rate * m_hat / (v_hat.sqrt() + c.epsilon);
        }
    }

    /// Number of steps taken so far.
    pub fn steps_taken(&self) -> usize {
        self.t as usize
    }
}

/// Result of a fixed-budget Adam run.
#[derive(Debug, Clone)]
pub struct AdamResult {
    /// Parameters after the final step.
    pub optimal_point: Vec<f64>,
    /// Loss reported at each step (before that step's update).
    pub loss_curve: Vec<f64>,
}

/// Run Adam for exactly `num_steps` steps; no convergence check.
///
/// `loss_and_grad` returns the (possibly stochastic) loss and its gradient
/// at the given point.
///
/// # Example
/// ```
/// use realty_forecast::utils::optimization::{minimize_adam, AdamConfig};
///
/// let result = minimize_adam(
///     |x| ((x[0] - 3.0).powi(2), vec![2.0 * (x[0] - 3.0)]),
///     &[0.0],
///     500,
///     AdamConfig::new(0.1),
/// );
/// assert!((result.optimal_point[0] - 3.0).abs() < 0.05);
/// ```
pub fn minimize_adam<F>(
    mut loss_and_grad: F,
    initial: &[f64],
    num_steps: usize,
    config: AdamConfig,
) -> AdamResult
where
    F: FnMut(&[f64]) -> (f64, Vec<f64>),
{
    let mut params = initial.to_vec();
    let mut optimizer = Adam::new(params.len(), config);
    let mut loss_curve = Vec::with_capacity(num_steps);

    for _ in 0..num_steps {
        let (loss, grad) = loss_and_grad(&params);
        loss_curve.push(loss);
        optimizer.step(&mut params, &grad);
    }

    AdamResult {
        optimal_point: params,
        loss_curve,
    }
}

/// Central finite-difference gradient of `f` at `x`.
pub fn central_difference<F>(f: F, x: &[f64], h: f64) -> Vec<f64>
where
    F: Fn(&[f64]) -> f64,
{
    let mut point = x.to_vec();
    (0..x.len())
        .map(|i| {
            point[i] = x[i] + h;
            let up = f(&point);
            point[i] = x[i] - h;
            let down = f(&point);
            point[i] = x[i];
            (up - down) / (2.0 * h)
        })
        .collect()
}
