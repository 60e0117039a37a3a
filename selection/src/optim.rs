// ─── Adam Optimizer ─────────────────────────────────────────────────

/// Adam with bias-corrected first/second moment estimates.
///
/// `step` applies the update in place. With `maximize` set the parameters
/// move along the gradient instead of against it.
#[derive(Debug, Clone)]
pub struct Adam {
    pub lr: f64,
    pub beta1: f64,
    pub beta2: f64,
    pub eps: f64,
    pub maximize: bool,
    m: Vec<f64>,
    v: Vec<f64>,
    t: usize,
}

impl Adam {
    pub fn new(n_params: usize, lr: f64) -> Self {
        Adam {
            lr, beta1: 0.9, beta2: 0.999, eps: 1e-8,
            maximize: false,
            m: vec![0.0; n_params],
            v: vec![0.0; n_params],
            t: 0,
        }
    }

    pub fn maximizing(mut self) -> Self {
        self.maximize = true;
        self
    }

    pub fn step(&mut self, params: &mut [f64], grads: &[f64]) {
        assert_eq!(params.len(), self.m.len());
        assert_eq!(grads.len(), self.m.len());

        self.t += 1;
        let bias_correction1 = 1.0 - self.beta1.powi(self.t as i32);
        let bias_correction2 = 1.0 - self.beta2.powi(self.t as i32);
        let sign = if self.maximize { 1.0 } else { -1.0 };

        for i in 0..grads.len() {
            self.m[i] = self.beta1 * self.m[i] + (1.0 - self.beta1) * grads[i];
            self.v[i] = self.beta2 * self.v[i] + (1.0 - self.beta2) * grads[i] * grads[i];
            let m_hat = self.m[i] / bias_correction1;
            let v_hat = self.v[i] / bias_correction2;
            params[i] += sign * self.lr * m_hat / (v_hat.sqrt() + self.eps);
        }
    }

    /// Number of steps taken so far.
    pub fn steps(&self) -> usize {
        self.t
    }
}
