//! Differentiable relaxation of "which neighbors do I talk to".
//!
//! Each neighbor `i` has a logit `w_i`; `beta_i = sigmoid(w_i)` is its soft
//! inclusion weight. The objective, to be maximized, is
//!
//! ```text
//! reward    = Σ beta_i · gain_i / Σ beta_i · energy_i
//! objective = reward + theta · ||w||₂
//! ```
//!
//! The gradient is derived by hand (quotient rule through the sigmoid):
//!
//! ```text
//! ∂reward/∂w_i = beta_i (1 - beta_i) (gain_i - reward · energy_i) / Σ beta_j · energy_j
//! ∂(θ||w||)/∂w_i = θ · w_i / ||w||        (0 when w = 0)
//! ```

use crate::error::{SelectionError, SelectionResult};

/// Floor for the energy denominator. When every selected neighbor costs
/// nothing the ratio would divide by zero; the floor keeps it finite and the
/// denominator is then treated as constant for the gradient.
pub const ENERGY_EPSILON: f64 = 1e-8;

pub fn sigmoid(x: f64) -> f64 {
    1.0 / (1.0 + (-x).exp())
}

pub struct SelectionObjective<'a> {
    gain: &'a [f64],
    energy: &'a [f64],
    theta: f64,
}

impl<'a> SelectionObjective<'a> {
    /// Gains and (scaled) energies must be aligned with the logits and finite.
    pub fn new(gain: &'a [f64], energy: &'a [f64], theta: f64) -> SelectionResult<Self> {
        if gain.len() != energy.len() {
            return Err(SelectionError::InvalidInput(format!(
                "{} knowledge gains but {} energies",
                gain.len(),
                energy.len()
            )));
        }
        if let Some(i) = gain.iter().position(|g| !g.is_finite()) {
            return Err(SelectionError::unstable(0, format!("knowledge gain of neighbor {i} is {}", gain[i])));
        }
        if let Some(i) = energy.iter().position(|e| !e.is_finite()) {
            return Err(SelectionError::unstable(0, format!("scaled energy of neighbor {i} is {}", energy[i])));
        }
        Ok(SelectionObjective { gain, energy, theta })
    }

    pub fn len(&self) -> usize {
        self.gain.len()
    }

    pub fn is_empty(&self) -> bool {
        self.gain.is_empty()
    }

    /// Objective value at `w`.
    pub fn value(&self, w: &[f64]) -> f64 {
        self.evaluate(w).0
    }

    /// Objective value and its gradient with respect to `w`.
    pub fn evaluate(&self, w: &[f64]) -> (f64, Vec<f64>) {
        assert_eq!(w.len(), self.len(), "one logit per neighbor");

        let betas: Vec<f64> = w.iter().map(|&x| sigmoid(x)).collect();
        let num: f64 = betas.iter().zip(self.gain).map(|(b, g)| b * g).sum();
        let raw_den: f64 = betas.iter().zip(self.energy).map(|(b, e)| b * e).sum();
        let floored = raw_den < ENERGY_EPSILON;
        let den = if floored { ENERGY_EPSILON } else { raw_den };

        let reward = num / den;
        let norm = w.iter().map(|x| x * x).sum::<f64>().sqrt();
        let value = reward + self.theta * norm;

        let grad = (0..self.len())
            .map(|i| {
                let dsig = betas[i] * (1.0 - betas[i]);
                let d_reward = if floored {
                    dsig * self.gain[i] / den
                } else {
                    dsig * (self.gain[i] - reward * self.energy[i]) / den
                };
                let d_reg = if norm > 0.0 { self.theta * w[i] / norm } else { 0.0 };
                d_reward + d_reg
            })
            .collect();

        (value, grad)
    }
}
