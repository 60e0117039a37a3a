use serde::{Deserialize, Serialize};

use crate::error::{SelectionError, SelectionResult};

/// Which selection strategy a node runs each round.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum SelectorConfig {
    /// Never exchange with anyone
    None,
    /// Exchange with every neighbor
    Full,
    /// Keep each neighbor independently with probability `p`
    Random { p: f64 },
    /// Gain-versus-energy optimization
    Efficient(OptimizerConfig),
}

impl Default for SelectorConfig {
    fn default() -> Self {
        SelectorConfig::Efficient(OptimizerConfig::default())
    }
}

impl SelectorConfig {
    pub fn validate(&self) -> SelectionResult<()> {
        match self {
            SelectorConfig::None | SelectorConfig::Full => Ok(()),
            SelectorConfig::Random { p } => {
                if !(0.0..=1.0).contains(p) {
                    return Err(SelectionError::InvalidConfig(format!("p must be in [0, 1], got {p}")));
                }
                Ok(())
            }
            SelectorConfig::Efficient(cfg) => cfg.validate(),
        }
    }
}

/// Knobs for the optimizing selector.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct OptimizerConfig {
    /// Weight of the L2 term on the logits
    pub theta: f64,
    /// Hard cap on gradient steps per selection
    pub max_iterations: usize,
    /// Log the objective every this many steps
    pub log_interval: usize,
    /// Adam step size
    pub learning_rate: f64,
    /// Flat steps tolerated before stopping early
    pub patience: usize,
    /// Objective change below this counts as flat
    pub delta: f64,
    /// Seed for the initial logits. `None` draws from OS entropy.
    pub seed: Option<u64>,
}

impl Default for OptimizerConfig {
    fn default() -> Self {
        Self {
            theta: 0.02,
            max_iterations: 1000,
            log_interval: 20,
            learning_rate: 0.1,
            patience: 3,
            delta: 1e-4,
            seed: None,
        }
    }
}

impl OptimizerConfig {
    pub fn validate(&self) -> SelectionResult<()> {
        let invalid = |msg: String| Err(SelectionError::InvalidConfig(msg));
        if !self.theta.is_finite() || self.theta < 0.0 {
            return invalid(format!("theta must be finite and >= 0, got {}", self.theta));
        }
        if self.max_iterations == 0 {
            return invalid("max_iterations must be at least 1".into());
        }
        if self.log_interval == 0 {
            return invalid("log_interval must be at least 1".into());
        }
        if !self.learning_rate.is_finite() || self.learning_rate <= 0.0 {
            return invalid(format!("learning_rate must be finite and > 0, got {}", self.learning_rate));
        }
        if !self.delta.is_finite() || self.delta < 0.0 {
            return invalid(format!("delta must be finite and >= 0, got {}", self.delta));
        }
        Ok(())
    }
}
