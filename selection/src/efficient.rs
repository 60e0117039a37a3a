//! Energy-efficient peer selection.
//!
//! Picks the neighbors that maximize knowledge gain per unit of
//! communication energy by gradient ascent on a sigmoid relaxation of the
//! keep/drop mask (see [`crate::objective`]), then rounds the soft mask.

use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

use crate::config::OptimizerConfig;
use crate::early_stop::EarlyStopping;
use crate::error::{SelectionError, SelectionResult};
use crate::node::Node;
use crate::objective::{sigmoid, SelectionObjective};
use crate::optim::Adam;
use crate::scaling::min_max_scale;

/// Outcome of one optimization run.
#[derive(Debug, Clone)]
pub struct Optimization {
    /// Final logits
    pub weights: Vec<f64>,
    /// `sigmoid(weights)`
    pub betas: Vec<f64>,
    /// `betas[i] >= 0.5`
    pub mask: Vec<bool>,
    /// Last objective value evaluated
    pub objective: f64,
    /// Objective evaluations performed
    pub iterations: usize,
    /// Stopped by the plateau rule rather than the iteration cap
    pub converged: bool,
}

impl Optimization {
    /// Peers whose mask entry is set, in their original order.
    pub fn keep<P: Clone>(&self, peers: &[P]) -> Vec<P> {
        assert_eq!(peers.len(), self.mask.len());
        peers.iter()
            .zip(&self.mask)
            .filter(|(_, &keep)| keep)
            .map(|(p, _)| p.clone())
            .collect()
    }
}

#[derive(Debug, Clone, Default)]
pub struct EfficientSelector {
    pub config: OptimizerConfig,
}

impl EfficientSelector {
    pub fn new(config: OptimizerConfig) -> Self {
        Self { config }
    }

    /// Select peers for `node`, drawing initial logits from the configured
    /// seed or, without one, from `rng`.
    pub fn select<N, R>(&self, node: &N, rng: &mut R) -> SelectionResult<Vec<N::Peer>>
    where
        N: Node,
        R: Rng + ?Sized,
    {
        let (peers, _) = self.select_with_outcome(node, rng)?;
        Ok(peers)
    }

    /// Like [`select`](Self::select) but also returns the optimization
    /// outcome. The outcome is `None` when the node has no neighbors.
    pub fn select_with_outcome<N, R>(
        &self,
        node: &N,
        rng: &mut R,
    ) -> SelectionResult<(Vec<N::Peer>, Option<Optimization>)>
    where
        N: Node,
        R: Rng + ?Sized,
    {
        let neighbors = node.neighbors();
        if neighbors.is_empty() {
            return Ok((Vec::new(), None));
        }

        let gain: Vec<f64> = neighbors.iter().map(|p| node.knowledge_gain(p)).collect();
        let energy: Vec<f64> = neighbors.iter().map(|p| node.communication_energy(p)).collect();
        let energy = min_max_scale(&energy, 0.0, node.lookup_energy());

        let outcome = match self.config.seed {
            Some(seed) => self.optimize_with_rng(&gain, &energy, &mut StdRng::seed_from_u64(seed))?,
            None => self.optimize_with_rng(&gain, &energy, rng)?,
        };

        tracing::debug!(
            node = %node.node_id(),
            neighbors = neighbors.len(),
            selected = outcome.mask.iter().filter(|&&m| m).count(),
            iterations = outcome.iterations,
            converged = outcome.converged,
            "Efficient selection done"
        );

        Ok((outcome.keep(neighbors), Some(outcome)))
    }

    /// Run the optimization on already-scaled energies, seeded from the
    /// config (or OS entropy when no seed is set).
    pub fn optimize(&self, gain: &[f64], energy: &[f64]) -> SelectionResult<Optimization> {
        match self.config.seed {
            Some(seed) => self.optimize_with_rng(gain, energy, &mut StdRng::seed_from_u64(seed)),
            None => self.optimize_with_rng(gain, energy, &mut StdRng::from_entropy()),
        }
    }

    pub fn optimize_with_rng<R: Rng + ?Sized>(
        &self,
        gain: &[f64],
        energy: &[f64],
        rng: &mut R,
    ) -> SelectionResult<Optimization> {
        let cfg = &self.config;
        cfg.validate()?;
        let n = gain.len();
        let objective = SelectionObjective::new(gain, energy, cfg.theta)?;

        let mut weights: Vec<f64> = (0..n).map(|_| rng.gen::<f64>()).collect();
        let mut adam = Adam::new(n, cfg.learning_rate).maximizing();
        let mut early_stopping = EarlyStopping::new(cfg.patience, cfg.delta);

        let mut loss = f64::NAN;
        let mut iterations = 0;
        let mut converged = false;

        for epoch in 0..cfg.max_iterations {
            let (value, grad) = objective.evaluate(&weights);
            iterations = epoch + 1;
            check_finite(iterations, value, &grad)?;

            adam.step(&mut weights, &grad);
            if weights.iter().any(|w| !w.is_finite()) {
                return Err(SelectionError::unstable(iterations, "logits diverged after Adam step"));
            }
            loss = value;

            if epoch % cfg.log_interval == 0 || iterations == cfg.max_iterations {
                tracing::debug!(
                    "Epoch [{:>3}/{:>3}] - Loss = {:.3}",
                    iterations,
                    cfg.max_iterations,
                    value
                );
            }
            if early_stopping.stop(value) {
                tracing::info!(
                    "Early stopping at epoch [{:>3}/{:>3}] - Loss = {:.3}",
                    iterations,
                    cfg.max_iterations,
                    value
                );
                converged = true;
                break;
            }
        }

        let betas: Vec<f64> = weights.iter().map(|&w| sigmoid(w)).collect();
        let mask = threshold(&betas);

        Ok(Optimization {
            weights,
            betas,
            mask,
            objective: loss,
            iterations,
            converged,
        })
    }
}

/// Round soft inclusion weights to keep/drop. An exact 0.5 is kept.
fn threshold(betas: &[f64]) -> Vec<bool> {
    betas.iter().map(|&b| b >= 0.5).collect()
}

fn check_finite(iteration: usize, value: f64, grad: &[f64]) -> SelectionResult<()> {
    if !value.is_finite() {
        return Err(SelectionError::unstable(iteration, format!("objective is {value}")));
    }
    if let Some(i) = grad.iter().position(|g| !g.is_finite()) {
        return Err(SelectionError::unstable(iteration, format!("gradient of logit {i} is {}", grad[i])));
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testing::FakeNode;

    fn seeded(seed: u64) -> EfficientSelector {
        EfficientSelector::new(OptimizerConfig { seed: Some(seed), ..Default::default() })
    }

    fn scenario() -> FakeNode {
        FakeNode::new(vec![10.0, 1.0, 1.0], vec![1.0, 10.0, 10.0], 10.0)
    }

    #[test]
    fn test_empty_neighbors_skip_optimization() {
        let node = FakeNode::new(vec![], vec![], 10.0);
        let (peers, outcome) = seeded(1)
            .select_with_outcome(&node, &mut rand::thread_rng())
            .unwrap();
        assert!(peers.is_empty());
        assert!(outcome.is_none());
        assert_eq!(node.collaborator_calls(), 0);
    }

    #[test]
    fn test_collaborators_called_once_per_neighbor() {
        let node = scenario();
        seeded(3).select(&node, &mut rand::thread_rng()).unwrap();
        assert_eq!(node.gain_calls.get(), 3);
        assert_eq!(node.energy_calls.get(), 3);
        assert_eq!(node.lookup_calls.get(), 1);
    }

    #[test]
    fn test_cheap_high_gain_neighbor_wins() {
        let node = scenario();
        for seed in 0..10 {
            let peers = seeded(seed).select(&node, &mut rand::thread_rng()).unwrap();
            assert!(peers.contains(&0), "seed {seed}: neighbor 0 must be selected, got {peers:?}");
            assert!(peers.len() <= 2, "seed {seed}: at most one of the costly neighbors, got {peers:?}");
            assert!(peers.windows(2).all(|w| w[0] < w[1]), "order must be preserved");
        }
    }

    #[test]
    fn test_seeded_runs_are_deterministic() {
        let node = FakeNode::new(vec![3.0, 1.0, 2.5, 0.2, 4.0], vec![2.0, 1.0, 8.0, 0.5, 6.0], 10.0);
        let (a, oa) = seeded(42).select_with_outcome(&node, &mut rand::thread_rng()).unwrap();
        let (b, ob) = seeded(42).select_with_outcome(&node, &mut rand::thread_rng()).unwrap();
        assert_eq!(a, b);
        assert_eq!(oa.unwrap().weights, ob.unwrap().weights);
    }

    #[test]
    fn test_unseeded_uses_supplied_rng() {
        let node = scenario();
        let selector = EfficientSelector::default();
        let (_, oa) = selector.select_with_outcome(&node, &mut StdRng::seed_from_u64(9)).unwrap();
        let (_, ob) = selector.select_with_outcome(&node, &mut StdRng::seed_from_u64(9)).unwrap();
        assert_eq!(oa.unwrap().weights, ob.unwrap().weights);
    }

    #[test]
    fn test_higher_gain_does_not_lower_beta() {
        let energy = [0.5, 0.5, 0.5];
        let mean_beta0 = |gain: &[f64]| {
            let seeds = 0..8u64;
            let total: f64 = seeds.clone()
                .map(|s| seeded(s).optimize(gain, &energy).unwrap().betas[0])
                .sum();
            total / seeds.count() as f64
        };
        let low = mean_beta0(&[0.5, 2.0, 2.0]);
        let high = mean_beta0(&[4.0, 2.0, 2.0]);
        assert!(high >= low, "raising gain lowered beta0: {low:.4} -> {high:.4}");
        assert!(low < 0.5 && high > 0.5);
    }

    #[test]
    fn test_flat_objective_converges_early() {
        // A single neighbor's reward is gain / energy whatever its logit;
        // with no regularization the objective never moves.
        let selector = EfficientSelector::new(OptimizerConfig {
            theta: 0.0,
            seed: Some(5),
            ..Default::default()
        });
        let outcome = selector.optimize(&[3.0], &[0.5]).unwrap();
        assert!(outcome.converged);
        assert_eq!(outcome.iterations, selector.config.patience + 2);
        assert!((outcome.objective - 6.0).abs() < 1e-9);
    }

    #[test]
    fn test_iteration_cap_is_not_an_error() {
        let selector = EfficientSelector::new(OptimizerConfig {
            max_iterations: 5,
            seed: Some(0),
            ..Default::default()
        });
        let outcome = selector.optimize(&[10.0, 1.0, 1.0], &[0.1, 1.0, 1.0]).unwrap();
        assert!(!outcome.converged);
        assert_eq!(outcome.iterations, 5);
        assert_eq!(outcome.mask.len(), 3);
    }

    #[test]
    fn test_zero_energy_neighbors_stay_finite() {
        let node = FakeNode::new(vec![1.0, 2.0], vec![0.0, 0.0], 10.0);
        let (peers, outcome) = seeded(11)
            .select_with_outcome(&node, &mut rand::thread_rng())
            .unwrap();
        let outcome = outcome.unwrap();
        assert!(outcome.objective.is_finite());
        assert_eq!(peers, vec![0, 1]);
    }

    #[test]
    fn test_invalid_config_is_rejected_before_running() {
        let zero_interval = EfficientSelector::new(OptimizerConfig { log_interval: 0, ..Default::default() });
        let err = zero_interval.optimize(&[1.0, 2.0], &[0.5, 0.5]).unwrap_err();
        assert!(matches!(err, SelectionError::InvalidConfig(_)));

        let no_iterations = EfficientSelector::new(OptimizerConfig { max_iterations: 0, ..Default::default() });
        let err = no_iterations.optimize(&[1.0, 2.0], &[0.5, 0.5]).unwrap_err();
        assert!(matches!(err, SelectionError::InvalidConfig(_)));

        let node = scenario();
        assert!(no_iterations.select(&node, &mut rand::thread_rng()).is_err());
    }

    #[test]
    fn test_misaligned_scores_are_an_error() {
        let err = seeded(0).optimize(&[1.0, 2.0], &[0.5]).unwrap_err();
        assert!(matches!(err, SelectionError::InvalidInput(_)));
    }

    #[test]
    fn test_non_finite_gain_is_fatal() {
        let node = FakeNode::new(vec![1.0, f64::NAN], vec![1.0, 1.0], 10.0);
        let err = seeded(0).select(&node, &mut rand::thread_rng()).unwrap_err();
        assert!(matches!(err, SelectionError::NumericInstability { .. }));
    }

    #[test]
    fn test_keep_follows_mask_in_order() {
        let weights = vec![0.0, -0.1, 2.0];
        let betas: Vec<f64> = weights.iter().map(|&w| sigmoid(w)).collect();
        let mask = threshold(&betas);
        let outcome = Optimization {
            weights,
            betas,
            mask,
            objective: 0.0,
            iterations: 0,
            converged: false,
        };
        assert_eq!(outcome.keep(&["a", "b", "c"]), vec!["a", "c"]);
    }

    #[test]
    fn test_threshold_keeps_exact_half() {
        assert_eq!(threshold(&[0.5, 0.4999, 0.5001, 0.0, 1.0]), vec![true, false, true, false, true]);
    }
}
