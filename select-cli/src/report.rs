use anyhow::{Context, Result};
use chrono::{DateTime, Utc};
use gaia_selection::{SelectorConfig, SelectorFactory, SelectorId};
use rayon::prelude::*;
use serde::{Deserialize, Serialize};

use crate::snapshot::{NodeId, Snapshot};

/// What every node decided this round.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RoundReport {
    pub generated_at: DateTime<Utc>,
    pub selector: String,
    pub nodes: Vec<NodeReport>,
    /// Total communication energy of all selected exchanges
    pub communication_energy: f64,
    /// Human-readable total, e.g. "12.50 mJ"
    pub summary: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NodeReport {
    pub node_id: NodeId,
    pub selector_id: SelectorId,
    pub neighbors: usize,
    pub selected: Vec<NodeId>,
    pub communication_energy: f64,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub iterations: Option<usize>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub converged: Option<bool>,
}

/// Format a communication energy total in millijoules.
pub fn format_energy(joules: f64) -> String {
    format!("{:.2} mJ", joules * 1e3)
}

/// Run one selection round over every node in the snapshot.
///
/// Each node gets its own selector; selections share no state and run in
/// parallel. Reports come back in snapshot order.
pub fn run_round(snapshot: &Snapshot, config: &SelectorConfig) -> Result<RoundReport> {
    let mut factory = SelectorFactory::new();
    let selectors = snapshot.nodes.iter()
        .map(|_| factory.build(config.clone()))
        .collect::<Result<Vec<_>, _>>()
        .context("Failed to build selectors")?;

    let nodes = snapshot.nodes.par_iter()
        .zip(selectors.par_iter())
        .map(|(node, selector)| -> Result<NodeReport> {
            let (peers, outcome) = selector
                .select_with_outcome(node, &mut rand::thread_rng())
                .with_context(|| format!("Selection failed for node {}", node.node_id))?;
            Ok(NodeReport {
                node_id: node.node_id.clone(),
                selector_id: selector.id(),
                neighbors: node.neighbors.len(),
                communication_energy: peers.iter().map(|p| p.energy).sum(),
                selected: peers.into_iter().map(|p| p.node_id).collect(),
                iterations: outcome.as_ref().map(|o| o.iterations),
                converged: outcome.as_ref().map(|o| o.converged),
            })
        })
        .collect::<Result<Vec<_>>>()?;

    let communication_energy: f64 = nodes.iter().map(|n| n.communication_energy).sum();
    let selected: usize = nodes.iter().map(|n| n.selected.len()).sum();
    tracing::info!(
        nodes = nodes.len(),
        selected = selected,
        energy = %format_energy(communication_energy),
        "📡 Selection round complete"
    );

    Ok(RoundReport {
        generated_at: Utc::now(),
        selector: selectors.first().map(|s| s.to_string()).unwrap_or_default(),
        nodes,
        communication_energy,
        summary: format_energy(communication_energy),
    })
}
