use anyhow::{Context, Result};
use gaia_selection::Node;
use serde::{Deserialize, Serialize};
use std::path::Path;

/// Unique node identifier
pub type NodeId = String;

/// A network frozen at the start of a round.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Snapshot {
    pub nodes: Vec<SnapshotNode>,
}

/// One node and the scores it holds for each of its neighbors.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SnapshotNode {
    pub node_id: NodeId,
    /// Communication energy at this node's lookup distance
    pub lookup_energy: f64,
    #[serde(default)]
    pub neighbors: Vec<NeighborInfo>,
}

/// A neighbor as seen from one node
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NeighborInfo {
    pub node_id: NodeId,
    pub knowledge_gain: f64,
    /// Energy spent exchanging with this neighbor
    pub energy: f64,
}

impl Node for SnapshotNode {
    type Peer = NeighborInfo;

    fn node_id(&self) -> &str {
        &self.node_id
    }

    fn neighbors(&self) -> &[NeighborInfo] {
        &self.neighbors
    }

    fn knowledge_gain(&self, peer: &NeighborInfo) -> f64 {
        peer.knowledge_gain
    }

    fn communication_energy(&self, peer: &NeighborInfo) -> f64 {
        peer.energy
    }

    fn lookup_energy(&self) -> f64 {
        self.lookup_energy
    }
}

impl Snapshot {
    pub fn load(path: &Path) -> Result<Self> {
        let raw = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read snapshot {}", path.display()))?;
        let snapshot: Snapshot = serde_json::from_str(&raw)
            .with_context(|| format!("Failed to parse snapshot {}", path.display()))?;
        tracing::info!(path = %path.display(), nodes = snapshot.nodes.len(), "Loaded network snapshot");
        Ok(snapshot)
    }
}
