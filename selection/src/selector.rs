use std::fmt;

use rand::Rng;
use serde::{Deserialize, Serialize};

use crate::config::SelectorConfig;
use crate::efficient::{EfficientSelector, Optimization};
use crate::error::SelectionResult;
use crate::node::Node;

/// Identity of a selector, used only to attribute log lines.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct SelectorId(pub u64);

impl fmt::Display for SelectorId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// The fixed set of selection strategies.
#[derive(Debug, Clone)]
pub enum SelectorKind {
    None,
    Full,
    Random { p: f64 },
    Efficient(EfficientSelector),
}

impl From<SelectorConfig> for SelectorKind {
    fn from(config: SelectorConfig) -> Self {
        match config {
            SelectorConfig::None => SelectorKind::None,
            SelectorConfig::Full => SelectorKind::Full,
            SelectorConfig::Random { p } => SelectorKind::Random { p },
            SelectorConfig::Efficient(cfg) => SelectorKind::Efficient(EfficientSelector::new(cfg)),
        }
    }
}

impl SelectorKind {
    pub fn name(&self) -> &'static str {
        match self {
            SelectorKind::None => "none",
            SelectorKind::Full => "full",
            SelectorKind::Random { .. } => "random",
            SelectorKind::Efficient(_) => "efficient",
        }
    }
}

/// Decides, once per round, which neighbors a node exchanges with.
#[derive(Debug, Clone)]
pub struct PeerSelector {
    id: SelectorId,
    kind: SelectorKind,
}

impl PeerSelector {
    /// Build a selector with a caller-assigned id. Prefer
    /// [`SelectorFactory`] unless ids are managed elsewhere.
    pub fn new(id: SelectorId, config: SelectorConfig) -> SelectionResult<Self> {
        config.validate()?;
        let kind = SelectorKind::from(config);
        tracing::debug!(selector = %id, kind = kind.name(), "Peer selector created");
        Ok(Self { id, kind })
    }

    pub fn id(&self) -> SelectorId {
        self.id
    }

    pub fn kind(&self) -> &SelectorKind {
        &self.kind
    }

    /// Pick this round's peers using the thread-local RNG.
    pub fn select<N: Node>(&self, node: &N) -> SelectionResult<Vec<N::Peer>> {
        self.select_with_rng(node, &mut rand::thread_rng())
    }

    /// Pick this round's peers. `rng` drives the random selector and the
    /// efficient selector's initial logits when it has no seed of its own.
    pub fn select_with_rng<N, R>(&self, node: &N, rng: &mut R) -> SelectionResult<Vec<N::Peer>>
    where
        N: Node,
        R: Rng + ?Sized,
    {
        let (peers, _) = self.select_with_outcome(node, rng)?;
        Ok(peers)
    }

    /// Pick this round's peers, also returning the optimization outcome for
    /// efficient selectors that ran one.
    pub fn select_with_outcome<N, R>(
        &self,
        node: &N,
        rng: &mut R,
    ) -> SelectionResult<(Vec<N::Peer>, Option<Optimization>)>
    where
        N: Node,
        R: Rng + ?Sized,
    {
        let span = tracing::info_span!("select", selector = %self.id, node = %node.node_id());
        let _enter = span.enter();

        let neighbors = node.neighbors();
        match &self.kind {
            SelectorKind::None => Ok((Vec::new(), None)),
            SelectorKind::Full => Ok((neighbors.to_vec(), None)),
            SelectorKind::Random { p } => {
                let peers = neighbors.iter()
                    .filter(|_| rng.gen::<f64>() < *p)
                    .cloned()
                    .collect();
                Ok((peers, None))
            }
            SelectorKind::Efficient(selector) => selector.select_with_outcome(node, rng),
        }
    }
}

impl fmt::Display for PeerSelector {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.kind {
            SelectorKind::None => write!(f, "NonePeerSelector#{}", self.id),
            SelectorKind::Full => write!(f, "FullPeerSelector#{}", self.id),
            SelectorKind::Random { p } => write!(f, "RandPeerSelector#{}(p={p})", self.id),
            SelectorKind::Efficient(s) => write!(
                f,
                "EfficientPeerSelector#{}(theta={}, log_interval={})",
                self.id, s.config.theta, s.config.log_interval
            ),
        }
    }
}

/// Hands out selector ids in construction order, starting at 1.
#[derive(Debug)]
pub struct SelectorFactory {
    next_id: u64,
}

impl Default for SelectorFactory {
    fn default() -> Self {
        Self::new()
    }
}

impl SelectorFactory {
    pub fn new() -> Self {
        Self { next_id: 1 }
    }

    pub fn build(&mut self, config: SelectorConfig) -> SelectionResult<PeerSelector> {
        let selector = PeerSelector::new(SelectorId(self.next_id), config)?;
        self.next_id += 1;
        Ok(selector)
    }
}
