//! Test fixtures.

use std::cell::Cell;

use crate::node::Node;

/// A node whose neighbors are the indices `0..n` into its score tables.
/// Counts every collaborator call.
pub struct FakeNode {
    pub peers: Vec<usize>,
    pub gains: Vec<f64>,
    pub energies: Vec<f64>,
    pub lookup: f64,
    pub gain_calls: Cell<usize>,
    pub energy_calls: Cell<usize>,
    pub lookup_calls: Cell<usize>,
}

impl FakeNode {
    pub fn new(gains: Vec<f64>, energies: Vec<f64>, lookup: f64) -> Self {
        assert_eq!(gains.len(), energies.len());
        FakeNode {
            peers: (0..gains.len()).collect(),
            gains,
            energies,
            lookup,
            gain_calls: Cell::new(0),
            energy_calls: Cell::new(0),
            lookup_calls: Cell::new(0),
        }
    }

    pub fn collaborator_calls(&self) -> usize {
        self.gain_calls.get() + self.energy_calls.get() + self.lookup_calls.get()
    }
}

impl Node for FakeNode {
    type Peer = usize;

    fn node_id(&self) -> &str {
        "fake"
    }

    fn neighbors(&self) -> &[usize] {
        &self.peers
    }

    fn knowledge_gain(&self, peer: &usize) -> f64 {
        self.gain_calls.set(self.gain_calls.get() + 1);
        self.gains[*peer]
    }

    fn communication_energy(&self, peer: &usize) -> f64 {
        self.energy_calls.set(self.energy_calls.get() + 1);
        self.energies[*peer]
    }

    fn lookup_energy(&self) -> f64 {
        self.lookup_calls.set(self.lookup_calls.get() + 1);
        self.lookup
    }
}
