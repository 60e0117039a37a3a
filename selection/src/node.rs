/// The node a selector works on behalf of.
///
/// Knowledge gain and communication energy are domain specific and owned
/// by the node; selectors only read them. Index `i` into [`Node::neighbors`]
/// refers to the same peer for the whole of one `select` call.
pub trait Node {
    type Peer: Clone;

    /// Identifier used for log attribution only.
    fn node_id(&self) -> &str;

    /// Known neighbors, in a stable order.
    fn neighbors(&self) -> &[Self::Peer];

    /// Estimated value of exchanging with `peer` (higher is better).
    fn knowledge_gain(&self, peer: &Self::Peer) -> f64;

    /// Estimated energy spent exchanging with `peer` (non-negative).
    fn communication_energy(&self, peer: &Self::Peer) -> f64;

    /// Communication energy at the node's lookup distance. Used as the
    /// ceiling when scaling per-neighbor energies.
    fn lookup_energy(&self) -> f64;
}
