//! GAIA Peer Selection
//!
//! Once per training round every node decides which of its neighbors it
//! will exchange model updates with. This crate holds the strategies that
//! make that decision.
//!
//! # Architecture
//!
//! ```text
//!  round loop ──select(node)──► PeerSelector
//!                                  │
//!        ┌────────┬────────┬───────┴──────────┐
//!      None     Full    Random(p)        Efficient
//!                                            │
//!                         scale ─► objective ─► Adam ─► early stop
//!                                            │
//!                                 sigmoid(w) ≥ 0.5 ─► kept peers
//! ```
//!
//! ## Efficient selection
//! - Each neighbor gets a logit `w_i`; `sigmoid(w_i)` is a soft "keep" flag
//! - The objective rewards high knowledge gain per unit of energy spent
//! - Gradient ascent (Adam) runs until the objective plateaus or the
//!   iteration cap is hit
//! - Logits are thresholded at 0.5 into the final keep/drop mask
//!
//! Every call starts from fresh weights. Nothing carries over between rounds.

pub mod config;
pub mod early_stop;
pub mod efficient;
pub mod error;
pub mod node;
pub mod objective;
pub mod optim;
pub mod scaling;
pub mod selector;

pub use config::{OptimizerConfig, SelectorConfig};
pub use early_stop::EarlyStopping;
pub use efficient::{EfficientSelector, Optimization};
pub use error::{SelectionError, SelectionResult};
pub use node::Node;
pub use selector::{PeerSelector, SelectorFactory, SelectorId, SelectorKind};

#[cfg(test)]
pub(crate) mod testing;
