//! Selection error types.

use thiserror::Error;

#[derive(Debug, Error)]
pub enum SelectionError {
    /// A gain, energy, objective or gradient value stopped being finite.
    /// There is no recovery mid-run; the round's selection is abandoned.
    #[error("numeric instability at iteration {iteration}: {reason}")]
    NumericInstability { iteration: usize, reason: String },

    #[error("invalid selector config: {0}")]
    InvalidConfig(String),

    /// Score vectors that are not aligned one-to-one with the neighbors.
    #[error("invalid selection input: {0}")]
    InvalidInput(String),
}

impl SelectionError {
    pub(crate) fn unstable(iteration: usize, reason: impl Into<String>) -> Self {
        SelectionError::NumericInstability {
            iteration,
            reason: reason.into(),
        }
    }
}

/// Result type alias for selection operations.
pub type SelectionResult<T> = Result<T, SelectionError>;
