//! Error types for the annotation state machine.

use thiserror::Error;

use crate::session::SessionState;

/// Errors raised while editing an annotation.
///
/// Every variant is recoverable: the operation that produced it is rejected
/// and the annotation is left exactly as it was.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum EditError {
    /// Undo requested with no snapshot in the history
    #[error("Nothing to undo")]
    EmptyHistory,

    /// Redo requested with nothing undone since the last commit
    #[error("Nothing to redo")]
    NothingToRedo,

    /// Mutation requested on a session that is not open
    #[error("Cannot {operation} while the session is {state}")]
    InvalidState {
        /// The rejected operation
        operation: &'static str,
        /// State of the session when it was requested
        state: SessionState,
    },

    /// A vertex was submitted to a rectangle that cannot take another one
    #[error("Rectangle cannot take another vertex (maximum is {max})")]
    Overflow {
        /// Maximum number of vertices a rectangle holds
        max: usize,
    },

    /// A rectangle with fewer than two vertices was submitted for commit
    #[error("Cannot commit a rectangle with {vertices} vertices")]
    IncompleteRectangle {
        /// Number of vertices the rectangle held
        vertices: usize,
    },
}

impl EditError {
    /// Create an invalid state error.
    pub fn invalid_state(operation: &'static str, state: SessionState) -> Self {
        Self::InvalidState { operation, state }
    }
}
