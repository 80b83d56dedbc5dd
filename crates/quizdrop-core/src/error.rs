//! Error types for reconciliation, forms, and answering sessions.
//!
//! Malformed moves are expected during normal use (a drag released outside
//! any droppable) and are recovered as no-ops. Invariant violations indicate
//! a reconciler bug and are never allowed to reach the caller as a corrupted
//! store.

use thiserror::Error;

/// Why a gesture-end event could not be resolved against the current store.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum MoveError {
    /// The drag was released outside any droppable target.
    #[error("drop has no destination")]
    NoDestination,

    /// The source container key is not part of this store.
    #[error("unknown source container: {0}")]
    UnknownSource(String),

    /// The destination container key is not part of this store.
    #[error("unknown destination container: {0}")]
    UnknownDestination(String),

    /// The source index no longer points at an item.
    #[error("source index {index} out of range for '{container}' (len {len})")]
    SourceOutOfRange {
        container: String,
        index: usize,
        len: usize,
    },
}

/// A post-reconciliation check that failed.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum InvariantViolation {
    /// An item appears more than once across the store.
    #[error("item '{item}' placed more than once")]
    Duplicate { item: String },

    /// A container holds an item outside the universe.
    #[error("unknown item '{item}' in container '{container}'")]
    Ghost { item: String, container: String },

    /// A universe item is not placed anywhere.
    #[error("item '{item}' missing from every container")]
    Missing { item: String },

    /// A single-capacity container holds more than one item.
    #[error("container '{container}' holds {len} items but has capacity 1")]
    OverCapacity { container: String, len: usize },

    /// Two containers share a key.
    #[error("duplicate container key '{0}'")]
    DuplicateContainer(String),
}

/// Errors from [`PlacementStore::try_reconcile`](crate::placement::PlacementStore::try_reconcile).
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ReconcileError {
    #[error("malformed move: {0}")]
    MalformedMove(#[from] MoveError),

    #[error("invariant violation: {0}")]
    InvariantViolation(#[from] InvariantViolation),
}

impl ReconcileError {
    /// Returns `true` if this error should be recovered silently as a no-op.
    pub fn is_malformed_move(&self) -> bool {
        matches!(self, ReconcileError::MalformedMove(_))
    }
}

/// Errors raised when preparing a form for saving.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum FormError {
    #[error("form title is empty")]
    EmptyTitle,

    #[error("form has no question with text")]
    NoQuestions,

    #[error("token '{token}' does not match word '{found}' in the sentence")]
    TokenMismatch { token: String, found: String },

    #[error("token '{0}' points past the end of the sentence")]
    TokenOutOfRange(String),

    #[error("invalid token key '{0}', expected word@index")]
    InvalidToken(String),
}

/// Errors from applying a gesture to an answering session.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum SessionError {
    #[error("form has no question at index {0}")]
    UnknownQuestion(usize),

    #[error("question {question} is a {kind} question and cannot take a {gesture} gesture")]
    GestureMismatch {
        question: usize,
        kind: String,
        gesture: &'static str,
    },

    #[error("questions not answered: {}", format_positions(.unanswered))]
    Incomplete { unanswered: Vec<usize> },

    #[error("form has no id, save it before collecting responses")]
    MissingFormId,
}

fn format_positions(positions: &[usize]) -> String {
    positions
        .iter()
        .map(|p| (p + 1).to_string())
        .collect::<Vec<_>>()
        .join(", ")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn malformed_move_classification() {
        let err: ReconcileError = MoveError::NoDestination.into();
        assert!(err.is_malformed_move());

        let err: ReconcileError = InvariantViolation::Missing { item: "a".into() }.into();
        assert!(!err.is_malformed_move());
        assert_eq!(
            err.to_string(),
            "invariant violation: item 'a' missing from every container"
        );
    }

    #[test]
    fn incomplete_lists_one_based_positions() {
        let err = SessionError::Incomplete {
            unanswered: vec![0, 2],
        };
        assert_eq!(err.to_string(), "questions not answered: 1, 3");
    }
}
