use thiserror::Error;

/// Errors returned by tree operations.
#[derive(Clone, Debug, PartialEq, Eq, Error)]
pub enum TreeError {
    /// Lookup or removal of a key that is not in the tree.
    #[error("key not found")]
    KeyNotFound,
    /// A structural invariant is broken, as reported by `validate()`.
    /// The string names the failed check.
    #[error("invariant violation: {0}")]
    InvariantViolation(String),
}
