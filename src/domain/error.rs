//! Domain-level errors (no external dependencies)

use thiserror::Error;

/// Domain errors describe category forest invariant violations.
///
/// The selector tolerates all of them; they are reported, never raised by
/// toggling or filtering.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum DomainError {
    #[error("cycle detected in category hierarchy at: {0}")]
    CycleDetected(String),

    #[error("category has more than one parent: {0}")]
    MultipleParents(String),

    #[error("unknown category: {0}")]
    UnknownCategory(String),
}
