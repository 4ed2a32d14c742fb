//! Error taxonomy for the job workflow.

use thiserror::Error;

use crate::validation::ValidationIssue;

/// Conflicting-state rejections surfaced as their own class so callers can
/// report them as non-fatal conditions.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ConflictKind {
    AlreadyCompleted,
    AlreadyPaid,
    AlreadyReleased,
    /// Release was requested before the payment reached the paid state.
    NotPaid,
}

impl std::fmt::Display for ConflictKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(match self {
            Self::AlreadyCompleted => "job is already completed",
            Self::AlreadyPaid => "job is already paid",
            Self::AlreadyReleased => "payment is already released",
            Self::NotPaid => "payment has not been registered yet",
        })
    }
}

/// Opaque infrastructure failure from a storage backend.
///
/// The workflow does not retry these; they propagate verbatim to the caller.
#[derive(Debug, Error)]
#[error("storage backend failure: {0}")]
pub struct StoreError(#[from] pub anyhow::Error);

impl StoreError {
    pub fn new(source: impl Into<anyhow::Error>) -> Self {
        Self(source.into())
    }
}

/// Errors that may surface from any workflow operation.
#[derive(Debug, Error)]
pub enum WorkflowError {
    #[error("validation failed")]
    Validation(Vec<ValidationIssue>),

    #[error("{0} not found")]
    NotFound(&'static str),

    #[error("forbidden: {0}")]
    Forbidden(String),

    #[error("conflict: {0}")]
    Conflict(ConflictKind),

    #[error(transparent)]
    Storage(#[from] StoreError),
}

impl WorkflowError {
    pub fn forbidden(reason: impl Into<String>) -> Self {
        Self::Forbidden(reason.into())
    }

    /// Whether the error comes from the conflict class (already
    /// completed/paid/released) rather than a hard failure.
    #[inline]
    pub fn is_conflict(&self) -> bool {
        matches!(self, Self::Conflict(_))
    }
}
