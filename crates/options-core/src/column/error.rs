//! Column Errors

use std::fmt;

use thiserror::Error;

use crate::domain::{OptionId, ValidationError};
use crate::escalation::EscalationError;
use crate::repository::RepositoryError;

pub type ColumnResult<T> = Result<T, ColumnError>;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MutationKind {
    Create,
    Update,
    Delete,
    Reorder,
}

impl fmt::Display for MutationKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            MutationKind::Create => "create",
            MutationKind::Update => "update",
            MutationKind::Delete => "delete",
            MutationKind::Reorder => "reorder",
        })
    }
}

/// Failure of a column operation. None of these is fatal; the column
/// stays usable and the user can retry.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ColumnError {
    /// Load failed; the previous list is kept
    #[error("could not load {level}: {source}")]
    FetchFailed {
        level: String,
        source: RepositoryError,
    },

    /// Rejected before any call was made
    #[error(transparent)]
    ValidationFailed(#[from] ValidationError),

    /// Backend refused a change; the form or confirmation stays open
    #[error("could not {action} {subject}: {source}")]
    MutationFailed {
        action: MutationKind,
        subject: String,
        source: RepositoryError,
    },

    /// Edit of an item the column does not currently list
    #[error("{id} is not listed in {level}; reload and try again")]
    UnknownItem { level: String, id: OptionId },

    /// Confirmation given with no deletion pending
    #[error("deletion was cancelled")]
    EscalationAborted,

    /// Another change is still running on this column
    #[error("{level} is still saving a previous change")]
    Busy { level: String },

    #[error(transparent)]
    Escalation(#[from] EscalationError),
}
