//! Domain Errors
//!
//! Input problems caught before anything reaches the repository.

use thiserror::Error;

/// Rejected user input
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ValidationError {
    #[error("label must not be empty")]
    EmptyLabel,

    #[error("option type tag must not be empty")]
    EmptyTypeTag,

    /// A non-root level cannot create items until its parent is selected
    #[error("select a parent entry before adding to {level}")]
    MissingParent { level: String },

    #[error("'{0}' is not a WhatsApp group or contact link")]
    InvalidWhatsappLink(String),
}
