//! Repository Errors

use thiserror::Error;

use crate::domain::OptionId;

pub type RepositoryResult<T> = Result<T, RepositoryError>;

/// Failure of a single backend call
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum RepositoryError {
    /// The request never produced a response
    #[error("request failed: {0}")]
    Transport(String),

    /// Non-success HTTP status
    #[error("server responded {status}: {message}")]
    Status { status: u16, message: String },

    /// Response body did not have the expected shape
    #[error("unexpected response: {0}")]
    Decode(String),

    #[error("option {0} not found")]
    NotFound(OptionId),

    #[error("invalid API configuration: {0}")]
    InvalidConfig(String),
}

impl From<reqwest::Error> for RepositoryError {
    fn from(err: reqwest::Error) -> Self {
        if err.is_decode() {
            RepositoryError::Decode(err.to_string())
        } else {
            RepositoryError::Transport(err.to_string())
        }
    }
}
