//! Errors raised while filtering a bulk read.

use outpost_persistence::error::{AuthorizationError, StorageError};
use thiserror::Error;

/// Why a filtered bulk read could not be answered.
///
/// Forbidden documents are not errors; they become stub rows.
#[derive(Error, Debug)]
pub enum FilterError {
    /// An id list or key parameter could not be parsed.
    #[error("malformed request: {message}")]
    MalformedRequest {
        /// What was wrong with the request.
        message: String,
    },

    /// The caller could not be resolved to an authorization context.
    #[error(transparent)]
    Authorization(#[from] AuthorizationError),

    /// The store failed; propagated unchanged.
    #[error(transparent)]
    Storage(#[from] StorageError),
}

impl FilterError {
    pub(crate) fn malformed(message: impl Into<String>) -> Self {
        FilterError::MalformedRequest {
            message: message.into(),
        }
    }
}

/// Result type alias for filtering operations.
pub type FilterResult<T> = Result<T, FilterError>;
