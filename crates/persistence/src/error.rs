//! Error types for the persistence layer.
//!
//! This module defines the error types returned by document stores and by the
//! authorization collaborator. Store errors are split between database-level
//! problems (the database does not exist) and backend problems, which are
//! further classified as "unavailable" (worth retrying in the store client)
//! or plain failures.

// Error enum variant fields are self-documenting via their #[error(...)] messages
#![allow(missing_docs)]

use thiserror::Error;

/// The primary error type for all store operations.
#[derive(Error, Debug)]
pub enum StorageError {
    /// Database-level errors
    #[error(transparent)]
    Database(#[from] DatabaseError),

    /// Backend-specific errors
    #[error(transparent)]
    Backend(#[from] BackendError),
}

impl StorageError {
    /// Returns `true` if the store could not be reached at all.
    ///
    /// Callers map this class to "service unavailable"; every other store
    /// error is reported as an internal failure.
    pub fn is_unavailable(&self) -> bool {
        matches!(
            self,
            StorageError::Backend(
                BackendError::Unavailable { .. }
                    | BackendError::ConnectionFailed { .. }
                    | BackendError::PoolExhausted { .. }
            )
        )
    }
}

/// Errors related to databases inside a store.
#[derive(Error, Debug)]
pub enum DatabaseError {
    /// The requested database does not exist.
    #[error("database not found: {db}")]
    NotFound { db: String },

    /// A database with the given name already exists.
    #[error("database already exists: {db}")]
    AlreadyExists { db: String },

    /// The document passed to a write has no usable `_id`.
    #[error("invalid document: {message}")]
    InvalidDocument { message: String },

    /// The document to delete does not exist.
    #[error("document not found: {db}/{id}")]
    DocumentNotFound { db: String, id: String },
}

/// Errors originating from the database backend.
#[derive(Error, Debug)]
pub enum BackendError {
    /// The backend is currently unavailable.
    #[error("backend unavailable: {backend_name}")]
    Unavailable {
        backend_name: String,
        message: String,
    },

    /// Connection to the backend failed.
    #[error("connection failed to {backend_name}: {message}")]
    ConnectionFailed {
        backend_name: String,
        message: String,
    },

    /// Connection pool exhausted.
    #[error("connection pool exhausted for {backend_name}")]
    PoolExhausted { backend_name: String },

    /// Schema migration error.
    #[error("schema migration failed: {message}")]
    MigrationError { message: String },

    /// Internal backend error.
    #[error("internal error in {backend_name}: {message}")]
    Internal {
        backend_name: String,
        message: String,
        #[source]
        source: Option<Box<dyn std::error::Error + Send + Sync>>,
    },

    /// Query execution error.
    #[error("query execution failed: {message}")]
    QueryError { message: String },

    /// Serialization/deserialization error.
    #[error("serialization error: {message}")]
    SerializationError { message: String },
}

/// Errors raised while resolving a caller's authorization context.
#[derive(Error, Debug)]
pub enum AuthorizationError {
    /// The caller identity does not map to any known user.
    #[error("unknown user: {user}")]
    UnknownUser { user: String },

    /// The lookup itself failed (hierarchy source unreachable, corrupt grants).
    #[error("authorization lookup failed for {user}: {message}")]
    LookupFailed { user: String, message: String },

    /// The grants document could not be parsed.
    #[error("invalid grants document: {message}")]
    InvalidGrants { message: String },
}

/// Result type alias for store operations.
pub type StorageResult<T> = Result<T, StorageError>;

/// Result type alias for authorization lookups.
pub type AuthorizationResult<T> = Result<T, AuthorizationError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_database_not_found_display() {
        let err = StorageError::from(DatabaseError::NotFound {
            db: "medic".to_string(),
        });
        assert_eq!(err.to_string(), "database not found: medic");
    }

    #[test]
    fn test_unavailable_classification() {
        let unavailable = StorageError::from(BackendError::Unavailable {
            backend_name: "sqlite".to_string(),
            message: "down".to_string(),
        });
        assert!(unavailable.is_unavailable());

        let pool = StorageError::from(BackendError::PoolExhausted {
            backend_name: "sqlite".to_string(),
        });
        assert!(pool.is_unavailable());

        let query = StorageError::from(BackendError::QueryError {
            message: "syntax".to_string(),
        });
        assert!(!query.is_unavailable());

        let missing = StorageError::from(DatabaseError::NotFound {
            db: "medic".to_string(),
        });
        assert!(!missing.is_unavailable());
    }

    #[test]
    fn test_authorization_error_display() {
        let err = AuthorizationError::UnknownUser {
            user: "chw-1".to_string(),
        };
        assert_eq!(err.to_string(), "unknown user: chw-1");
    }
}
