//! Error types for the gateway's HTTP surface.
//!
//! This module defines all error types used throughout the REST layer, with
//! conversion to the store's native error body:
//!
//! ```json
//! {"error": "not_found", "reason": "Database does not exist."}
//! ```
//!
//! # Error Mapping
//!
//! | Source Error | HTTP Status | `error` |
//! |--------------|-------------|---------|
//! | MalformedRequest | 400 | bad_request |
//! | Missing identity / UnknownUser | 401 | unauthorized |
//! | Non-online caller on an admin endpoint | 403 | forbidden |
//! | Database NotFound | 404 | not_found |
//! | Authorization LookupFailed | 500 | authorization_lookup_failed |
//! | Store unavailable | 503 | service_unavailable |
//! | Any other store failure | 500 | internal_server_error |
//!
//! Forbidden *documents* are never errors; they are stub rows.

use axum::{
    Json,
    http::StatusCode,
    response::{IntoResponse, Response},
};
use outpost_persistence::error::{AuthorizationError, DatabaseError, StorageError};
use std::fmt;
use tracing::warn;

use crate::filter::FilterError;

/// The primary error type for REST operations.
#[derive(Debug)]
pub enum RestError {
    /// The request could not be parsed (HTTP 400).
    BadRequest {
        /// Error message.
        message: String,
    },

    /// The caller is not identified or not known (HTTP 401).
    Unauthorized {
        /// Error message.
        message: String,
    },

    /// The caller may not use this endpoint (HTTP 403).
    Forbidden {
        /// Error message.
        message: String,
    },

    /// The database does not exist (HTTP 404).
    NotFound {
        /// Error message.
        message: String,
    },

    /// The caller's authorization could not be resolved (HTTP 500).
    AuthorizationLookupFailed {
        /// Error message.
        message: String,
    },

    /// The store cannot be reached (HTTP 503).
    ServiceUnavailable {
        /// Error message.
        message: String,
    },

    /// Internal server error (HTTP 500).
    InternalError {
        /// Error message.
        message: String,
    },
}

impl fmt::Display for RestError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            RestError::BadRequest { message } => write!(f, "Bad request: {}", message),
            RestError::Unauthorized { message } => write!(f, "Unauthorized: {}", message),
            RestError::Forbidden { message } => write!(f, "Forbidden: {}", message),
            RestError::NotFound { message } => write!(f, "Not found: {}", message),
            RestError::AuthorizationLookupFailed { message } => {
                write!(f, "Authorization lookup failed: {}", message)
            }
            RestError::ServiceUnavailable { message } => {
                write!(f, "Service unavailable: {}", message)
            }
            RestError::InternalError { message } => write!(f, "Internal error: {}", message),
        }
    }
}

impl std::error::Error for RestError {}

impl RestError {
    /// Returns the HTTP status and the native `error` code.
    pub fn status_and_code(&self) -> (StatusCode, &'static str) {
        match self {
            RestError::BadRequest { .. } => (StatusCode::BAD_REQUEST, "bad_request"),
            RestError::Unauthorized { .. } => (StatusCode::UNAUTHORIZED, "unauthorized"),
            RestError::Forbidden { .. } => (StatusCode::FORBIDDEN, "forbidden"),
            RestError::NotFound { .. } => (StatusCode::NOT_FOUND, "not_found"),
            RestError::AuthorizationLookupFailed { .. } => (
                StatusCode::INTERNAL_SERVER_ERROR,
                "authorization_lookup_failed",
            ),
            RestError::ServiceUnavailable { .. } => {
                (StatusCode::SERVICE_UNAVAILABLE, "service_unavailable")
            }
            RestError::InternalError { .. } => {
                (StatusCode::INTERNAL_SERVER_ERROR, "internal_server_error")
            }
        }
    }

    fn reason(&self) -> &str {
        match self {
            RestError::BadRequest { message }
            | RestError::Unauthorized { message }
            | RestError::Forbidden { message }
            | RestError::NotFound { message }
            | RestError::AuthorizationLookupFailed { message }
            | RestError::ServiceUnavailable { message }
            | RestError::InternalError { message } => message,
        }
    }
}

impl IntoResponse for RestError {
    fn into_response(self) -> Response {
        let (status, code) = self.status_and_code();
        if status.is_server_error() {
            warn!(status = %status, error = %self, "Request failed");
        }

        let body = create_error_body(code, self.reason());
        (status, Json(body)).into_response()
    }
}

/// Creates the native error body.
fn create_error_body(error: &str, reason: &str) -> serde_json::Value {
    serde_json::json!({
        "error": error,
        "reason": reason,
    })
}

// Implement conversions from lower-layer errors

impl From<StorageError> for RestError {
    fn from(err: StorageError) -> Self {
        if err.is_unavailable() {
            return RestError::ServiceUnavailable {
                message: err.to_string(),
            };
        }
        match err {
            StorageError::Database(DatabaseError::NotFound { .. }) => RestError::NotFound {
                message: "Database does not exist.".to_string(),
            },
            StorageError::Database(DatabaseError::InvalidDocument { message }) => {
                RestError::BadRequest { message }
            }
            _ => RestError::InternalError {
                message: err.to_string(),
            },
        }
    }
}

impl From<AuthorizationError> for RestError {
    fn from(err: AuthorizationError) -> Self {
        match err {
            AuthorizationError::UnknownUser { .. } => RestError::Unauthorized {
                message: err.to_string(),
            },
            AuthorizationError::LookupFailed { .. } | AuthorizationError::InvalidGrants { .. } => {
                RestError::AuthorizationLookupFailed {
                    message: err.to_string(),
                }
            }
        }
    }
}

impl From<FilterError> for RestError {
    fn from(err: FilterError) -> Self {
        match err {
            FilterError::MalformedRequest { message } => RestError::BadRequest { message },
            FilterError::Authorization(e) => e.into(),
            FilterError::Storage(e) => e.into(),
        }
    }
}

impl From<serde_json::Error> for RestError {
    fn from(err: serde_json::Error) -> Self {
        RestError::BadRequest {
            message: format!("Invalid JSON: {}", err),
        }
    }
}

/// Result type alias for REST operations.
pub type RestResult<T> = Result<T, RestError>;

#[cfg(test)]
mod tests {
    use super::*;
    use outpost_persistence::error::BackendError;

    #[test]
    fn test_database_not_found_mapping() {
        let err = RestError::from(StorageError::from(DatabaseError::NotFound {
            db: "medic".to_string(),
        }));
        assert_eq!(err.status_and_code(), (StatusCode::NOT_FOUND, "not_found"));
        assert_eq!(err.reason(), "Database does not exist.");
    }

    #[test]
    fn test_unavailable_vs_internal_store_errors() {
        let unavailable = RestError::from(StorageError::from(BackendError::Unavailable {
            backend_name: "sqlite".to_string(),
            message: "down".to_string(),
        }));
        assert_eq!(unavailable.status_and_code().0, StatusCode::SERVICE_UNAVAILABLE);

        let failed = RestError::from(StorageError::from(BackendError::QueryError {
            message: "bad".to_string(),
        }));
        assert_eq!(failed.status_and_code().0, StatusCode::INTERNAL_SERVER_ERROR);
    }

    #[test]
    fn test_authorization_mapping() {
        let unknown = RestError::from(AuthorizationError::UnknownUser {
            user: "ghost".to_string(),
        });
        assert_eq!(unknown.status_and_code(), (StatusCode::UNAUTHORIZED, "unauthorized"));

        let lookup = RestError::from(FilterError::from(AuthorizationError::LookupFailed {
            user: "chw".to_string(),
            message: "hierarchy unavailable".to_string(),
        }));
        assert_eq!(lookup.status_and_code().1, "authorization_lookup_failed");
    }

    #[test]
    fn test_malformed_request_mapping() {
        let err = RestError::from(FilterError::MalformedRequest {
            message: "keys must be a JSON array".to_string(),
        });
        assert_eq!(err.status_and_code(), (StatusCode::BAD_REQUEST, "bad_request"));
        assert_eq!(err.to_string(), "Bad request: keys must be a JSON array");
    }

    #[test]
    fn test_error_body() {
        let body = create_error_body("forbidden", "Online role required");
        assert_eq!(body["error"], "forbidden");
        assert_eq!(body["reason"], "Online role required");
    }
}
