//! Caller identity extractor.
//!
//! The gateway sits behind an authenticating proxy, which asserts the caller
//! through two headers:
//!
//! - `X-User-ID` - the user name (required)
//! - `X-User-Roles` - comma-separated roles (optional)

use axum::{
    extract::FromRequestParts,
    http::{HeaderMap, header::HeaderName, request::Parts},
};
use outpost_persistence::authorization::CallerIdentity;

use crate::config::split_list;
use crate::error::RestError;

/// Header carrying the authenticated user name.
pub static X_USER_ID: HeaderName = HeaderName::from_static("x-user-id");

/// Header carrying the caller's roles.
pub static X_USER_ROLES: HeaderName = HeaderName::from_static("x-user-roles");

/// Axum extractor for the calling user.
///
/// # Example
///
/// ```rust,ignore
/// use outpost_rest::extractors::Caller;
///
/// async fn handler(caller: Caller) {
///     println!("User: {}", caller.identity().user());
/// }
/// ```
#[derive(Debug, Clone)]
pub struct Caller(CallerIdentity);

impl Caller {
    /// Returns the caller's identity.
    pub fn identity(&self) -> &CallerIdentity {
        &self.0
    }

    /// Consumes the extractor and returns the identity.
    pub fn into_identity(self) -> CallerIdentity {
        self.0
    }
}

fn header_str<'a>(headers: &'a HeaderMap, name: &HeaderName) -> Option<&'a str> {
    headers
        .get(name)
        .and_then(|v| v.to_str().ok())
        .map(str::trim)
        .filter(|v| !v.is_empty())
}

/// Builds a caller identity from request headers.
pub fn identity_from_headers(headers: &HeaderMap) -> Result<CallerIdentity, RestError> {
    let user = header_str(headers, &X_USER_ID).ok_or_else(|| RestError::Unauthorized {
        message: "You are not authorized to access this db.".to_string(),
    })?;
    let roles = header_str(headers, &X_USER_ROLES)
        .map(split_list)
        .unwrap_or_default();

    Ok(CallerIdentity::new(user, roles))
}

impl<S> FromRequestParts<S> for Caller
where
    S: Send + Sync,
{
    type Rejection = RestError;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        identity_from_headers(&parts.headers).map(Caller)
    }
}
