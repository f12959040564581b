//! Axum extractors for the gateway.
//!
//! - [`Caller`] - The authenticated caller, from proxy-asserted headers
//! - [`ReadRequest`] - A parsed bulk-read request (query and body)

mod caller;
mod read_request;

pub use caller::{Caller, X_USER_ID, X_USER_ROLES, identity_from_headers};
pub use read_request::{ReadRequest, ReadRequestRejection, parse_body};
