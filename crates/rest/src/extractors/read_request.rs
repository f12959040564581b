//! Bulk-read request extractor.
//!
//! Combines the raw query string and the optional JSON body of an
//! `_all_docs` request into a parsed [`BulkReadRequest`].

use axum::{
    body::Bytes,
    extract::{FromRequest, Request, rejection::BytesRejection},
    response::{IntoResponse, Response},
};
use serde_json::Value;

use crate::error::RestError;
use crate::filter::{BulkReadRequest, QueryParams};

/// Axum extractor for bulk-read requests.
///
/// Works for both `GET` (query only) and `POST` (query plus a body such as
/// `{"keys": [...]}`). An empty body is treated as absent.
///
/// # Example
///
/// ```rust,ignore
/// use outpost_rest::extractors::ReadRequest;
///
/// async fn handler(ReadRequest(request): ReadRequest) {
///     println!("Explicit ids: {:?}", request.explicit_ids());
/// }
/// ```
#[derive(Debug)]
pub struct ReadRequest(pub BulkReadRequest);

impl ReadRequest {
    /// Consumes the extractor and returns the parsed request.
    pub fn into_inner(self) -> BulkReadRequest {
        self.0
    }
}

/// Error type for bulk-read extraction failures.
#[derive(Debug)]
pub enum ReadRequestRejection {
    /// The body could not be read (too large, aborted, ...).
    Body(BytesRejection),
    /// The body or parameters are malformed.
    Invalid(RestError),
}

impl IntoResponse for ReadRequestRejection {
    fn into_response(self) -> Response {
        match self {
            ReadRequestRejection::Body(rejection) => rejection.into_response(),
            ReadRequestRejection::Invalid(error) => error.into_response(),
        }
    }
}

/// Parses a request body, treating an all-whitespace body as absent.
pub fn parse_body(bytes: &[u8]) -> Result<Option<Value>, RestError> {
    if bytes.iter().all(u8::is_ascii_whitespace) {
        return Ok(None);
    }
    Ok(Some(serde_json::from_slice(bytes)?))
}

impl<S> FromRequest<S> for ReadRequest
where
    S: Send + Sync,
{
    type Rejection = ReadRequestRejection;

    async fn from_request(req: Request, state: &S) -> Result<Self, Self::Rejection> {
        // Must own the query before moving req
        let query = QueryParams::parse(req.uri().query());

        let bytes = Bytes::from_request(req, state)
            .await
            .map_err(ReadRequestRejection::Body)?;
        let body = parse_body(&bytes).map_err(ReadRequestRejection::Invalid)?;

        BulkReadRequest::parse(&query, body.as_ref())
            .map(ReadRequest)
            .map_err(|e| ReadRequestRejection::Invalid(e.into()))
    }
}
