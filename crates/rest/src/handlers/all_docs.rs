//! Bulk document read handler.
//!
//! Serves the store's `_all_docs` protocol. Callers holding an online role
//! are answered straight from the store; everyone else goes through the
//! [`BulkReadFilter`](crate::filter::BulkReadFilter), which only ever
//! returns documents the caller may read and stubs the rest.

use axum::{
    Json,
    extract::{Path, State},
};
use outpost_persistence::core::DocumentStore;
use outpost_persistence::types::AllDocsResult;
use tracing::debug;

use crate::error::RestResult;
use crate::extractors::{Caller, ReadRequest};
use crate::filter::{BulkReadFilter, read_unfiltered};
use crate::state::AppState;

/// Handler for bulk document reads.
///
/// # HTTP Request
///
/// `GET [base]/{db}/_all_docs?[params]`
/// `POST [base]/{db}/_all_docs?[params]` with body `{"keys": [...]}`
///
/// # Response
///
/// - `200 OK` - `{"total_rows"?, "offset"?, "rows": [...]}`
/// - `400 Bad Request` - Malformed `keys` or body
/// - `401 Unauthorized` - No caller identity, or the caller is unknown
/// - `404 Not Found` - The database does not exist
/// - `503 Service Unavailable` - The store cannot be reached
pub async fn all_docs_handler<S>(
    State(state): State<AppState<S>>,
    Path(db): Path<String>,
    caller: Caller,
    ReadRequest(request): ReadRequest,
) -> RestResult<Json<AllDocsResult>>
where
    S: DocumentStore + 'static,
{
    let caller = caller.into_identity();

    let result = if state.is_online(&caller) {
        debug!(db = %db, user = %caller.user(), "Serving unfiltered bulk read");
        read_unfiltered(state.store(), &db, &request).await?
    } else {
        BulkReadFilter::new(state.store(), state.authorization())
            .filter_offline_request(&db, &caller, &request)
            .await?
    };

    Ok(Json(result))
}
