//! Authorization-filtered bulk reads.
//!
//! Offline callers must only ever observe documents they are authorized to
//! see, yet receive responses shaped exactly like the store's native
//! `_all_docs`. A filtered read runs in five steps:
//!
//! 1. [`extract_request_ids`] derives the explicitly requested ids, if any
//! 2. the [`AuthorizationProvider`] resolves the caller's context
//! 3. [`FetchPlan::for_request`] picks a strategy
//! 4. [`AuthorizedFetchPlanner`] fetches, narrowing first
//!    ([`adapt_tombstones`], [`filter_by_range`]) or authorizing each row after
//! 5. [`reconcile`] restores request order and stubs forbidden ids
//!
//! Only step 5 cares about request order; everything before it may reorder.

mod error;
mod planner;
mod range;
mod reconcile;
mod request;
mod tombstone;

pub use error::{FilterError, FilterResult};
pub use planner::{AuthorizedFetchPlanner, FetchPlan};
pub use range::{END_KEY_PARAMS, RangeParams, START_KEY_PARAMS, filter_by_range};
pub use reconcile::reconcile;
pub use request::{BulkReadRequest, QueryParams, extract_request_ids};
pub use tombstone::adapt_tombstones;

use outpost_persistence::authorization::{AuthorizationProvider, CallerIdentity};
use outpost_persistence::core::DocumentStore;
use outpost_persistence::types::{AllDocsResult, KeySelector};
use tracing::debug;

/// Serves bulk reads for offline callers.
pub struct BulkReadFilter<'a, S: ?Sized, A: ?Sized> {
    store: &'a S,
    authorization: &'a A,
}

impl<'a, S, A> BulkReadFilter<'a, S, A>
where
    S: DocumentStore + ?Sized,
    A: AuthorizationProvider + ?Sized,
{
    /// Creates a filter over `store`, consulting `authorization`.
    pub fn new(store: &'a S, authorization: &'a A) -> Self {
        Self {
            store,
            authorization,
        }
    }

    /// Answers `request` on behalf of `caller`.
    ///
    /// # Errors
    ///
    /// * [`FilterError::Authorization`] - If the caller cannot be resolved;
    ///   the store is not touched
    /// * [`FilterError::Storage`] - If the store fails; not retried
    pub async fn filter_offline_request(
        &self,
        db: &str,
        caller: &CallerIdentity,
        request: &BulkReadRequest,
    ) -> FilterResult<AllDocsResult> {
        let ctx = self.authorization.get_authorization_context(caller).await?;
        let plan = FetchPlan::for_request(request);

        let raw = AuthorizedFetchPlanner::new(self.store, self.authorization)
            .execute(db, request, &ctx, plan)
            .await?;
        let response = reconcile(raw, request.explicit_ids());

        debug!(
            db = %db,
            user = %caller.user(),
            rows = response.rows.len(),
            forbidden = response.rows.iter().filter(|row| row.is_forbidden()).count(),
            "Filtered bulk read"
        );

        Ok(response)
    }
}

/// Answers `request` straight from the store, as for an online caller.
///
/// Parameter handling matches the filtered path so both kinds of caller see
/// the same protocol.
pub async fn read_unfiltered<S>(
    store: &S,
    db: &str,
    request: &BulkReadRequest,
) -> FilterResult<AllDocsResult>
where
    S: DocumentStore + ?Sized,
{
    let selector = match request.explicit_ids() {
        Some(ids) => KeySelector::Keys(ids.to_vec()),
        None => KeySelector::Range(request.range().to_key_range()),
    };
    Ok(store
        .fetch_by_range(db, &selector, &request.fetch_options())
        .await?)
}
