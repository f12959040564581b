//! Fetch strategy selection and execution.
//!
//! Two strategies exist. Pre-filtering narrows the authorized id universe
//! and fetches only what survives; post-filtering fetches what was asked
//! for and authorizes each returned document by its content. Which one a
//! request gets is decided by [`FetchPlan::for_request`].

use outpost_persistence::authorization::{AuthorizationContext, AuthorizationProvider};
use outpost_persistence::core::DocumentStore;
use outpost_persistence::types::{AllDocsResult, KeySelector, ResultRow};
use tracing::debug;

use super::error::FilterResult;
use super::range::filter_by_range;
use super::request::BulkReadRequest;
use super::tombstone::adapt_tombstones;

/// How a filtered bulk read is fetched.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FetchPlan {
    /// Range read: narrow, then fetch the narrowed ids in store order.
    NoExplicitIds,
    /// Explicit ids without bodies: narrow, then fetch the narrowed ids.
    ExplicitIdsMetadataOnly,
    /// Explicit ids with bodies: fetch, then authorize each row by content.
    ExplicitIdsWithBodies,
}

impl FetchPlan {
    /// Picks the plan for `request`.
    pub fn for_request(request: &BulkReadRequest) -> Self {
        match (request.explicit_ids().is_some(), request.include_docs()) {
            (true, true) => FetchPlan::ExplicitIdsWithBodies,
            (true, false) => FetchPlan::ExplicitIdsMetadataOnly,
            (false, _) => FetchPlan::NoExplicitIds,
        }
    }
}

/// Executes fetch plans against a store on behalf of one caller.
pub struct AuthorizedFetchPlanner<'a, S: ?Sized, A: ?Sized> {
    store: &'a S,
    authorization: &'a A,
}

impl<'a, S, A> AuthorizedFetchPlanner<'a, S, A>
where
    S: DocumentStore + ?Sized,
    A: AuthorizationProvider + ?Sized,
{
    /// Creates a planner over `store` and `authorization`.
    pub fn new(store: &'a S, authorization: &'a A) -> Self {
        Self {
            store,
            authorization,
        }
    }

    /// Fetches the raw result for `request` following `plan`.
    ///
    /// The result is not yet reconciled: explicit-id plans may return rows
    /// out of request order and with forbidden ids missing.
    pub async fn execute(
        &self,
        db: &str,
        request: &BulkReadRequest,
        ctx: &AuthorizationContext,
        plan: FetchPlan,
    ) -> FilterResult<AllDocsResult> {
        debug!(db = %db, user = %ctx.caller().user(), plan = ?plan, "Executing fetch plan");

        match (plan, request.explicit_ids()) {
            (FetchPlan::ExplicitIdsWithBodies, Some(ids)) => {
                self.fetch_then_authorize(db, ids, request, ctx).await
            }
            _ => self.narrow_then_fetch(db, request, ctx, plan).await,
        }
    }

    async fn fetch_then_authorize(
        &self,
        db: &str,
        ids: &[String],
        request: &BulkReadRequest,
        ctx: &AuthorizationContext,
    ) -> FilterResult<AllDocsResult> {
        let mut options = request.fetch_options();
        options.include_docs = true;

        let fetched = self.store.fetch_by_ids(db, ids, &options).await?;
        let returned = fetched.rows.len();

        let rows: Vec<ResultRow> = fetched
            .rows
            .into_iter()
            .filter(|row| match row.readable_doc() {
                Some(doc) => {
                    let signals = self.authorization.document_signals(doc);
                    self.authorization.is_doc_visible(row.id(), ctx, &signals)
                }
                None => false,
            })
            .collect();

        debug!(
            db = %db,
            returned = returned,
            visible = rows.len(),
            "Authorized fetched documents by content"
        );

        Ok(AllDocsResult::from_rows(rows))
    }

    async fn narrow_then_fetch(
        &self,
        db: &str,
        request: &BulkReadRequest,
        ctx: &AuthorizationContext,
        plan: FetchPlan,
    ) -> FilterResult<AllDocsResult> {
        let explicit_ids = request.explicit_ids();
        let options = request.fetch_options();
        let descending = options.descending();

        let allowed = self.authorization.allowed_ids(ctx);
        let adapted = adapt_tombstones(
            self.authorization,
            allowed.as_slice(),
            explicit_ids.is_some(),
        );
        let mut narrowed = filter_by_range(&adapted, explicit_ids, request.range(), descending);

        debug!(
            db = %db,
            allowed = allowed.len(),
            narrowed = narrowed.len(),
            "Narrowed authorized ids"
        );

        if narrowed.is_empty() {
            debug!(db = %db, "Nothing to fetch, short-circuiting");
            return Ok(AllDocsResult::empty());
        }

        match plan {
            FetchPlan::NoExplicitIds => {
                // Promoted to a key list, the ids must follow the store's range order
                narrowed.sort_unstable();
                narrowed.dedup();
                if descending {
                    narrowed.reverse();
                }

                // Paging applies to live rows only, so it happens here once
                // deletions are gone
                let fetched = self
                    .store
                    .fetch_by_range(db, &KeySelector::Keys(narrowed), &options.without_paging())
                    .await?;
                let live: Vec<ResultRow> = fetched
                    .rows
                    .into_iter()
                    .filter(|row| match row {
                        ResultRow::Document(doc) => !doc.value.deleted,
                        ResultRow::Forbidden(_) => false,
                    })
                    .collect();

                // Totals count what this caller can see, never the whole database
                let visible = live.len() as u64;
                Ok(AllDocsResult {
                    total_rows: Some(visible),
                    offset: Some(options.skip() as u64),
                    rows: options.window(live),
                })
            }
            _ => Ok(self.store.fetch_by_ids(db, &narrowed, &options).await?),
        }
    }
}
