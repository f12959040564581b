//! The authorization collaborator interface.

use async_trait::async_trait;
use serde_json::Value;

use super::context::{AuthorizationContext, AuthorizedIdSet, CallerIdentity};
use super::signals::DocumentSignals;
use super::tombstone;
use crate::error::AuthorizationResult;

/// Resolves callers to authorization contexts and answers visibility
/// questions against them.
///
/// Only [`get_authorization_context`](Self::get_authorization_context) and
/// [`is_doc_visible`](Self::is_doc_visible) are required. The id transforms
/// default to the standard `<id>____<rev>____tombstone` scheme.
///
/// # Cache Contract
///
/// Implementations may cache contexts. After [`invalidate`](Self::invalidate)
/// returns, the next `get_authorization_context` for an affected caller must
/// reflect current hierarchy state.
#[async_trait]
pub trait AuthorizationProvider: Send + Sync {
    /// Resolves `caller` into a context.
    ///
    /// # Errors
    ///
    /// * `AuthorizationError::UnknownUser` - If the identity maps to no user
    /// * `AuthorizationError::LookupFailed` - If resolution itself failed
    async fn get_authorization_context(
        &self,
        caller: &CallerIdentity,
    ) -> AuthorizationResult<AuthorizationContext>;

    /// Returns the caller's authorized id universe.
    fn allowed_ids(&self, ctx: &AuthorizationContext) -> AuthorizedIdSet {
        ctx.allowed_ids().clone()
    }

    /// Decides whether a fetched document is visible to the caller.
    fn is_doc_visible(
        &self,
        doc_id: &str,
        ctx: &AuthorizationContext,
        signals: &DocumentSignals,
    ) -> bool;

    /// Derives visibility signals from a document body.
    fn document_signals(&self, doc: &Value) -> DocumentSignals {
        DocumentSignals::from_doc(doc)
    }

    /// Maps tombstone ids to the ids their deleted rows are served under.
    fn to_tombstone_form(&self, ids: &[String]) -> Vec<String> {
        tombstone::to_tombstone_form(ids)
    }

    /// Removes tombstone ids.
    fn exclude_tombstones(&self, ids: &[String]) -> Vec<String> {
        tombstone::exclude_tombstones(ids)
    }

    /// Drops cached state for `user`, or for everyone when `None`
    /// (a hierarchy change). Uncached providers have nothing to drop.
    async fn invalidate(&self, _user: Option<&str>) {}

    /// Resolves `caller` afresh, bypassing any cached context.
    async fn refresh(&self, caller: &CallerIdentity) -> AuthorizationResult<AuthorizationContext> {
        self.invalidate(Some(caller.user())).await;
        self.get_authorization_context(caller).await
    }
}
