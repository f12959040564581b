//! Caching wrapper for authorization providers.
//!
//! Contexts are held in a Moka async cache keyed by user name, so the
//! cache is bounded by `max_capacity` and entries expire after
//! `time_to_live` even when nobody invalidates them.

use std::sync::atomic::{AtomicU64, Ordering};
use std::time::Duration;

use async_trait::async_trait;
use moka::future::Cache;
use serde_json::Value;
use tracing::debug;

use super::context::{AuthorizationContext, AuthorizedIdSet, CallerIdentity};
use super::provider::AuthorizationProvider;
use super::signals::DocumentSignals;
use crate::error::AuthorizationResult;

/// Bounds for a [`CachedAuthorization`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AuthorizationCacheConfig {
    /// Maximum number of cached users.
    pub max_capacity: u64,
    /// How long a resolved context is served before it is resolved again.
    pub time_to_live: Duration,
}

impl Default for AuthorizationCacheConfig {
    fn default() -> Self {
        Self {
            max_capacity: 10_000,
            time_to_live: Duration::from_secs(60),
        }
    }
}

impl AuthorizationCacheConfig {
    /// Sets the maximum capacity.
    pub fn with_max_capacity(mut self, max_capacity: u64) -> Self {
        self.max_capacity = max_capacity;
        self
    }

    /// Sets the time to live.
    pub fn with_ttl(mut self, ttl: Duration) -> Self {
        self.time_to_live = ttl;
        self
    }
}

/// Caches resolved contexts per user in front of another provider.
///
/// The wrapped provider must resolve a caller's scope from the user name
/// alone. Roles travel with the request, so a cached scope is re-bound to
/// the current caller on every hit instead of being cached per role set.
///
/// Invalidation bumps a generation counter; a lookup that started before an
/// invalidation does not repopulate the cache with its (possibly stale)
/// result.
///
/// # Examples
///
/// ```
/// use outpost_persistence::authorization::{
///     AuthorizationProvider, CachedAuthorization, CallerIdentity, GrantsAuthorization,
/// };
///
/// # let rt = tokio::runtime::Runtime::new().unwrap();
/// # rt.block_on(async {
/// let grants = GrantsAuthorization::from_json(r#"{"users": {"chw": {"allowed_ids": ["a"]}}}"#).unwrap();
/// let cached = CachedAuthorization::new(grants);
/// let caller = CallerIdentity::new("chw", vec![]);
///
/// cached.get_authorization_context(&caller).await.unwrap();
/// cached.get_authorization_context(&caller).await.unwrap();
/// assert_eq!(cached.inner().lookup_count(), 1);
///
/// cached.invalidate(Some("chw")).await;
/// cached.get_authorization_context(&caller).await.unwrap();
/// assert_eq!(cached.inner().lookup_count(), 2);
/// # });
/// ```
pub struct CachedAuthorization<P> {
    inner: P,
    contexts: Cache<String, AuthorizationContext>,
    config: AuthorizationCacheConfig,
    generation: AtomicU64,
}

impl<P> std::fmt::Debug for CachedAuthorization<P> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("CachedAuthorization")
            .field("config", &self.config)
            .field("entry_count", &self.contexts.entry_count())
            .finish()
    }
}

impl<P: AuthorizationProvider> CachedAuthorization<P> {
    /// Wraps `inner` with an empty cache using default bounds.
    pub fn new(inner: P) -> Self {
        Self::with_config(inner, AuthorizationCacheConfig::default())
    }

    /// Wraps `inner` with an empty cache bounded by `config`.
    pub fn with_config(inner: P, config: AuthorizationCacheConfig) -> Self {
        let contexts = Cache::builder()
            .max_capacity(config.max_capacity)
            .time_to_live(config.time_to_live)
            .build();

        Self {
            inner,
            contexts,
            config,
            generation: AtomicU64::new(0),
        }
    }

    /// Returns the wrapped provider.
    pub fn inner(&self) -> &P {
        &self.inner
    }

    /// Returns the cache bounds.
    pub fn config(&self) -> &AuthorizationCacheConfig {
        &self.config
    }

    /// Number of cached contexts, after pending evictions have run.
    pub async fn cached_len(&self) -> u64 {
        self.contexts.run_pending_tasks().await;
        self.contexts.entry_count()
    }
}

#[async_trait]
impl<P: AuthorizationProvider> AuthorizationProvider for CachedAuthorization<P> {
    async fn get_authorization_context(
        &self,
        caller: &CallerIdentity,
    ) -> AuthorizationResult<AuthorizationContext> {
        if let Some(ctx) = self.contexts.get(caller.user()).await {
            if ctx.caller() == caller {
                return Ok(ctx);
            }
            return Ok(ctx.with_caller(caller.clone()));
        }

        let generation = self.generation.load(Ordering::Acquire);
        let ctx = self.inner.get_authorization_context(caller).await?;

        if self.generation.load(Ordering::Acquire) == generation {
            self.contexts
                .insert(caller.user().to_string(), ctx.clone())
                .await;
        } else {
            debug!(user = %caller.user(), "Invalidated during lookup, not caching context");
        }

        Ok(ctx)
    }

    fn allowed_ids(&self, ctx: &AuthorizationContext) -> AuthorizedIdSet {
        self.inner.allowed_ids(ctx)
    }

    fn is_doc_visible(
        &self,
        doc_id: &str,
        ctx: &AuthorizationContext,
        signals: &DocumentSignals,
    ) -> bool {
        self.inner.is_doc_visible(doc_id, ctx, signals)
    }

    fn document_signals(&self, doc: &Value) -> DocumentSignals {
        self.inner.document_signals(doc)
    }

    fn to_tombstone_form(&self, ids: &[String]) -> Vec<String> {
        self.inner.to_tombstone_form(ids)
    }

    fn exclude_tombstones(&self, ids: &[String]) -> Vec<String> {
        self.inner.exclude_tombstones(ids)
    }

    async fn invalidate(&self, user: Option<&str>) {
        self.generation.fetch_add(1, Ordering::AcqRel);
        match user {
            Some(user) => self.contexts.invalidate(user).await,
            None => self.contexts.invalidate_all(),
        }

        self.inner.invalidate(user).await;
        debug!(user = ?user, "Invalidated cached authorization contexts");
    }
}
