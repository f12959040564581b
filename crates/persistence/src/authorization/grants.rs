//! Grants-document authorization.
//!
//! [`GrantsAuthorization`] resolves callers from a precomputed grants
//! document, the output of whatever job walks the hierarchy:
//!
//! ```json
//! {
//!   "users": {
//!     "chw-amina": {
//!       "subjects": ["clinic-1", "person-1"],
//!       "allowed_ids": ["clinic-1", "person-1", "report-9____2-ab____tombstone"]
//!     }
//!   }
//! }
//! ```

use std::collections::HashMap;
use std::path::Path;
use std::sync::atomic::{AtomicUsize, Ordering};

use async_trait::async_trait;
use parking_lot::RwLock;
use serde::{Deserialize, Serialize};
use tracing::{debug, info};

use super::context::{AuthorizationContext, AuthorizedIdSet, CallerIdentity};
use super::provider::AuthorizationProvider;
use super::signals::DocumentSignals;
use crate::error::{AuthorizationError, AuthorizationResult};

/// One user's grants.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct UserGrant {
    /// Hierarchy entities the user is attached to.
    #[serde(default)]
    pub subjects: Vec<String>,

    /// Document ids the user may read, live or tombstone form.
    #[serde(default)]
    pub allowed_ids: Vec<String>,
}

/// A complete grants document.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct GrantsDocument {
    /// Grants keyed by user name.
    #[serde(default)]
    pub users: HashMap<String, UserGrant>,
}

/// An [`AuthorizationProvider`] backed by a grants document.
///
/// Grants can be replaced at runtime (see [`replace`](Self::replace)), which
/// is how a hierarchy change reaches this provider.
#[derive(Debug, Default)]
pub struct GrantsAuthorization {
    grants: RwLock<GrantsDocument>,
    lookups: AtomicUsize,
}

impl GrantsAuthorization {
    /// Creates a provider over `grants`.
    pub fn new(grants: GrantsDocument) -> Self {
        Self {
            grants: RwLock::new(grants),
            lookups: AtomicUsize::new(0),
        }
    }

    /// Parses a grants document from JSON.
    pub fn from_json(json: &str) -> AuthorizationResult<Self> {
        let grants: GrantsDocument =
            serde_json::from_str(json).map_err(|e| AuthorizationError::InvalidGrants {
                message: e.to_string(),
            })?;
        Ok(Self::new(grants))
    }

    /// Loads a grants document from a file.
    pub fn from_file(path: impl AsRef<Path>) -> AuthorizationResult<Self> {
        let path = path.as_ref();
        let json = std::fs::read_to_string(path).map_err(|e| AuthorizationError::InvalidGrants {
            message: format!("{}: {}", path.display(), e),
        })?;
        let provider = Self::from_json(&json)?;
        info!(
            path = %path.display(),
            users = provider.grants.read().users.len(),
            "Loaded authorization grants"
        );
        Ok(provider)
    }

    /// Replaces every grant.
    pub fn replace(&self, grants: GrantsDocument) {
        *self.grants.write() = grants;
    }

    /// Sets one user's grant.
    pub fn set_user(&self, user: impl Into<String>, grant: UserGrant) {
        self.grants.write().users.insert(user.into(), grant);
    }

    /// Number of contexts resolved so far.
    pub fn lookup_count(&self) -> usize {
        self.lookups.load(Ordering::Relaxed)
    }
}

#[async_trait]
impl AuthorizationProvider for GrantsAuthorization {
    async fn get_authorization_context(
        &self,
        caller: &CallerIdentity,
    ) -> AuthorizationResult<AuthorizationContext> {
        self.lookups.fetch_add(1, Ordering::Relaxed);

        let grants = self.grants.read();
        let grant = grants
            .users
            .get(caller.user())
            .ok_or_else(|| AuthorizationError::UnknownUser {
                user: caller.user().to_string(),
            })?;

        debug!(
            user = %caller.user(),
            subjects = grant.subjects.len(),
            allowed = grant.allowed_ids.len(),
            "Resolved authorization context"
        );

        Ok(AuthorizationContext::new(
            caller.clone(),
            grant.subjects.clone(),
            AuthorizedIdSet::from(grant.allowed_ids.clone()),
        ))
    }

    fn is_doc_visible(
        &self,
        doc_id: &str,
        ctx: &AuthorizationContext,
        signals: &DocumentSignals,
    ) -> bool {
        ctx.allowed_ids().contains(doc_id)
            || signals
                .subjects()
                .iter()
                .any(|subject| ctx.has_subject(subject))
    }
}
