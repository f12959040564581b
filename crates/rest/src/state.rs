//! Application state for the bulk-read gateway.
//!
//! This module defines the shared application state that is available to all
//! request handlers: the document store, the authorization provider, and the
//! server configuration.

use std::sync::Arc;

use outpost_persistence::authorization::{AuthorizationProvider, CallerIdentity};
use outpost_persistence::core::DocumentStore;

use crate::config::ServerConfig;

/// Shared application state for the gateway.
///
/// # Type Parameters
///
/// * `S` - The document store type (must implement [`DocumentStore`])
///
/// # Example
///
/// ```rust,ignore
/// use outpost_rest::{AppState, ServerConfig};
/// use outpost_persistence::authorization::GrantsAuthorization;
/// use outpost_persistence::backends::memory::MemoryBackend;
/// use std::sync::Arc;
///
/// let state = AppState::new(
///     Arc::new(MemoryBackend::new()),
///     Arc::new(GrantsAuthorization::default()),
///     ServerConfig::default(),
/// );
/// ```
pub struct AppState<S> {
    /// The document store.
    store: Arc<S>,

    /// Resolves what each caller may read.
    authorization: Arc<dyn AuthorizationProvider>,

    /// Server configuration.
    config: Arc<ServerConfig>,

    /// Roles whose holders bypass filtering, parsed once from the config.
    online_roles: Arc<[String]>,
}

// Manually implement Clone since S is wrapped in Arc and doesn't need to be Clone
impl<S> Clone for AppState<S> {
    fn clone(&self) -> Self {
        Self {
            store: Arc::clone(&self.store),
            authorization: Arc::clone(&self.authorization),
            config: Arc::clone(&self.config),
            online_roles: Arc::clone(&self.online_roles),
        }
    }
}

impl<S: DocumentStore> AppState<S> {
    /// Creates a new AppState.
    pub fn new(
        store: Arc<S>,
        authorization: Arc<dyn AuthorizationProvider>,
        config: ServerConfig,
    ) -> Self {
        let online_roles = config.online_roles().into();
        Self {
            store,
            authorization,
            config: Arc::new(config),
            online_roles,
        }
    }

    /// Returns a reference to the document store.
    pub fn store(&self) -> &S {
        &self.store
    }

    /// Returns a reference to the authorization provider.
    pub fn authorization(&self) -> &dyn AuthorizationProvider {
        self.authorization.as_ref()
    }

    /// Returns a reference to the server configuration.
    pub fn config(&self) -> &ServerConfig {
        &self.config
    }

    /// Returns `true` if `caller` holds an online role and is served unfiltered.
    pub fn is_online(&self, caller: &CallerIdentity) -> bool {
        caller.has_any_role(&self.online_roles)
    }
}
