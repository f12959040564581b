//! Gateway test harness.
//!
//! Wires a store and an authorization provider into the real router and
//! serves it through `axum-test`.

use std::sync::Arc;

use async_trait::async_trait;
use axum::http::{HeaderName, HeaderValue};
use axum_test::{TestRequest, TestResponse, TestServer};
use serde_json::Value;

use outpost_persistence::authorization::AuthorizationProvider;
use outpost_persistence::backends::memory::MemoryBackend;
use outpost_persistence::core::DocumentStore;
use outpost_persistence::error::{BackendError, StorageResult};
use outpost_persistence::types::{AllDocsResult, FetchOptions, KeySelector};
use outpost_rest::{AppState, ServerConfig, routing};

use super::fixtures::{self, ONLINE_ROLE};

const X_USER_ID: HeaderName = HeaderName::from_static("x-user-id");
const X_USER_ROLES: HeaderName = HeaderName::from_static("x-user-roles");

/// Test harness for the gateway.
///
/// # Example
///
/// ```rust,ignore
/// let harness = GatewayHarness::memory().await;
/// let response = harness.get_as("chw", "/medic/_all_docs").await;
/// response.assert_status_ok();
/// ```
pub struct GatewayHarness<S> {
    /// The test server instance.
    pub server: TestServer,

    /// The store behind the server.
    pub store: Arc<S>,
}

impl GatewayHarness<MemoryBackend> {
    /// A seeded in-memory store with the fixture grants.
    pub async fn memory() -> Self {
        let store = MemoryBackend::new();
        fixtures::seed(&store).await;
        Self::new(store, Arc::new(fixtures::grants()))
    }
}

impl<S: DocumentStore + 'static> GatewayHarness<S> {
    /// Serves `store` with `authorization` under the test configuration.
    pub fn new(store: S, authorization: Arc<dyn AuthorizationProvider>) -> Self {
        Self::with_config(store, authorization, ServerConfig::for_testing())
    }

    /// Serves `store` with `authorization` under `config`.
    pub fn with_config(
        store: S,
        authorization: Arc<dyn AuthorizationProvider>,
        config: ServerConfig,
    ) -> Self {
        let store = Arc::new(store);
        let state = AppState::new(Arc::clone(&store), authorization, config);
        let server = TestServer::new(routing::create_routes(state))
            .expect("Failed to create test server");
        Self { server, store }
    }

    /// A GET request issued by an offline `user`.
    pub fn get_as(&self, user: &str, path: &str) -> TestRequest {
        identify(self.server.get(path), user, None)
    }

    /// A POST request with a JSON body issued by an offline `user`.
    pub fn post_as(&self, user: &str, path: &str, body: &Value) -> TestRequest {
        identify(self.server.post(path), user, None).json(body)
    }

    /// A GET request issued by an online administrator.
    pub fn get_online(&self, path: &str) -> TestRequest {
        identify(self.server.get(path), fixtures::ADMIN, Some(ONLINE_ROLE))
    }

    /// A POST request with a JSON body issued by an online administrator.
    pub fn post_online(&self, path: &str, body: &Value) -> TestRequest {
        identify(self.server.post(path), fixtures::ADMIN, Some(ONLINE_ROLE)).json(body)
    }
}

fn identify(request: TestRequest, user: &str, roles: Option<&str>) -> TestRequest {
    let request = request.add_header(X_USER_ID, HeaderValue::from_str(user).unwrap());
    match roles {
        Some(roles) => request.add_header(X_USER_ROLES, HeaderValue::from_str(roles).unwrap()),
        None => request,
    }
}

/// Returns the row ids of a bulk-read response.
pub fn row_ids(response: &TestResponse) -> Vec<String> {
    response.json::<Value>()["rows"]
        .as_array()
        .expect("rows must be an array")
        .iter()
        .map(|row| row["id"].as_str().unwrap().to_string())
        .collect()
}

/// A store whose every call fails as unreachable.
pub struct UnreachableStore;

#[async_trait]
impl DocumentStore for UnreachableStore {
    fn backend_name(&self) -> &'static str {
        "unreachable"
    }

    async fn fetch_by_ids(
        &self,
        _db: &str,
        _ids: &[String],
        _options: &FetchOptions,
    ) -> StorageResult<AllDocsResult> {
        Err(unreachable())
    }

    async fn fetch_by_range(
        &self,
        _db: &str,
        _selector: &KeySelector,
        _options: &FetchOptions,
    ) -> StorageResult<AllDocsResult> {
        Err(unreachable())
    }

    async fn health_check(&self) -> StorageResult<()> {
        Err(unreachable())
    }
}

fn unreachable() -> outpost_persistence::error::StorageError {
    BackendError::Unavailable {
        backend_name: "unreachable".to_string(),
        message: "connection refused".to_string(),
    }
    .into()
}
