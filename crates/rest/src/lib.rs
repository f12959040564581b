//! # outpost-rest - Authorization-filtered bulk reads
//!
//! This crate serves a document store's `_all_docs` bulk-read protocol to
//! partially-trusted offline clients. Every response contains only documents
//! the caller may read. Ids the caller asked for explicitly but may not read
//! come back as forbidden stubs `{"id": "...", "error": "forbidden"}`, in the
//! caller's requested order, so a replicating client can tell "not allowed"
//! from "missing".
//!
//! ## Quick Start
//!
//! ```rust,ignore
//! use std::sync::Arc;
//! use outpost_rest::{create_app_with_config, ServerConfig};
//! use outpost_persistence::authorization::GrantsAuthorization;
//! use outpost_persistence::backends::memory::MemoryBackend;
//!
//! #[tokio::main]
//! async fn main() -> anyhow::Result<()> {
//!     let store = MemoryBackend::with_database("medic");
//!     let authorization = Arc::new(GrantsAuthorization::from_file("grants.json")?);
//!
//!     let app = create_app_with_config(store, authorization, ServerConfig::default());
//!
//!     let listener = tokio::net::TcpListener::bind("127.0.0.1:5988").await?;
//!     axum::serve(listener, app).await?;
//!     Ok(())
//! }
//! ```
//!
//! ## API Endpoints
//!
//! | Interaction | HTTP Method | URL Pattern |
//! |------------|-------------|-------------|
//! | bulk read | GET | `/{db}/_all_docs?params` |
//! | bulk read by keys | POST | `/{db}/_all_docs` with `{"keys": [...]}` |
//! | invalidate authorization | POST | `/_authorization/_invalidate` |
//! | health | GET | `/health`, `/_liveness`, `/_readiness` |
//!
//! ## HTTP Headers
//!
//! - `X-User-ID` - Authenticated user name (required on bulk reads)
//! - `X-User-Roles` - Comma-separated roles; online roles bypass filtering
//! - `X-Request-ID` - Generated or propagated when request ids are enabled
//!
//! ## Error Handling
//!
//! Errors use the store's native body `{"error": "...", "reason": "..."}`:
//!
//! | HTTP Status | `error` | Description |
//! |-------------|---------|-------------|
//! | 400 | bad_request | Malformed keys or body |
//! | 401 | unauthorized | Missing or unknown caller |
//! | 403 | forbidden | Online role required |
//! | 404 | not_found | Database does not exist |
//! | 500 | authorization_lookup_failed | Caller's authorization could not be resolved |
//! | 503 | service_unavailable | Store unreachable |
//!
//! ## Configuration
//!
//! | Variable | Default | Description |
//! |----------|---------|-------------|
//! | `OUTPOST_PORT` | 5988 | Server port |
//! | `OUTPOST_HOST` | 127.0.0.1 | Host to bind |
//! | `OUTPOST_LOG_LEVEL` | info | Log level (error, warn, info, debug, trace) |
//! | `OUTPOST_STORAGE_BACKEND` | memory | `memory` or `sqlite` |
//! | `OUTPOST_DATABASE_URL` | | SQLite path |
//! | `OUTPOST_GRANTS_FILE` | | Authorization grants (JSON) |
//! | `OUTPOST_ONLINE_ROLES` | national_admin,_admin | Roles served unfiltered |
//!
//! ## Architecture
//!
//! - [`filter`] - The filtering engine (request parsing, range and tombstone
//!   narrowing, fetch planning, reconciliation)
//! - [`error`] - Error types and HTTP mapping
//! - [`config`] - Server configuration
//! - [`state`] - Application state (store, authorization, configuration)
//! - [`extractors`] - Caller identity and request extraction
//! - [`handlers`] - HTTP request handlers
//! - [`routing`] - Route configuration

// Enforce documentation
#![warn(missing_docs)]
#![warn(rustdoc::missing_crate_level_docs)]

pub mod config;
pub mod error;
pub mod extractors;
pub mod filter;
pub mod handlers;
pub mod routing;
pub mod state;

// Re-export commonly used types
pub use config::{ServerConfig, StorageBackendMode};
pub use error::{RestError, RestResult};
pub use state::AppState;

use std::sync::Arc;

use axum::{Router, extract::DefaultBodyLimit, http::HeaderName};
use outpost_persistence::authorization::AuthorizationProvider;
use outpost_persistence::core::DocumentStore;
use tower::ServiceBuilder;
use tower_http::{
    cors::{Any, CorsLayer},
    request_id::{MakeRequestUuid, PropagateRequestIdLayer, SetRequestIdLayer},
    timeout::TimeoutLayer,
    trace::TraceLayer,
};
use tracing::info;

/// Header used for request ids.
pub static X_REQUEST_ID: HeaderName = HeaderName::from_static("x-request-id");

/// Creates the Axum application with default configuration.
///
/// For more control, use [`create_app_with_config`].
pub fn create_app<S>(store: S, authorization: Arc<dyn AuthorizationProvider>) -> Router
where
    S: DocumentStore + 'static,
{
    create_app_with_config(store, authorization, ServerConfig::default())
}

/// Creates the Axum application with custom configuration.
///
/// # Arguments
///
/// * `store` - The document store to read from
/// * `authorization` - Resolves what each offline caller may read
/// * `config` - Server configuration
///
/// # Example
///
/// ```rust,ignore
/// use outpost_rest::{create_app_with_config, ServerConfig};
///
/// let config = ServerConfig {
///     port: 3000,
///     enable_cors: false,
///     ..Default::default()
/// };
/// let app = create_app_with_config(store, authorization, config);
/// ```
pub fn create_app_with_config<S>(
    store: S,
    authorization: Arc<dyn AuthorizationProvider>,
    config: ServerConfig,
) -> Router
where
    S: DocumentStore + 'static,
{
    info!(
        "Creating bulk-read gateway with backend: {}",
        store.backend_name()
    );

    let state = AppState::new(Arc::new(store), authorization, config.clone());

    let router = routing::create_routes(state)
        .layer(DefaultBodyLimit::max(config.max_body_size));

    // Build middleware stack
    let service_builder = ServiceBuilder::new()
        .layer(TraceLayer::new_for_http())
        .layer(TimeoutLayer::with_status_code(
            axum::http::StatusCode::REQUEST_TIMEOUT,
            std::time::Duration::from_secs(config.request_timeout),
        ));

    // Add CORS if enabled
    let router = if config.enable_cors {
        let cors = build_cors_layer(&config);
        router.layer(cors)
    } else {
        router
    };

    let router = router.layer(service_builder);

    // Request ids wrap everything so the trace span can record them
    if config.enable_request_id {
        router
            .layer(PropagateRequestIdLayer::new(X_REQUEST_ID.clone()))
            .layer(SetRequestIdLayer::new(
                X_REQUEST_ID.clone(),
                MakeRequestUuid,
            ))
    } else {
        router
    }
}

/// Builds the CORS layer based on configuration.
fn build_cors_layer(config: &ServerConfig) -> CorsLayer {
    let mut cors = CorsLayer::new();

    if config.cors_origins == "*" {
        cors = cors.allow_origin(Any);
    } else {
        let origins: Vec<_> = config::split_list(&config.cors_origins)
            .iter()
            .filter_map(|s| s.parse().ok())
            .collect();
        cors = cors.allow_origin(origins);
    }

    if config.cors_methods == "*" {
        cors = cors.allow_methods(Any);
    } else {
        let methods: Vec<_> = config::split_list(&config.cors_methods)
            .iter()
            .filter_map(|s| s.parse().ok())
            .collect();
        cors = cors.allow_methods(methods);
    }

    if config.cors_headers == "*" {
        cors = cors.allow_headers(Any);
    } else {
        let headers: Vec<_> = config::split_list(&config.cors_headers)
            .iter()
            .filter_map(|s| s.parse().ok())
            .collect();
        cors = cors.allow_headers(headers);
    }

    cors
}

/// Initializes the tracing subscriber for logging.
///
/// This should be called once at application startup. `RUST_LOG` takes
/// precedence over `level`.
pub fn init_logging(level: &str) {
    use tracing_subscriber::{EnvFilter, fmt, prelude::*};

    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| {
        EnvFilter::new(format!(
            "outpost_rest={level},outpost_persistence={level},tower_http=debug"
        ))
    });

    tracing_subscriber::registry()
        .with(fmt::layer())
        .with(filter)
        .init();
}
