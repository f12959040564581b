//! Gateway route configuration.

use axum::{
    Router,
    routing::{get, post},
};
use outpost_persistence::core::DocumentStore;

use crate::handlers;
use crate::state::AppState;

/// Creates all gateway routes.
///
/// # Routes
///
/// ## System-level
/// - `GET /health` - Health check
/// - `GET /_liveness` - Liveness probe
/// - `GET /_readiness` - Readiness probe (touches the store)
/// - `POST /_authorization/_invalidate` - Drop cached authorization contexts
///
/// ## Database-level
/// - `GET /{db}/_all_docs` - Bulk read
/// - `POST /{db}/_all_docs` - Bulk read with a `keys` body
pub fn create_routes<S>(state: AppState<S>) -> Router
where
    S: DocumentStore + 'static,
{
    Router::new()
        // System-level routes
        .route("/health", get(handlers::health_handler::<S>))
        .route("/_liveness", get(handlers::liveness_handler))
        .route("/_readiness", get(handlers::readiness_handler::<S>))
        .route(
            "/_authorization/_invalidate",
            post(handlers::invalidate_handler::<S>),
        )
        // Database-level routes
        .route(
            "/{db}/_all_docs",
            get(handlers::all_docs_handler::<S>).post(handlers::all_docs_handler::<S>),
        )
        // State
        .with_state(state)
}
