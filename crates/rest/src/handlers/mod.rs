//! HTTP request handlers.
//!
//! - [`all_docs`] - Bulk document reads, filtered for offline callers
//! - [`health`] - Health, liveness and readiness probes
//! - [`authorization`] - Authorization cache invalidation

pub mod all_docs;
pub mod authorization;
pub mod health;

pub use all_docs::all_docs_handler;
pub use authorization::invalidate_handler;
pub use health::{health_handler, liveness_handler, readiness_handler};
