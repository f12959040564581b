//! Outpost Persistence Layer
//!
//! This crate provides the collaborators the Outpost bulk-read gateway sits
//! in front of: a document store speaking the native `_all_docs` row model,
//! and an authorization provider deciding which of those documents a caller
//! may see.
//!
//! # Features
//!
//! - **Multiple Backends**: in-memory and SQLite (`sqlite` feature, default)
//! - **Native Row Model**: result rows serialize exactly as the store's bulk-read protocol
//! - **Tombstones**: deleted documents stay addressable by id with a `deleted` marker
//! - **Authorization**: pluggable providers, a grants-document implementation and a
//!   bounded per-user context cache with expiry and explicit invalidation
//!
//! # Architecture
//!
//! - [`types`] - Stored documents, fetch options, result rows
//! - [`error`] - Error types for all operations
//! - [`core`] - Store traits
//! - [`backends`] - Store implementations
//! - [`authorization`] - Caller identity, authorization contexts and providers
//!
//! # Quick Start
//!
//! ```
//! use outpost_persistence::backends::memory::MemoryBackend;
//! use outpost_persistence::core::{DocumentStore, DocumentWriter};
//! use outpost_persistence::types::{FetchOptions, KeyRange, KeySelector};
//! use serde_json::json;
//!
//! # let rt = tokio::runtime::Runtime::new().unwrap();
//! # rt.block_on(async {
//! let store = MemoryBackend::with_database("medic");
//! store.put("medic", json!({"_id": "clinic-1", "type": "clinic"})).await.unwrap();
//! store.put("medic", json!({"_id": "person-1", "type": "person"})).await.unwrap();
//!
//! let range = KeySelector::Range(KeyRange {
//!     start: Some("clinic".to_string()),
//!     end: Some("clinic\u{fff0}".to_string()),
//!     inclusive_end: true,
//! });
//! let result = store
//!     .fetch_by_range("medic", &range, &FetchOptions::new(true))
//!     .await
//!     .unwrap();
//! assert_eq!(result.ids(), vec!["clinic-1"]);
//! # });
//! ```

#![warn(missing_docs)]
#![warn(rustdoc::missing_crate_level_docs)]

pub mod authorization;
pub mod backends;
pub mod core;
pub mod error;
pub mod types;

// Re-export commonly used types at crate root
pub use error::{AuthorizationError, AuthorizationResult, StorageError, StorageResult};
pub use types::{AllDocsResult, FetchOptions, ResultRow, StoredDocument};

// Re-export core traits
pub use authorization::AuthorizationProvider;
pub use core::{DocumentStore, DocumentWriter};

/// Crate version.
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

/// Crate name.
pub const NAME: &str = env!("CARGO_PKG_NAME");
