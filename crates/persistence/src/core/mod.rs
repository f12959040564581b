//! Core store traits.
//!
//! - [`DocumentStore`] - Bulk reads by id list or key range
//! - [`DocumentWriter`] - Database creation and document writes (seeding, tests)
//!
//! The bulk-read surface mirrors the store's native `_all_docs` protocol so
//! a filtering layer in front of it can reproduce native responses exactly.
//!
//! # Example: Implementing a Store
//!
//! ```ignore
//! use async_trait::async_trait;
//! use outpost_persistence::core::DocumentStore;
//! use outpost_persistence::error::StorageResult;
//! use outpost_persistence::types::{AllDocsResult, FetchOptions, KeySelector};
//!
//! struct MyStore;
//!
//! #[async_trait]
//! impl DocumentStore for MyStore {
//!     fn backend_name(&self) -> &'static str {
//!         "my-store"
//!     }
//!
//!     async fn fetch_by_ids(
//!         &self,
//!         db: &str,
//!         ids: &[String],
//!         options: &FetchOptions,
//!     ) -> StorageResult<AllDocsResult> {
//!         todo!()
//!     }
//!
//!     async fn fetch_by_range(
//!         &self,
//!         db: &str,
//!         selector: &KeySelector,
//!         options: &FetchOptions,
//!     ) -> StorageResult<AllDocsResult> {
//!         todo!()
//!     }
//! }
//! ```

pub mod storage;

pub use storage::{DocumentStore, DocumentWriter};
