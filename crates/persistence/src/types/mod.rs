//! Core types for the persistence layer.
//!
//! - [`StoredDocument`] - A raw document with its revision and deletion state
//! - [`ResultRow`], [`AllDocsResult`] - Rows of the native bulk-read response
//! - [`FetchOptions`], [`KeySelector`], [`KeyRange`] - What a bulk read asks the store for
//!
//! # Examples
//!
//! ```
//! use outpost_persistence::types::{ResultRow, StoredDocument};
//! use serde_json::json;
//!
//! let doc = StoredDocument::new("report-1", "1-abc", json!({"type": "data_record"}));
//! let row = doc.to_row(false);
//! assert_eq!(row.id, "report-1");
//!
//! let stub = ResultRow::forbidden("report-2");
//! assert_eq!(
//!     serde_json::to_value(&stub).unwrap(),
//!     json!({"id": "report-2", "error": "forbidden"})
//! );
//! ```

mod document;
mod options;
mod rows;

pub use document::{StoredDocument, next_revision};
pub use options::{FetchOptions, KeyRange, KeySelector};
pub use rows::{AllDocsResult, DocRow, ForbiddenRow, ResultRow, RowError, RowValue};
