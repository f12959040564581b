//! Document store traits.
//!
//! This module defines [`DocumentStore`], the read surface the bulk-read
//! gateway consumes, and [`DocumentWriter`], the write surface used to seed
//! a store.

use async_trait::async_trait;
use serde_json::Value;

use crate::error::StorageResult;
use crate::types::{AllDocsResult, FetchOptions, KeySelector};

/// Bulk document reads.
///
/// # Row Semantics
///
/// Explicit id reads ([`fetch_by_ids`](Self::fetch_by_ids) and
/// [`KeySelector::Keys`]) return one row per requested id, in request order.
/// Duplicate ids produce duplicate rows. Unknown ids are absent from the
/// result rather than reported as errors. Deleted documents keep a row whose
/// value is flagged `deleted` and whose doc (when bodies are requested) is
/// `null`.
///
/// Range reads ([`KeySelector::Range`]) return live documents only, ordered
/// bytewise by id (reversed when `descending=true`), and report `total_rows`
/// and `offset`.
///
/// `skip` and `limit` from [`FetchOptions::passthrough`] apply to both kinds.
///
/// # Errors
///
/// * `StorageError::Database(NotFound)` - If the database does not exist
/// * `StorageError::Backend` - If the backend fails or is unreachable
#[async_trait]
pub trait DocumentStore: Send + Sync {
    /// Returns a human-readable name for this storage backend.
    fn backend_name(&self) -> &'static str;

    /// Reads the given ids.
    async fn fetch_by_ids(
        &self,
        db: &str,
        ids: &[String],
        options: &FetchOptions,
    ) -> StorageResult<AllDocsResult>;

    /// Reads by explicit key list or by id range.
    async fn fetch_by_range(
        &self,
        db: &str,
        selector: &KeySelector,
        options: &FetchOptions,
    ) -> StorageResult<AllDocsResult>;

    /// Checks that the backend can serve requests.
    async fn health_check(&self) -> StorageResult<()> {
        Ok(())
    }
}

/// Document writes.
#[async_trait]
pub trait DocumentWriter: Send + Sync {
    /// Creates an empty database. Creating an existing database is a no-op.
    async fn create_database(&self, db: &str) -> StorageResult<()>;

    /// Writes a document, returning its new revision.
    ///
    /// The id is taken from `_id`. A body carrying `"_deleted": true` is
    /// written as a deletion.
    async fn put(&self, db: &str, doc: Value) -> StorageResult<String>;

    /// Marks a document deleted, returning the deletion revision.
    ///
    /// # Errors
    ///
    /// * `StorageError::Database(DocumentNotFound)` - If the document does not exist
    async fn delete(&self, db: &str, id: &str) -> StorageResult<String>;
}

/// Extracts the document id from a body about to be written.
pub(crate) fn document_id(doc: &Value) -> StorageResult<String> {
    match doc.get("_id").and_then(Value::as_str) {
        Some(id) if !id.is_empty() => Ok(id.to_string()),
        _ => Err(crate::error::DatabaseError::InvalidDocument {
            message: "document must have a non-empty string _id".to_string(),
        }
        .into()),
    }
}

/// Returns `true` if the body asks to be written as a deletion.
pub(crate) fn is_deletion(doc: &Value) -> bool {
    doc.get("_deleted").and_then(Value::as_bool).unwrap_or(false)
}
