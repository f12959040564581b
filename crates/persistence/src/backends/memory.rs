//! In-memory document store.

use std::collections::{BTreeMap, HashMap};

use async_trait::async_trait;
use parking_lot::RwLock;
use serde_json::Value;
use tracing::debug;

use crate::core::storage::{document_id, is_deletion};
use crate::core::{DocumentStore, DocumentWriter};
use crate::error::{DatabaseError, StorageResult};
use crate::types::{
    AllDocsResult, FetchOptions, KeySelector, ResultRow, StoredDocument, next_revision,
};

type Database = BTreeMap<String, StoredDocument>;

/// A document store held entirely in memory.
///
/// Databases are `BTreeMap`s keyed by id, which gives range reads the
/// store's bytewise id order for free.
///
/// # Example
///
/// ```
/// use outpost_persistence::backends::memory::MemoryBackend;
/// use outpost_persistence::core::{DocumentStore, DocumentWriter};
/// use outpost_persistence::types::FetchOptions;
/// use serde_json::json;
///
/// # let rt = tokio::runtime::Runtime::new().unwrap();
/// # rt.block_on(async {
/// let store = MemoryBackend::with_database("medic");
/// store.put("medic", json!({"_id": "a", "type": "person"})).await.unwrap();
///
/// let result = store
///     .fetch_by_ids("medic", &["a".to_string()], &FetchOptions::default())
///     .await
///     .unwrap();
/// assert_eq!(result.ids(), vec!["a"]);
/// # });
/// ```
#[derive(Debug, Default)]
pub struct MemoryBackend {
    databases: RwLock<HashMap<String, Database>>,
}

impl MemoryBackend {
    /// Creates a store with no databases.
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates a store holding one empty database.
    pub fn with_database(db: &str) -> Self {
        let backend = Self::new();
        backend.databases.write().insert(db.to_string(), Database::new());
        backend
    }

    /// Returns the number of documents (live and deleted) in `db`.
    pub fn document_count(&self, db: &str) -> usize {
        self.databases.read().get(db).map_or(0, BTreeMap::len)
    }

    fn not_found(db: &str) -> crate::error::StorageError {
        DatabaseError::NotFound { db: db.to_string() }.into()
    }
}

fn live_count(docs: &Database) -> u64 {
    docs.values().filter(|doc| !doc.is_deleted()).count() as u64
}

fn rows_for_keys(docs: &Database, ids: &[String], options: &FetchOptions) -> Vec<ResultRow> {
    let rows = ids
        .iter()
        .filter_map(|id| docs.get(id))
        .map(|doc| ResultRow::from(doc.to_row(options.include_docs)));
    options.window(rows)
}

#[async_trait]
impl DocumentStore for MemoryBackend {
    fn backend_name(&self) -> &'static str {
        "memory"
    }

    async fn fetch_by_ids(
        &self,
        db: &str,
        ids: &[String],
        options: &FetchOptions,
    ) -> StorageResult<AllDocsResult> {
        let databases = self.databases.read();
        let docs = databases.get(db).ok_or_else(|| Self::not_found(db))?;

        let rows = rows_for_keys(docs, ids, options);
        debug!(db = %db, requested = ids.len(), returned = rows.len(), "Fetched documents by id");

        Ok(AllDocsResult {
            total_rows: Some(live_count(docs)),
            offset: None,
            rows,
        })
    }

    async fn fetch_by_range(
        &self,
        db: &str,
        selector: &KeySelector,
        options: &FetchOptions,
    ) -> StorageResult<AllDocsResult> {
        let databases = self.databases.read();
        let docs = databases.get(db).ok_or_else(|| Self::not_found(db))?;

        let range = match selector {
            KeySelector::Keys(ids) => {
                return Ok(AllDocsResult {
                    total_rows: Some(live_count(docs)),
                    offset: None,
                    rows: rows_for_keys(docs, ids, options),
                });
            }
            KeySelector::Range(range) => range,
        };

        let descending = options.descending();
        let matching = docs
            .values()
            .filter(|doc| !doc.is_deleted() && range.contains(doc.id(), descending));
        let ordered: Vec<&StoredDocument> = if descending {
            matching.rev().collect()
        } else {
            matching.collect()
        };

        let rows = options.window(
            ordered
                .into_iter()
                .map(|doc| ResultRow::from(doc.to_row(options.include_docs))),
        );
        debug!(db = %db, returned = rows.len(), "Fetched documents by range");

        Ok(AllDocsResult {
            total_rows: Some(live_count(docs)),
            offset: Some(options.skip() as u64),
            rows,
        })
    }
}

#[async_trait]
impl DocumentWriter for MemoryBackend {
    async fn create_database(&self, db: &str) -> StorageResult<()> {
        self.databases.write().entry(db.to_string()).or_default();
        Ok(())
    }

    async fn put(&self, db: &str, doc: Value) -> StorageResult<String> {
        let id = document_id(&doc)?;
        let mut databases = self.databases.write();
        let docs = databases.get_mut(db).ok_or_else(|| Self::not_found(db))?;

        let rev = next_revision(docs.get(&id).map(StoredDocument::rev));
        let stored = if is_deletion(&doc) {
            StoredDocument::deleted(id.clone(), rev.clone())
        } else {
            StoredDocument::new(id.clone(), rev.clone(), doc)
        };
        docs.insert(id, stored);

        Ok(rev)
    }

    async fn delete(&self, db: &str, id: &str) -> StorageResult<String> {
        let mut databases = self.databases.write();
        let docs = databases.get_mut(db).ok_or_else(|| Self::not_found(db))?;

        let previous = docs
            .get(id)
            .ok_or_else(|| DatabaseError::DocumentNotFound {
                db: db.to_string(),
                id: id.to_string(),
            })?;
        let rev = next_revision(Some(previous.rev()));
        docs.insert(id.to_string(), StoredDocument::deleted(id, rev.clone()));

        Ok(rev)
    }
}
