//! DocumentStore and DocumentWriter implementations for SQLite.

use async_trait::async_trait;
use chrono::Utc;
use rusqlite::{Connection, OptionalExtension, params, params_from_iter};
use serde_json::Value;
use tracing::debug;

use crate::core::storage::{document_id, is_deletion};
use crate::core::{DocumentStore, DocumentWriter};
use crate::error::{BackendError, DatabaseError, StorageError, StorageResult};
use crate::types::{
    AllDocsResult, FetchOptions, KeyRange, KeySelector, ResultRow, StoredDocument, next_revision,
};

use super::SqliteBackend;

fn internal_error(message: String) -> StorageError {
    StorageError::Backend(BackendError::Internal {
        backend_name: "sqlite".to_string(),
        message,
        source: None,
    })
}

fn serialization_error(message: String) -> StorageError {
    StorageError::Backend(BackendError::SerializationError { message })
}

/// Columns of one `documents` row, as read.
struct DocumentColumns {
    id: String,
    rev: String,
    deleted: bool,
    data: Vec<u8>,
    updated_at: String,
}

impl DocumentColumns {
    const SELECT: &'static str = "SELECT id, rev, deleted, data, updated_at FROM documents";

    fn from_row(row: &rusqlite::Row<'_>) -> rusqlite::Result<Self> {
        let deleted: i32 = row.get(2)?;
        Ok(Self {
            id: row.get(0)?,
            rev: row.get(1)?,
            deleted: deleted != 0,
            data: row.get(3)?,
            updated_at: row.get(4)?,
        })
    }

    fn into_document(self) -> StorageResult<StoredDocument> {
        let body: Value = serde_json::from_slice(&self.data)
            .map_err(|e| serialization_error(format!("Failed to deserialize document: {}", e)))?;

        let updated_at = chrono::DateTime::parse_from_rfc3339(&self.updated_at)
            .map_err(|e| internal_error(format!("Failed to parse updated_at: {}", e)))?
            .with_timezone(&Utc);

        Ok(StoredDocument::from_storage(
            self.id,
            self.rev,
            self.deleted,
            body,
            updated_at,
        ))
    }
}

fn ensure_database(conn: &Connection, db: &str) -> StorageResult<()> {
    let exists = conn
        .query_row("SELECT 1 FROM databases WHERE name = ?1", [db], |_| Ok(()))
        .optional()
        .map_err(|e| internal_error(format!("Failed to look up database: {}", e)))?;

    match exists {
        Some(()) => Ok(()),
        None => Err(DatabaseError::NotFound { db: db.to_string() }.into()),
    }
}

fn live_count(conn: &Connection, db: &str) -> StorageResult<u64> {
    let count: i64 = conn
        .query_row(
            "SELECT COUNT(*) FROM documents WHERE db = ?1 AND deleted = 0",
            [db],
            |row| row.get(0),
        )
        .map_err(|e| internal_error(format!("Failed to count documents: {}", e)))?;
    Ok(count as u64)
}

/// Reads one row per requested id, in request order.
fn rows_for_keys(
    conn: &Connection,
    db: &str,
    ids: &[String],
    options: &FetchOptions,
) -> StorageResult<Vec<ResultRow>> {
    let mut stmt = conn
        .prepare_cached(&format!(
            "{} WHERE db = ?1 AND id = ?2",
            DocumentColumns::SELECT
        ))
        .map_err(|e| internal_error(format!("Failed to prepare statement: {}", e)))?;

    let mut rows = Vec::with_capacity(ids.len());
    for id in ids {
        let columns = stmt
            .query_row(params![db, id], DocumentColumns::from_row)
            .optional()
            .map_err(|e| internal_error(format!("Failed to read document: {}", e)))?;
        if let Some(columns) = columns {
            let doc = columns.into_document()?;
            rows.push(ResultRow::from(doc.to_row(options.include_docs)));
        }
    }

    Ok(options.window(rows))
}

/// Reads live documents inside `range`, with paging pushed down to SQLite.
fn rows_for_range(
    conn: &Connection,
    db: &str,
    range: &KeyRange,
    options: &FetchOptions,
) -> StorageResult<Vec<ResultRow>> {
    let descending = options.descending();
    let mut sql = format!("{} WHERE db = ?1 AND deleted = 0", DocumentColumns::SELECT);
    let mut values: Vec<&str> = vec![db];

    if let Some(start) = &range.start {
        values.push(start);
        let op = if descending { "<=" } else { ">=" };
        sql.push_str(&format!(" AND id {} ?{}", op, values.len()));
    }

    if let Some(end) = &range.end {
        values.push(end);
        let op = match (descending, range.inclusive_end) {
            (false, true) => "<=",
            (false, false) => "<",
            (true, true) => ">=",
            (true, false) => ">",
        };
        sql.push_str(&format!(" AND id {} ?{}", op, values.len()));
    }

    sql.push_str(if descending {
        " ORDER BY id DESC"
    } else {
        " ORDER BY id ASC"
    });

    // SQLite requires LIMIT whenever OFFSET is given; -1 means unbounded
    let limit = options.limit().map_or(-1, |limit| limit as i64);
    sql.push_str(&format!(" LIMIT {} OFFSET {}", limit, options.skip()));

    let mut stmt = conn
        .prepare(&sql)
        .map_err(|e| internal_error(format!("Failed to prepare range query: {}", e)))?;

    let columns = stmt
        .query_map(params_from_iter(values), DocumentColumns::from_row)
        .map_err(|e| internal_error(format!("Failed to execute range query: {}", e)))?;

    let mut rows = Vec::new();
    for columns in columns {
        let columns = columns.map_err(|e| internal_error(format!("Failed to read row: {}", e)))?;
        let doc = columns.into_document()?;
        rows.push(ResultRow::from(doc.to_row(options.include_docs)));
    }

    Ok(rows)
}

fn write_document(conn: &Connection, db: &str, doc: &StoredDocument) -> StorageResult<()> {
    let data = serde_json::to_vec(doc.body())
        .map_err(|e| serialization_error(format!("Failed to serialize document: {}", e)))?;

    conn.execute(
        "INSERT INTO documents (db, id, rev, deleted, data, updated_at)
         VALUES (?1, ?2, ?3, ?4, ?5, ?6)
         ON CONFLICT (db, id) DO UPDATE SET
            rev = excluded.rev,
            deleted = excluded.deleted,
            data = excluded.data,
            updated_at = excluded.updated_at",
        params![
            db,
            doc.id(),
            doc.rev(),
            doc.is_deleted() as i32,
            data,
            doc.updated_at().to_rfc3339(),
        ],
    )
    .map_err(|e| internal_error(format!("Failed to write document: {}", e)))?;

    Ok(())
}

fn current_revision(conn: &Connection, db: &str, id: &str) -> StorageResult<Option<String>> {
    conn.query_row(
        "SELECT rev FROM documents WHERE db = ?1 AND id = ?2",
        params![db, id],
        |row| row.get(0),
    )
    .optional()
    .map_err(|e| internal_error(format!("Failed to read revision: {}", e)))
}

#[async_trait]
impl DocumentStore for SqliteBackend {
    fn backend_name(&self) -> &'static str {
        "sqlite"
    }

    async fn fetch_by_ids(
        &self,
        db: &str,
        ids: &[String],
        options: &FetchOptions,
    ) -> StorageResult<AllDocsResult> {
        let conn = self.get_connection()?;
        ensure_database(&conn, db)?;

        let rows = rows_for_keys(&conn, db, ids, options)?;
        debug!(db = %db, requested = ids.len(), returned = rows.len(), "Fetched documents by id");

        Ok(AllDocsResult {
            total_rows: Some(live_count(&conn, db)?),
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
        let conn = self.get_connection()?;
        ensure_database(&conn, db)?;

        let (rows, offset) = match selector {
            KeySelector::Keys(ids) => (rows_for_keys(&conn, db, ids, options)?, None),
            KeySelector::Range(range) => (
                rows_for_range(&conn, db, range, options)?,
                Some(options.skip() as u64),
            ),
        };
        debug!(db = %db, returned = rows.len(), "Fetched documents by range");

        Ok(AllDocsResult {
            total_rows: Some(live_count(&conn, db)?),
            offset,
            rows,
        })
    }

    async fn health_check(&self) -> StorageResult<()> {
        let conn = self.get_connection()?;
        conn.query_row("SELECT 1", [], |_| Ok(())).map_err(|e| {
            StorageError::Backend(BackendError::Unavailable {
                backend_name: "sqlite".to_string(),
                message: e.to_string(),
            })
        })
    }
}

#[async_trait]
impl DocumentWriter for SqliteBackend {
    async fn create_database(&self, db: &str) -> StorageResult<()> {
        let conn = self.get_connection()?;
        conn.execute(
            "INSERT OR IGNORE INTO databases (name, created_at) VALUES (?1, ?2)",
            params![db, Utc::now().to_rfc3339()],
        )
        .map_err(|e| internal_error(format!("Failed to create database: {}", e)))?;
        Ok(())
    }

    async fn put(&self, db: &str, doc: Value) -> StorageResult<String> {
        let id = document_id(&doc)?;
        let mut conn = self.get_connection()?;
        let tx = conn
            .transaction()
            .map_err(|e| internal_error(format!("Failed to begin transaction: {}", e)))?;
        ensure_database(&tx, db)?;

        let rev = next_revision(current_revision(&tx, db, &id)?.as_deref());
        let stored = if is_deletion(&doc) {
            StoredDocument::deleted(id, rev.clone())
        } else {
            StoredDocument::new(id, rev.clone(), doc)
        };
        write_document(&tx, db, &stored)?;

        tx.commit()
            .map_err(|e| internal_error(format!("Failed to commit transaction: {}", e)))?;
        Ok(rev)
    }

    async fn delete(&self, db: &str, id: &str) -> StorageResult<String> {
        let mut conn = self.get_connection()?;
        let tx = conn
            .transaction()
            .map_err(|e| internal_error(format!("Failed to begin transaction: {}", e)))?;
        ensure_database(&tx, db)?;

        let previous =
            current_revision(&tx, db, id)?.ok_or_else(|| DatabaseError::DocumentNotFound {
                db: db.to_string(),
                id: id.to_string(),
            })?;
        let rev = next_revision(Some(&previous));
        write_document(&tx, db, &StoredDocument::deleted(id, rev.clone()))?;

        tx.commit()
            .map_err(|e| internal_error(format!("Failed to commit transaction: {}", e)))?;
        Ok(rev)
    }
}
