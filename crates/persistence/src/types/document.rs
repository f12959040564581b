//! Stored document type.
//!
//! [`StoredDocument`] is a document as the store keeps it: the JSON body plus
//! the identifier, current revision and deletion flag the store tracks
//! alongside it.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::Value;

use super::rows::{DocRow, RowValue};

/// A document with its store metadata.
///
/// # Examples
///
/// ```
/// use outpost_persistence::types::StoredDocument;
/// use serde_json::json;
///
/// let doc = StoredDocument::new("contact-1", "2-beef", json!({"type": "person"}));
/// assert_eq!(doc.rev(), "2-beef");
/// assert_eq!(doc.doc()["_id"], "contact-1");
/// assert_eq!(doc.doc()["_rev"], "2-beef");
/// ```
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StoredDocument {
    /// The document identifier.
    id: String,

    /// The current revision.
    rev: String,

    /// Whether the current revision is a deletion.
    deleted: bool,

    /// The document body, without `_id` / `_rev`.
    body: Value,

    /// When the current revision was written.
    updated_at: DateTime<Utc>,
}

impl StoredDocument {
    /// Creates a live document.
    pub fn new(id: impl Into<String>, rev: impl Into<String>, body: Value) -> Self {
        Self {
            id: id.into(),
            rev: rev.into(),
            deleted: false,
            body: strip_reserved(body),
            updated_at: Utc::now(),
        }
    }

    /// Creates a document whose current revision is a deletion.
    pub fn deleted(id: impl Into<String>, rev: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            rev: rev.into(),
            deleted: true,
            body: Value::Object(Default::default()),
            updated_at: Utc::now(),
        }
    }

    /// Rebuilds a document from its stored columns.
    pub fn from_storage(
        id: impl Into<String>,
        rev: impl Into<String>,
        deleted: bool,
        body: Value,
        updated_at: DateTime<Utc>,
    ) -> Self {
        Self {
            id: id.into(),
            rev: rev.into(),
            deleted,
            body: strip_reserved(body),
            updated_at,
        }
    }

    /// Returns the document identifier.
    pub fn id(&self) -> &str {
        &self.id
    }

    /// Returns the current revision.
    pub fn rev(&self) -> &str {
        &self.rev
    }

    /// Returns `true` if the current revision is a deletion.
    pub fn is_deleted(&self) -> bool {
        self.deleted
    }

    /// Returns the stored body without `_id` / `_rev`.
    pub fn body(&self) -> &Value {
        &self.body
    }

    /// Returns when the current revision was written.
    pub fn updated_at(&self) -> DateTime<Utc> {
        self.updated_at
    }

    /// Returns the document as clients see it, with `_id` and `_rev` set.
    pub fn doc(&self) -> Value {
        let mut doc = serde_json::Map::new();
        doc.insert("_id".to_string(), Value::String(self.id.clone()));
        doc.insert("_rev".to_string(), Value::String(self.rev.clone()));
        if let Value::Object(fields) = &self.body {
            for (key, value) in fields {
                doc.insert(key.clone(), value.clone());
            }
        }
        Value::Object(doc)
    }

    /// Renders the document as a bulk-read row.
    ///
    /// Deleted documents keep their row, flagged `deleted` in the value, and
    /// carry a `null` doc when bodies are requested.
    pub fn to_row(&self, include_docs: bool) -> DocRow {
        let doc = match (include_docs, self.deleted) {
            (false, _) => None,
            (true, true) => Some(Value::Null),
            (true, false) => Some(self.doc()),
        };

        DocRow {
            id: self.id.clone(),
            key: self.id.clone(),
            value: RowValue {
                rev: self.rev.clone(),
                deleted: self.deleted,
            },
            doc,
        }
    }
}

/// Computes the revision that follows `previous`.
///
/// Revisions have the form `<generation>-<hex>`; an unparseable previous
/// revision restarts at generation 1.
pub fn next_revision(previous: Option<&str>) -> String {
    let generation = previous
        .and_then(|rev| rev.split_once('-'))
        .and_then(|(generation, _)| generation.parse::<u64>().ok())
        .unwrap_or(0);

    format!("{}-{}", generation + 1, uuid::Uuid::new_v4().simple())
}

fn strip_reserved(body: Value) -> Value {
    match body {
        Value::Object(mut fields) => {
            fields.remove("_id");
            fields.remove("_rev");
            fields.remove("_deleted");
            Value::Object(fields)
        }
        _ => Value::Object(Default::default()),
    }
}
