//! Bulk-read result rows.
//!
//! These types serialize field-for-field into the store's native bulk-read
//! response: `{"total_rows": .., "offset": .., "rows": [..]}`.

use serde::{Deserialize, Serialize};
use serde_json::Value;

/// The `value` member of a document row.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RowValue {
    /// Current revision of the document.
    pub rev: String,

    /// Set when the current revision is a deletion.
    #[serde(default, skip_serializing_if = "std::ops::Not::not")]
    pub deleted: bool,
}

/// A row describing a stored document.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DocRow {
    /// Document identifier.
    pub id: String,

    /// Row key; equal to the id for bulk document reads.
    pub key: String,

    /// Revision information.
    pub value: RowValue,

    /// The document body, present only when bodies were requested.
    /// A deleted document carries `null`.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub doc: Option<Value>,
}

/// Error marker carried by stub rows.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RowError {
    /// The document is not visible to the caller.
    Forbidden,
}

/// A stub row standing in for a document the caller may not read.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ForbiddenRow {
    /// The requested identifier.
    pub id: String,

    /// Always [`RowError::Forbidden`].
    pub error: RowError,
}

/// One row of a bulk-read response.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum ResultRow {
    /// A document row as produced by the store.
    Document(DocRow),
    /// A forbidden stub.
    Forbidden(ForbiddenRow),
}

impl ResultRow {
    /// Creates a forbidden stub for `id`.
    pub fn forbidden(id: impl Into<String>) -> Self {
        ResultRow::Forbidden(ForbiddenRow {
            id: id.into(),
            error: RowError::Forbidden,
        })
    }

    /// Returns the row's document id.
    pub fn id(&self) -> &str {
        match self {
            ResultRow::Document(row) => &row.id,
            ResultRow::Forbidden(row) => &row.id,
        }
    }

    /// Returns `true` for forbidden stubs.
    pub fn is_forbidden(&self) -> bool {
        matches!(self, ResultRow::Forbidden(_))
    }

    /// Returns the document body if the row carries a readable one.
    ///
    /// Deleted documents (`doc: null`) and rows fetched without bodies have none.
    pub fn readable_doc(&self) -> Option<&Value> {
        match self {
            ResultRow::Document(DocRow {
                doc: Some(doc @ Value::Object(_)),
                ..
            }) => Some(doc),
            _ => None,
        }
    }
}

impl From<DocRow> for ResultRow {
    fn from(row: DocRow) -> Self {
        ResultRow::Document(row)
    }
}

/// A complete bulk-read response.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct AllDocsResult {
    /// Number of live documents in the database (range reads only).
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub total_rows: Option<u64>,

    /// Number of rows skipped before the first returned row (range reads only).
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub offset: Option<u64>,

    /// The rows.
    pub rows: Vec<ResultRow>,
}

impl AllDocsResult {
    /// Creates a result holding only rows.
    pub fn from_rows(rows: Vec<ResultRow>) -> Self {
        Self {
            total_rows: None,
            offset: None,
            rows,
        }
    }

    /// Creates an empty result: `{"rows": []}`.
    pub fn empty() -> Self {
        Self::default()
    }

    /// Returns the row ids in order.
    pub fn ids(&self) -> Vec<&str> {
        self.rows.iter().map(ResultRow::id).collect()
    }
}
