//! SQLite backend implementation.
//!
//! This module provides a SQLite implementation of [`DocumentStore`] and
//! [`DocumentWriter`]. It supports both in-memory databases (for tests and
//! throwaway gateways) and file-based databases.
//!
//! # Example
//!
//! ```no_run
//! use outpost_persistence::backends::sqlite::SqliteBackend;
//!
//! # fn main() -> Result<(), Box<dyn std::error::Error>> {
//! // Create an in-memory database
//! let backend = SqliteBackend::in_memory()?;
//!
//! // Initialize the schema
//! backend.init_schema()?;
//! # Ok(())
//! # }
//! ```
//!
//! # Schema
//!
//! ```sql
//! CREATE TABLE databases (
//!     name TEXT PRIMARY KEY,
//!     created_at TEXT NOT NULL
//! );
//!
//! CREATE TABLE documents (
//!     db TEXT NOT NULL,
//!     id TEXT NOT NULL,
//!     rev TEXT NOT NULL,
//!     deleted INTEGER NOT NULL DEFAULT 0,
//!     data BLOB NOT NULL,  -- JSON body without _id / _rev
//!     updated_at TEXT NOT NULL,
//!     PRIMARY KEY (db, id)
//! );
//! ```
//!
//! Ids are compared with SQLite's default `BINARY` collation, which matches
//! the bytewise order range reads are defined over.
//!
//! [`DocumentStore`]: crate::core::DocumentStore
//! [`DocumentWriter`]: crate::core::DocumentWriter

mod backend;
mod schema;
mod storage;

pub use backend::{SqliteBackend, SqliteBackendConfig};
