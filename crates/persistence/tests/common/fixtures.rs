//! Test fixtures for persistence layer testing.
//!
//! A small health-program hierarchy: one clinic, its people, reports about
//! them, and a deleted report.

#![allow(dead_code)]

use serde_json::{Value, json};

use outpost_persistence::core::{DocumentStore, DocumentWriter};

/// Database used by every fixture.
pub const DB: &str = "medic";

/// The documents seeded by [`seed`], in write order.
pub fn hierarchy_docs() -> Vec<Value> {
    vec![
        json!({"_id": "clinic-1", "type": "clinic", "name": "Riverside"}),
        json!({
            "_id": "person-1",
            "type": "person",
            "name": "Amina",
            "parent": {"_id": "clinic-1"}
        }),
        json!({
            "_id": "person-2",
            "type": "person",
            "name": "Baraka",
            "parent": {"_id": "clinic-2"}
        }),
        json!({
            "_id": "report-1",
            "type": "data_record",
            "form": "pregnancy",
            "fields": {"patient_id": "person-1"}
        }),
        json!({
            "_id": "report-2",
            "type": "data_record",
            "form": "delivery",
            "fields": {"patient_id": "person-2"}
        }),
        json!({"_id": "report-3", "type": "data_record", "form": "visit"}),
    ]
}

/// Creates [`DB`], writes the hierarchy and deletes `report-3`.
pub async fn seed<S: DocumentStore + DocumentWriter>(store: &S) {
    store.create_database(DB).await.unwrap();
    for doc in hierarchy_docs() {
        store.put(DB, doc).await.unwrap();
    }
    store.delete(DB, "report-3").await.unwrap();
}

/// Builds an owned id list.
pub fn ids(values: &[&str]) -> Vec<String> {
    values.iter().map(|v| v.to_string()).collect()
}
