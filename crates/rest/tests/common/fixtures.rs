//! Test fixtures for gateway testing.
//!
//! A small health-program hierarchy. The CHW `chw` is attached to
//! `clinic-1` and `person-1`; `clinic-2`'s people and their reports are out
//! of reach.

use serde_json::{Value, json};

use outpost_persistence::authorization::{GrantsAuthorization, GrantsDocument};
use outpost_persistence::core::DocumentWriter;

/// Database used by every fixture.
pub const DB: &str = "medic";

/// Offline user with grants.
pub const CHW: &str = "chw";

/// Offline user whose grants are empty.
pub const NEWCOMER: &str = "newcomer";

/// Online user; absent from the grants on purpose.
pub const ADMIN: &str = "admin";

/// Role that bypasses filtering in [`ServerConfig::for_testing`](outpost_rest::ServerConfig::for_testing).
pub const ONLINE_ROLE: &str = "national_admin";

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
        // About person-1 but not yet in the precomputed grants
        json!({
            "_id": "report-4",
            "type": "data_record",
            "form": "visit",
            "fields": {"patient_id": "person-1"}
        }),
    ]
}

/// Creates [`DB`], writes the hierarchy and deletes `report-3`.
pub async fn seed<S: DocumentWriter + ?Sized>(store: &S) {
    store.create_database(DB).await.unwrap();
    for doc in hierarchy_docs() {
        store.put(DB, doc).await.unwrap();
    }
    store.delete(DB, "report-3").await.unwrap();
}

/// Grants for [`CHW`] and [`NEWCOMER`].
///
/// The allowed ids are deliberately unsorted and include the tombstone of
/// the deleted `report-3`.
pub fn grants_document() -> GrantsDocument {
    serde_json::from_value(json!({
        "users": {
            CHW: {
                "subjects": ["clinic-1", "person-1"],
                "allowed_ids": [
                    "report-1",
                    "person-1",
                    "clinic-1",
                    "report-3____2-0f1e____tombstone"
                ]
            },
            NEWCOMER: {
                "subjects": [],
                "allowed_ids": []
            }
        }
    }))
    .unwrap()
}

/// A grants provider over [`grants_document`].
pub fn grants() -> GrantsAuthorization {
    GrantsAuthorization::new(grants_document())
}

/// Builds an owned id list.
pub fn ids(values: &[&str]) -> Vec<String> {
    values.iter().map(|v| v.to_string()).collect()
}
