//! Bulk-read behavior for offline and online callers.
//!
//! Covers:
//! - Explicit ids: completeness, request order, forbidden stubs
//! - Range reads: inclusivity, alias resolution, native id order
//! - Deleted documents: visible by id, invisible to range reads
//! - Paging and totals: counted over visible live rows only
//! - Online callers: unfiltered native responses

mod common;

use std::sync::Arc;

use axum::http::StatusCode;
use outpost_persistence::authorization::GrantsAuthorization;
use outpost_persistence::backends::memory::MemoryBackend;
use serde_json::{Value, json};

use common::fixtures::{self, CHW, NEWCOMER};
use common::harness::{GatewayHarness, row_ids};

const ALL_DOCS: &str = "/medic/_all_docs";

// =============================================================================
// Explicit ids
// =============================================================================

mod explicit_ids {
    use super::*;

    #[tokio::test]
    async fn test_one_row_per_requested_id_in_request_order() {
        let harness = GatewayHarness::memory().await;
        let keys = ["person-2", "report-1", "ghost", "clinic-1", "report-1"];

        let response = harness
            .post_as(CHW, ALL_DOCS, &json!({ "keys": keys }))
            .await;

        response.assert_status_ok();
        assert_eq!(row_ids(&response), keys);
    }

    #[tokio::test]
    async fn test_forbidden_stub_is_exact() {
        let harness = GatewayHarness::memory().await;

        let response = harness
            .post_as(CHW, ALL_DOCS, &json!({"keys": ["person-2", "clinic-1"]}))
            .await;
        let body: Value = response.json();

        assert_eq!(body["rows"][0], json!({"id": "person-2", "error": "forbidden"}));
        assert_eq!(body["rows"][1]["id"], "clinic-1");
        assert_eq!(body["rows"][1]["key"], "clinic-1");
        assert!(body["rows"][1]["value"]["rev"].as_str().unwrap().starts_with("1-"));
    }

    #[tokio::test]
    async fn test_keys_query_parameter() {
        let harness = GatewayHarness::memory().await;

        let response = harness
            .get_as(CHW, ALL_DOCS)
            .add_query_param("keys", r#"["report-2","person-1"]"#)
            .await;

        response.assert_status_ok();
        let body: Value = response.json();
        assert_eq!(body["rows"][0], json!({"id": "report-2", "error": "forbidden"}));
        assert_eq!(body["rows"][1]["id"], "person-1");
    }

    #[tokio::test]
    async fn test_single_key_parameter() {
        let harness = GatewayHarness::memory().await;

        let response = harness
            .get_as(CHW, ALL_DOCS)
            .add_query_param("key", r#""person-1""#)
            .await;

        assert_eq!(row_ids(&response), ["person-1"]);
    }

    #[tokio::test]
    async fn test_no_leakage_with_bodies() {
        let harness = GatewayHarness::memory().await;

        let response = harness
            .post_as(
                CHW,
                ALL_DOCS,
                &json!({"keys": ["report-2", "report-1", "person-2"]}),
            )
            .add_query_param("include_docs", "true")
            .await;
        let body: Value = response.json();
        let rows = body["rows"].as_array().unwrap();

        assert_eq!(rows.len(), 3);
        assert_eq!(rows[0], json!({"id": "report-2", "error": "forbidden"}));
        assert_eq!(rows[1]["doc"]["_id"], "report-1");
        assert_eq!(rows[1]["doc"]["fields"]["patient_id"], "person-1");
        assert_eq!(rows[2], json!({"id": "person-2", "error": "forbidden"}));
    }

    #[tokio::test]
    async fn test_bodies_are_authorized_by_content() {
        let harness = GatewayHarness::memory().await;

        // report-4 is about person-1 but missing from the precomputed ids:
        // only the body-inspecting path can see that it belongs to the CHW.
        let with_bodies = harness
            .post_as(CHW, ALL_DOCS, &json!({"keys": ["report-4"]}))
            .add_query_param("include_docs", "true")
            .await;
        assert_eq!(with_bodies.json::<Value>()["rows"][0]["doc"]["_id"], "report-4");

        let metadata_only = harness
            .post_as(CHW, ALL_DOCS, &json!({"keys": ["report-4"]}))
            .await;
        assert_eq!(
            metadata_only.json::<Value>()["rows"][0],
            json!({"id": "report-4", "error": "forbidden"})
        );
    }

    #[tokio::test]
    async fn test_explicit_ids_ignore_range() {
        let harness = GatewayHarness::memory().await;

        let response = harness
            .get_as(CHW, ALL_DOCS)
            .add_query_param("keys", r#"["report-1","clinic-1"]"#)
            .add_query_param("startkey", r#""x""#)
            .add_query_param("endkey", r#""y""#)
            .await;

        assert_eq!(row_ids(&response), ["report-1", "clinic-1"]);
        assert!(
            response.json::<Value>()["rows"]
                .as_array()
                .unwrap()
                .iter()
                .all(|row| row.get("error").is_none())
        );
    }

    #[tokio::test]
    async fn test_empty_keys_body() {
        let harness = GatewayHarness::memory().await;

        let response = harness.post_as(CHW, ALL_DOCS, &json!({"keys": []})).await;

        response.assert_status_ok();
        assert_eq!(response.json::<Value>()["rows"], json!([]));
    }

    #[tokio::test]
    async fn test_no_totals_with_or_without_bodies() {
        let harness = GatewayHarness::memory().await;

        for include_docs in ["false", "true"] {
            let response = harness
                .post_as(CHW, ALL_DOCS, &json!({"keys": ["person-2", "clinic-1"]}))
                .add_query_param("include_docs", include_docs)
                .await;
            let body: Value = response.json();

            assert!(body.get("total_rows").is_none(), "include_docs={include_docs}");
            assert!(body.get("offset").is_none(), "include_docs={include_docs}");
            assert_eq!(row_ids(&response), ["person-2", "clinic-1"]);
        }
    }

    #[tokio::test]
    async fn test_user_without_grants_gets_only_stubs() {
        let harness = GatewayHarness::memory().await;

        let response = harness
            .post_as(NEWCOMER, ALL_DOCS, &json!({"keys": ["clinic-1", "person-1"]}))
            .await;

        assert_eq!(
            response.json::<Value>(),
            json!({"rows": [
                {"id": "clinic-1", "error": "forbidden"},
                {"id": "person-1", "error": "forbidden"}
            ]})
        );
    }
}

// =============================================================================
// Range reads
// =============================================================================

mod range {
    use super::*;

    #[tokio::test]
    async fn test_unbounded_range_follows_native_id_order() {
        let harness = GatewayHarness::memory().await;

        let response = harness.get_as(CHW, ALL_DOCS).await;

        response.assert_status_ok();
        assert_eq!(row_ids(&response), ["clinic-1", "person-1", "report-1"]);
    }

    #[tokio::test]
    async fn test_inclusive_end() {
        let harness = GatewayHarness::memory().await;

        let inclusive = harness
            .get_as(CHW, ALL_DOCS)
            .add_query_param("startkey", r#""person-1""#)
            .add_query_param("endkey", r#""report-1""#)
            .await;
        assert_eq!(row_ids(&inclusive), ["person-1", "report-1"]);

        let exclusive = harness
            .get_as(CHW, ALL_DOCS)
            .add_query_param("startkey", r#""person-1""#)
            .add_query_param("endkey", r#""report-1""#)
            .add_query_param("inclusive_end", "false")
            .await;
        assert_eq!(row_ids(&exclusive), ["person-1"]);
    }

    #[tokio::test]
    async fn test_last_start_alias_wins() {
        let harness = GatewayHarness::memory().await;

        let response = harness
            .get_as(CHW, ALL_DOCS)
            .add_query_param("startkey", r#""clinic-1""#)
            .add_query_param("start_key", r#""report-1""#)
            .await;

        assert_eq!(row_ids(&response), ["report-1"]);
    }

    #[tokio::test]
    async fn test_docid_alias_is_raw() {
        let harness = GatewayHarness::memory().await;

        let response = harness
            .get_as(CHW, ALL_DOCS)
            .add_query_param("end_key_doc_id", "person-1")
            .await;

        assert_eq!(row_ids(&response), ["clinic-1", "person-1"]);
    }

    #[tokio::test]
    async fn test_descending() {
        let harness = GatewayHarness::memory().await;

        let response = harness
            .get_as(CHW, ALL_DOCS)
            .add_query_param("descending", "true")
            .add_query_param("startkey", r#""report-1""#)
            .add_query_param("endkey", r#""person-1""#)
            .await;

        assert_eq!(row_ids(&response), ["report-1", "person-1"]);
    }

    #[tokio::test]
    async fn test_limit_passes_through() {
        let harness = GatewayHarness::memory().await;

        let response = harness
            .get_as(CHW, ALL_DOCS)
            .add_query_param("limit", "2")
            .await;

        assert_eq!(row_ids(&response), ["clinic-1", "person-1"]);
    }

    #[tokio::test]
    async fn test_limit_counts_live_rows_only() {
        let store = MemoryBackend::new();
        fixtures::seed(&store).await;
        // report-3 is deleted but granted by its plain id
        let grants = GrantsAuthorization::from_json(
            r#"{"users": {"chw": {"allowed_ids": ["report-4", "report-3", "clinic-1"]}}}"#,
        )
        .unwrap();
        let harness = GatewayHarness::new(store, Arc::new(grants));

        let response = harness
            .get_as(CHW, ALL_DOCS)
            .add_query_param("limit", "2")
            .await;

        assert_eq!(row_ids(&response), ["clinic-1", "report-4"]);
    }

    #[tokio::test]
    async fn test_totals_describe_only_visible_rows() {
        let harness = GatewayHarness::memory().await;

        let response = harness
            .get_as(CHW, ALL_DOCS)
            .add_query_param("skip", "1")
            .await;
        let body: Value = response.json();

        assert_eq!(row_ids(&response), ["person-1", "report-1"]);
        assert_eq!(body["total_rows"], 3);
        assert_eq!(body["offset"], 1);
    }

    #[tokio::test]
    async fn test_nothing_authorized_short_circuits() {
        let harness = GatewayHarness::memory().await;

        let response = harness.get_as(NEWCOMER, ALL_DOCS).await;

        response.assert_status_ok();
        assert_eq!(response.json::<Value>(), json!({"rows": []}));
    }

    #[tokio::test]
    async fn test_empty_intersection_returns_empty_rows() {
        let harness = GatewayHarness::memory().await;

        let response = harness
            .get_as(CHW, ALL_DOCS)
            .add_query_param("startkey", r#""zzz""#)
            .await;

        assert_eq!(response.json::<Value>(), json!({"rows": []}));
    }
}

// =============================================================================
// Deleted documents
// =============================================================================

mod tombstones {
    use super::*;

    #[tokio::test]
    async fn test_deleted_id_is_reported_when_asked_for() {
        let harness = GatewayHarness::memory().await;

        let response = harness
            .post_as(CHW, ALL_DOCS, &json!({"keys": ["report-3"]}))
            .await;
        let row = &response.json::<Value>()["rows"][0];

        assert_eq!(row["id"], "report-3");
        assert_eq!(row["value"]["deleted"], true);
        assert!(row["value"]["rev"].as_str().unwrap().starts_with("2-"));
    }

    #[tokio::test]
    async fn test_deleted_id_is_absent_from_ranges() {
        let harness = GatewayHarness::memory().await;

        let response = harness
            .get_as(CHW, ALL_DOCS)
            .add_query_param("startkey", r#""report""#)
            .await;

        assert_eq!(row_ids(&response), ["report-1"]);
    }
}

// =============================================================================
// Determinism
// =============================================================================

#[tokio::test]
async fn test_repeated_requests_are_byte_identical() {
    let harness = GatewayHarness::memory().await;
    let body = json!({"keys": ["report-2", "clinic-1", "report-3", "person-1"]});

    let first = harness.post_as(CHW, ALL_DOCS, &body).await.text();
    let second = harness.post_as(CHW, ALL_DOCS, &body).await.text();
    assert_eq!(first, second);

    let first = harness.get_as(CHW, ALL_DOCS).await.text();
    let second = harness.get_as(CHW, ALL_DOCS).await.text();
    assert_eq!(first, second);
}

// =============================================================================
// Online callers
// =============================================================================

mod online {
    use super::*;

    #[tokio::test]
    async fn test_explicit_ids_are_not_stubbed() {
        let harness = GatewayHarness::memory().await;

        let response = harness
            .post_online(ALL_DOCS, &json!({"keys": ["person-2", "ghost"]}))
            .await;

        response.assert_status_ok();
        let body: Value = response.json();
        assert_eq!(body["rows"].as_array().unwrap().len(), 1);
        assert_eq!(body["rows"][0]["id"], "person-2");
        assert!(body["rows"][0].get("error").is_none());
    }

    #[tokio::test]
    async fn test_range_reads_everything_live() {
        let harness = GatewayHarness::memory().await;

        let response = harness.get_online(ALL_DOCS).await;
        let body: Value = response.json();

        assert_eq!(
            row_ids(&response),
            ["clinic-1", "person-1", "person-2", "report-1", "report-2", "report-4"]
        );
        assert_eq!(body["total_rows"], 6);
        assert_eq!(body["offset"], 0);
    }

    #[tokio::test]
    async fn test_online_role_needs_no_grants() {
        let harness = GatewayHarness::memory().await;

        // The admin has no grants entry; an offline lookup would fail
        let response = harness
            .get_online(ALL_DOCS)
            .add_query_param("key", r#""report-2""#)
            .await;

        response.assert_status(StatusCode::OK);
        assert_eq!(row_ids(&response), ["report-2"]);
    }
}
