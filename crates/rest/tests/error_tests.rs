//! Error responses of the gateway.
//!
//! Every failure uses the store's native body `{"error": .., "reason": ..}`
//! and none of them ever carries document content.

mod common;

use std::sync::Arc;

use axum::http::{HeaderName, HeaderValue, StatusCode};
use serde_json::{Value, json};

use common::fixtures::{self, CHW};
use common::harness::{GatewayHarness, UnreachableStore};

const ALL_DOCS: &str = "/medic/_all_docs";

#[tokio::test]
async fn test_missing_identity_is_unauthorized() {
    let harness = GatewayHarness::memory().await;

    let response = harness.server.get(ALL_DOCS).await;

    response.assert_status(StatusCode::UNAUTHORIZED);
    assert_eq!(response.json::<Value>()["error"], "unauthorized");
}

#[tokio::test]
async fn test_unknown_user_is_unauthorized() {
    let harness = GatewayHarness::memory().await;

    let response = harness.get_as("stranger", ALL_DOCS).await;

    response.assert_status(StatusCode::UNAUTHORIZED);
    assert_eq!(response.json::<Value>()["error"], "unauthorized");
}

#[tokio::test]
async fn test_roles_without_online_role_are_filtered() {
    let harness = GatewayHarness::memory().await;

    let response = harness
        .get_as("stranger", ALL_DOCS)
        .add_header(
            HeaderName::from_static("x-user-roles"),
            HeaderValue::from_static("chw,district_admin"),
        )
        .await;

    response.assert_status(StatusCode::UNAUTHORIZED);
}

#[tokio::test]
async fn test_malformed_keys_parameter() {
    let harness = GatewayHarness::memory().await;

    let response = harness
        .get_as(CHW, ALL_DOCS)
        .add_query_param("keys", "[not json")
        .await;

    response.assert_status(StatusCode::BAD_REQUEST);
    assert_eq!(response.json::<Value>()["error"], "bad_request");
}

#[tokio::test]
async fn test_keys_body_must_be_a_list_of_strings() {
    let harness = GatewayHarness::memory().await;

    let not_a_list = harness
        .post_as(CHW, ALL_DOCS, &json!({"keys": "clinic-1"}))
        .await;
    not_a_list.assert_status(StatusCode::BAD_REQUEST);

    let not_strings = harness
        .post_as(CHW, ALL_DOCS, &json!({"keys": ["clinic-1", 7]}))
        .await;
    not_strings.assert_status(StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn test_invalid_json_body() {
    let harness = GatewayHarness::memory().await;

    let response = harness
        .server
        .post(ALL_DOCS)
        .add_header(
            HeaderName::from_static("x-user-id"),
            HeaderValue::from_static(CHW),
        )
        .text("{\"keys\": [")
        .await;

    response.assert_status(StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn test_missing_database() {
    let harness = GatewayHarness::memory().await;

    let response = harness
        .post_as(CHW, "/nope/_all_docs", &json!({"keys": ["clinic-1"]}))
        .await;

    response.assert_status(StatusCode::NOT_FOUND);
    assert_eq!(
        response.json::<Value>(),
        json!({"error": "not_found", "reason": "Database does not exist."})
    );
}

#[tokio::test]
async fn test_unreachable_store() {
    let harness = GatewayHarness::new(UnreachableStore, Arc::new(fixtures::grants()));

    let range = harness.get_as(CHW, ALL_DOCS).await;
    range.assert_status(StatusCode::SERVICE_UNAVAILABLE);
    assert_eq!(range.json::<Value>()["error"], "service_unavailable");

    let with_bodies = harness
        .post_as(CHW, ALL_DOCS, &json!({"keys": ["clinic-1"]}))
        .add_query_param("include_docs", "true")
        .await;
    with_bodies.assert_status(StatusCode::SERVICE_UNAVAILABLE);

    let online = harness.get_online(ALL_DOCS).await;
    online.assert_status(StatusCode::SERVICE_UNAVAILABLE);
}

#[tokio::test]
async fn test_nothing_authorized_never_touches_the_store() {
    let harness = GatewayHarness::new(UnreachableStore, Arc::new(fixtures::grants()));

    let response = harness.get_as(fixtures::NEWCOMER, ALL_DOCS).await;

    response.assert_status_ok();
    assert_eq!(response.json::<Value>(), json!({"rows": []}));
}

#[tokio::test]
async fn test_probes() {
    let healthy = GatewayHarness::memory().await;
    healthy.server.get("/_liveness").await.assert_status_ok();
    healthy.server.get("/_readiness").await.assert_status_ok();

    let health = healthy.server.get("/health").await;
    health.assert_status_ok();
    assert_eq!(health.json::<Value>()["backend"], "memory");

    let down = GatewayHarness::new(UnreachableStore, Arc::new(fixtures::grants()));
    down.server.get("/_liveness").await.assert_status_ok();
    down.server
        .get("/_readiness")
        .await
        .assert_status(StatusCode::SERVICE_UNAVAILABLE);
}
