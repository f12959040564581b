//! Authorization cache administration.

use axum::{Json, body::Bytes, extract::State};
use outpost_persistence::core::DocumentStore;
use serde::Deserialize;
use serde_json::{Value, json};
use tracing::info;

use crate::error::{RestError, RestResult};
use crate::extractors::{Caller, parse_body};
use crate::state::AppState;

#[derive(Debug, Default, Deserialize)]
struct InvalidateRequest {
    user: Option<String>,
}

/// Handler that drops cached authorization contexts.
///
/// Called when the entity hierarchy or a user's grants change, so the next
/// read by the affected callers recomputes what they may see.
///
/// # HTTP Request
///
/// `POST [base]/_authorization/_invalidate` with optional body `{"user": "..."}`.
/// Without a user every cached context is dropped.
///
/// # Response
///
/// - `200 OK` - `{"ok": true}`
/// - `403 Forbidden` - The caller does not hold an online role
pub async fn invalidate_handler<S>(
    State(state): State<AppState<S>>,
    caller: Caller,
    body: Bytes,
) -> RestResult<Json<Value>>
where
    S: DocumentStore + 'static,
{
    let caller = caller.into_identity();
    if !state.is_online(&caller) {
        return Err(RestError::Forbidden {
            message: "Only online users may invalidate authorization.".to_string(),
        });
    }

    let request = match parse_body(&body)? {
        Some(value) => serde_json::from_value::<InvalidateRequest>(value)?,
        None => InvalidateRequest::default(),
    };

    let user = request.user.as_deref();
    state.authorization().invalidate(user).await;
    info!(by = %caller.user(), user = ?user, "Invalidated authorization contexts");

    Ok(Json(json!({"ok": true})))
}
