//! Final response shaping.

use std::collections::HashMap;

use outpost_persistence::types::{AllDocsResult, ResultRow};

/// Shapes a raw fetch result into the response.
///
/// With explicit ids the response has exactly one row per requested id, in
/// request order: the fetched row when there is one, a forbidden stub
/// otherwise. This is the only place request order is restored. The store's
/// `total_rows` and `offset` are dropped there, since they describe the whole
/// database rather than what the caller may see. Without explicit ids the raw
/// result passes through unchanged.
///
/// # Examples
///
/// ```
/// use outpost_persistence::types::{AllDocsResult, ResultRow};
/// use outpost_rest::filter::reconcile;
///
/// let requested = vec!["secret".to_string()];
/// let response = reconcile(AllDocsResult::empty(), Some(requested.as_slice()));
/// assert_eq!(response.rows, vec![ResultRow::forbidden("secret")]);
/// ```
pub fn reconcile(raw: AllDocsResult, explicit_ids: Option<&[String]>) -> AllDocsResult {
    let Some(requested) = explicit_ids else {
        return raw;
    };

    let mut by_id: HashMap<String, ResultRow> = HashMap::with_capacity(raw.rows.len());
    for row in raw.rows {
        by_id.entry(row.id().to_string()).or_insert(row);
    }

    let rows = requested
        .iter()
        .map(|id| {
            by_id
                .get(id)
                .cloned()
                .unwrap_or_else(|| ResultRow::forbidden(id.as_str()))
        })
        .collect();

    AllDocsResult::from_rows(rows)
}
