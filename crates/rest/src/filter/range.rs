//! Range narrowing of the authorized id universe.

use outpost_persistence::types::KeyRange;
use serde_json::Value;

use super::request::QueryParams;

/// Equivalent spellings of the range start bound.
pub const START_KEY_PARAMS: &[&str] = &["startkey", "start_key", "startkey_docid", "start_key_doc_id"];

/// Equivalent spellings of the range end bound.
pub const END_KEY_PARAMS: &[&str] = &["endkey", "end_key", "endkey_docid", "end_key_doc_id"];

/// Spellings that carry a raw document id rather than a JSON-encoded key.
const DOCID_PARAMS: &[&str] = &[
    "startkey_docid",
    "start_key_doc_id",
    "endkey_docid",
    "end_key_doc_id",
];

/// Resolved range bounds of a request.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RangeParams {
    /// Inclusive lower bound.
    pub start: Option<String>,
    /// Upper bound.
    pub end: Option<String>,
    /// Whether `end` itself is included.
    pub inclusive_end: bool,
}

impl Default for RangeParams {
    fn default() -> Self {
        Self {
            start: None,
            end: None,
            inclusive_end: true,
        }
    }
}

impl RangeParams {
    /// Resolves the bounds from query parameters.
    ///
    /// Within each alias group the last parameter supplied wins, whichever
    /// spelling it used. The end bound is exclusive only when
    /// `inclusive_end=false`.
    ///
    /// # Examples
    ///
    /// ```
    /// use outpost_rest::filter::{QueryParams, RangeParams};
    ///
    /// let query: QueryParams = [("startkey", "\"x\""), ("start_key", "\"y\"")]
    ///     .into_iter()
    ///     .collect();
    /// assert_eq!(RangeParams::from_query(&query).start.as_deref(), Some("y"));
    /// ```
    pub fn from_query(query: &QueryParams) -> Self {
        Self {
            start: query.last_of(START_KEY_PARAMS).map(decode_bound),
            end: query.last_of(END_KEY_PARAMS).map(decode_bound),
            inclusive_end: query.last("inclusive_end") != Some("false"),
        }
    }

    /// Returns `true` if no bound is set.
    pub fn is_unbounded(&self) -> bool {
        self.start.is_none() && self.end.is_none()
    }

    /// Returns `true` if `id` falls inside the bounds.
    ///
    /// With `descending` the start bound is the upper one, as in the store.
    pub fn contains(&self, id: &str, descending: bool) -> bool {
        self.to_key_range().contains(id, descending)
    }

    /// Converts the bounds to the store's range type.
    pub fn to_key_range(&self) -> KeyRange {
        KeyRange {
            start: self.start.clone(),
            end: self.end.clone(),
            inclusive_end: self.inclusive_end,
        }
    }
}

/// Decodes a bound value.
///
/// Key spellings carry JSON (`startkey="abc"`); a value that is not a JSON
/// string is taken verbatim. `*_docid` spellings are always verbatim.
fn decode_bound((name, value): (&str, &str)) -> String {
    if DOCID_PARAMS.contains(&name) {
        return value.to_string();
    }
    match serde_json::from_str::<Value>(value) {
        Ok(Value::String(decoded)) => decoded,
        _ => value.to_string(),
    }
}

/// Narrows `authorized_ids` to the requested ids or the requested range.
///
/// With explicit ids the range is ignored and the result is the
/// intersection of both lists **in authorized order**; request order is
/// restored later by reconciliation. Without explicit ids the result is the
/// authorized ids inside `range`, again in authorized order. Ids compare
/// bytewise.
///
/// # Examples
///
/// ```
/// use outpost_rest::filter::{RangeParams, filter_by_range};
///
/// let authorized: Vec<String> = ["d", "a", "c", "b"].map(String::from).to_vec();
/// let requested: Vec<String> = ["b", "d"].map(String::from).to_vec();
///
/// let narrowed = filter_by_range(&authorized, Some(requested.as_slice()), &RangeParams::default(), false);
/// assert_eq!(narrowed, ["d", "b"]);
/// ```
pub fn filter_by_range(
    authorized_ids: &[String],
    explicit_ids: Option<&[String]>,
    range: &RangeParams,
    descending: bool,
) -> Vec<String> {
    match explicit_ids {
        Some(requested) => {
            let requested: std::collections::HashSet<&str> =
                requested.iter().map(String::as_str).collect();
            authorized_ids
                .iter()
                .filter(|id| requested.contains(id.as_str()))
                .cloned()
                .collect()
        }
        None if range.is_unbounded() => authorized_ids.to_vec(),
        None => {
            let bounds = range.to_key_range();
            authorized_ids
                .iter()
                .filter(|id| bounds.contains(id, descending))
                .cloned()
                .collect()
        }
    }
}
