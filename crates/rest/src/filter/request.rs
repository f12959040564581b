//! Bulk-read request normalization.
//!
//! The native protocol lets clients name the same thing several ways: ids in
//! a `keys` query parameter, a `keys` body field or a single `key`, range
//! bounds under four spellings each. This module folds all of that into one
//! [`BulkReadRequest`].

use outpost_persistence::types::FetchOptions;
use serde_json::Value;

use super::error::{FilterError, FilterResult};
use super::range::{END_KEY_PARAMS, RangeParams, START_KEY_PARAMS};

/// Query parameters in the order the client sent them.
///
/// Repeated parameters are all kept; lookups resolve to the last one, which
/// is how the native store treats duplicates.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct QueryParams(Vec<(String, String)>);

impl QueryParams {
    /// Parses a raw, still percent-encoded query string.
    pub fn parse(raw: Option<&str>) -> Self {
        let pairs = raw
            .map(|raw| {
                url::form_urlencoded::parse(raw.as_bytes())
                    .into_owned()
                    .collect()
            })
            .unwrap_or_default();
        Self(pairs)
    }

    /// Returns the last value supplied for `name`.
    pub fn last(&self, name: &str) -> Option<&str> {
        self.last_of(&[name]).map(|(_, value)| value)
    }

    /// Returns the last parameter whose name is any of `names`, as
    /// `(name, value)`.
    pub fn last_of(&self, names: &[&str]) -> Option<(&str, &str)> {
        self.0
            .iter()
            .rev()
            .find(|(key, _)| names.contains(&key.as_str()))
            .map(|(key, value)| (key.as_str(), value.as_str()))
    }

    /// Iterates over all pairs in order.
    pub fn iter(&self) -> impl Iterator<Item = (&str, &str)> {
        self.0.iter().map(|(k, v)| (k.as_str(), v.as_str()))
    }
}

impl<K: Into<String>, V: Into<String>> FromIterator<(K, V)> for QueryParams {
    fn from_iter<I: IntoIterator<Item = (K, V)>>(iter: I) -> Self {
        Self(iter.into_iter().map(|(k, v)| (k.into(), v.into())).collect())
    }
}

/// Derives the explicitly requested ids.
///
/// Precedence follows the native store: the `keys` query parameter, then
/// the body's `keys` field, then a single `key` query parameter. `None`
/// means the request is a range read.
///
/// # Errors
///
/// Returns [`FilterError::MalformedRequest`] when a supplied id list is not
/// valid JSON or is not a list of strings.
///
/// # Examples
///
/// ```
/// use outpost_rest::filter::{QueryParams, extract_request_ids};
/// use serde_json::json;
///
/// let query: QueryParams = [("key", "\"b\"")].into_iter().collect();
/// let body = json!({"keys": ["a"]});
///
/// // Body keys win over a single key
/// let ids = extract_request_ids(&query, Some(&body)).unwrap();
/// assert_eq!(ids, Some(vec!["a".to_string()]));
/// ```
pub fn extract_request_ids(
    query: &QueryParams,
    body: Option<&Value>,
) -> FilterResult<Option<Vec<String>>> {
    if let Some(keys) = query.last("keys").filter(|v| !v.is_empty()) {
        let parsed: Value = serde_json::from_str(keys).map_err(|e| {
            FilterError::malformed(format!("keys parameter is not valid JSON: {}", e))
        })?;
        return id_list(&parsed).map(Some);
    }

    if let Some(keys) = body.and_then(|body| body.get("keys")).filter(|v| !v.is_null()) {
        return id_list(keys).map(Some);
    }

    if let Some(key) = query.last("key").filter(|v| !v.is_empty()) {
        // Clients JSON-encode the key before sending it
        return match serde_json::from_str::<Value>(key) {
            Ok(Value::String(id)) => Ok(Some(vec![id])),
            Ok(_) => Err(FilterError::malformed("key must be a JSON string")),
            Err(e) => Err(FilterError::malformed(format!(
                "key parameter is not valid JSON: {}",
                e
            ))),
        };
    }

    Ok(None)
}

fn id_list(value: &Value) -> FilterResult<Vec<String>> {
    let items = value
        .as_array()
        .ok_or_else(|| FilterError::malformed("keys must be a JSON array"))?;

    items
        .iter()
        .map(|item| {
            item.as_str()
                .map(str::to_string)
                .ok_or_else(|| FilterError::malformed("keys must contain only strings"))
        })
        .collect()
}

/// Parameters the gateway interprets itself; everything else is forwarded.
const CONSUMED_PARAMS: &[&str] = &["keys", "key", "include_docs", "inclusive_end"];

/// A normalized bulk-read request.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BulkReadRequest {
    explicit_ids: Option<Vec<String>>,
    range: RangeParams,
    include_docs: bool,
    passthrough: Vec<(String, String)>,
}

impl BulkReadRequest {
    /// Normalizes a request from its query string and optional JSON body.
    pub fn parse(query: &QueryParams, body: Option<&Value>) -> FilterResult<Self> {
        let explicit_ids = extract_request_ids(query, body)?;
        let range = RangeParams::from_query(query);
        let include_docs = query.last("include_docs") == Some("true");

        let passthrough = query
            .iter()
            .filter(|(name, _)| {
                !CONSUMED_PARAMS.contains(name)
                    && !START_KEY_PARAMS.contains(name)
                    && !END_KEY_PARAMS.contains(name)
            })
            .map(|(name, value)| (name.to_string(), value.to_string()))
            .collect();

        Ok(Self {
            explicit_ids,
            range,
            include_docs,
            passthrough,
        })
    }

    /// The explicitly requested ids, in request order.
    pub fn explicit_ids(&self) -> Option<&[String]> {
        self.explicit_ids.as_deref()
    }

    /// The resolved range bounds. Ignored when explicit ids are present.
    pub fn range(&self) -> &RangeParams {
        &self.range
    }

    /// Whether document bodies were requested.
    pub fn include_docs(&self) -> bool {
        self.include_docs
    }

    /// Options for the store call: the body flag plus every forwarded parameter.
    pub fn fetch_options(&self) -> FetchOptions {
        FetchOptions {
            include_docs: self.include_docs,
            passthrough: self.passthrough.clone(),
        }
    }
}
