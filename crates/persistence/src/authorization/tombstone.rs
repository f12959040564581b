//! Tombstone identifiers.
//!
//! When a document is deleted the authorization index keeps a marker for it
//! under a distinct id of the form `<id>____<rev>____tombstone`, so the
//! deletion can still be attributed to the subjects that could see the live
//! document. The store itself keeps serving the deleted row under the
//! original id.

use std::collections::HashSet;
use std::fmt;

const SEPARATOR: &str = "____";
const SUFFIX: &str = "tombstone";

/// A parsed tombstone identifier.
///
/// # Examples
///
/// ```
/// use outpost_persistence::authorization::TombstoneId;
///
/// let tombstone = TombstoneId::new("report-1", "3-abc");
/// assert_eq!(tombstone.to_string(), "report-1____3-abc____tombstone");
///
/// let parsed = TombstoneId::parse("report-1____3-abc____tombstone").unwrap();
/// assert_eq!(parsed, tombstone);
/// assert!(TombstoneId::parse("report-1").is_none());
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct TombstoneId {
    id: String,
    rev: String,
}

impl TombstoneId {
    /// Creates the tombstone id for revision `rev` of document `id`.
    pub fn new(id: impl Into<String>, rev: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            rev: rev.into(),
        }
    }

    /// Parses a tombstone id, returning `None` for ordinary document ids.
    ///
    /// Document ids may themselves contain the separator, so the revision is
    /// taken from the last separated segment before the suffix.
    pub fn parse(value: &str) -> Option<Self> {
        let rest = value.strip_suffix(SUFFIX)?.strip_suffix(SEPARATOR)?;
        let (id, rev) = rest.rsplit_once(SEPARATOR)?;
        if id.is_empty() || rev.is_empty() {
            return None;
        }
        Some(Self::new(id, rev))
    }

    /// Returns `true` if `value` is a tombstone id.
    pub fn is_tombstone(value: &str) -> bool {
        Self::parse(value).is_some()
    }

    /// The id of the deleted document.
    pub fn id(&self) -> &str {
        &self.id
    }

    /// The deletion revision.
    pub fn rev(&self) -> &str {
        &self.rev
    }
}

impl fmt::Display for TombstoneId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}{SEPARATOR}{}{SEPARATOR}{SUFFIX}", self.id, self.rev)
    }
}

/// Replaces tombstone ids with the id the store serves the deleted row under.
///
/// Order follows the input; an id produced twice (a live id next to its own
/// tombstone, or two tombstones of one document) is kept once.
pub fn to_tombstone_form(ids: &[String]) -> Vec<String> {
    let mut seen = HashSet::with_capacity(ids.len());
    ids.iter()
        .map(|id| match TombstoneId::parse(id) {
            Some(tombstone) => tombstone.id,
            None => id.clone(),
        })
        .filter(|id| seen.insert(id.clone()))
        .collect()
}

/// Drops tombstone ids, keeping live document ids in order.
pub fn exclude_tombstones(ids: &[String]) -> Vec<String> {
    ids.iter()
        .filter(|id| !TombstoneId::is_tombstone(id))
        .cloned()
        .collect()
}
