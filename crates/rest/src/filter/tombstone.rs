//! Choosing the tombstone transform for the authorized id universe.

use outpost_persistence::authorization::AuthorizationProvider;

/// Adapts the authorized ids to the kind of read being served.
///
/// A client asking for specific ids must learn about deletions of ids it
/// already holds, so tombstone ids are converted to the ids their deleted
/// rows are served under. Range reads present live documents only, so
/// tombstone ids are dropped. The transforms themselves belong to the
/// provider.
pub fn adapt_tombstones<A>(provider: &A, authorized_ids: &[String], explicit: bool) -> Vec<String>
where
    A: AuthorizationProvider + ?Sized,
{
    if explicit {
        provider.to_tombstone_form(authorized_ids)
    } else {
        provider.exclude_tombstones(authorized_ids)
    }
}
