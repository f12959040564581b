//! Authorization collaborator.
//!
//! The bulk-read gateway does not decide which documents a caller may see;
//! it asks an [`AuthorizationProvider`]. This module defines that interface
//! and the types flowing through it, plus two implementations:
//!
//! - [`GrantsAuthorization`] - resolves callers from a precomputed grants document
//! - [`CachedAuthorization`] - bounded per-user context cache with expiry and explicit invalidation
//!
//! Tombstone ids (`<id>____<rev>____tombstone`) are owned here as well; see
//! [`TombstoneId`].

mod cache;
mod context;
mod grants;
mod provider;
mod signals;
mod tombstone;

pub use cache::{AuthorizationCacheConfig, CachedAuthorization};
pub use context::{AuthorizationContext, AuthorizedIdSet, CallerIdentity};
pub use grants::{GrantsAuthorization, GrantsDocument, UserGrant};
pub use provider::AuthorizationProvider;
pub use signals::DocumentSignals;
pub use tombstone::{TombstoneId, exclude_tombstones, to_tombstone_form};
