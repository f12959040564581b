//! Caller identity and authorization context.

use std::sync::Arc;

use chrono::{DateTime, Utc};

/// Who is making a request, as asserted by the authenticating proxy.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct CallerIdentity {
    user: String,
    roles: Vec<String>,
}

impl CallerIdentity {
    /// Creates an identity for `user` holding `roles`.
    pub fn new(user: impl Into<String>, roles: Vec<String>) -> Self {
        Self {
            user: user.into(),
            roles,
        }
    }

    /// Returns the user name.
    pub fn user(&self) -> &str {
        &self.user
    }

    /// Returns the caller's roles.
    pub fn roles(&self) -> &[String] {
        &self.roles
    }

    /// Returns `true` if the caller holds at least one of `roles`.
    pub fn has_any_role(&self, roles: &[String]) -> bool {
        self.roles.iter().any(|role| roles.contains(role))
    }
}

/// An immutable, ordered snapshot of the document ids a caller may read.
///
/// Cloning shares the snapshot. Order is whatever the authorization index
/// produced; nothing downstream relies on it being sorted.
///
/// # Examples
///
/// ```
/// use outpost_persistence::authorization::AuthorizedIdSet;
///
/// let set = AuthorizedIdSet::from(vec!["b".to_string(), "a".to_string()]);
/// assert_eq!(set.as_slice(), ["b", "a"]);
/// assert!(set.contains("a"));
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct AuthorizedIdSet(Arc<[String]>);

impl AuthorizedIdSet {
    /// Returns the ids in authorization order.
    pub fn as_slice(&self) -> &[String] {
        &self.0
    }

    /// Iterates over the ids.
    pub fn iter(&self) -> std::slice::Iter<'_, String> {
        self.0.iter()
    }

    /// Returns `true` if `id` is in the set.
    pub fn contains(&self, id: &str) -> bool {
        self.0.iter().any(|allowed| allowed == id)
    }

    /// Number of ids.
    pub fn len(&self) -> usize {
        self.0.len()
    }

    /// Returns `true` if the caller may read nothing.
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

impl From<Vec<String>> for AuthorizedIdSet {
    fn from(ids: Vec<String>) -> Self {
        Self(ids.into())
    }
}

impl<'a> IntoIterator for &'a AuthorizedIdSet {
    type Item = &'a String;
    type IntoIter = std::slice::Iter<'a, String>;

    fn into_iter(self) -> Self::IntoIter {
        self.iter()
    }
}

/// A caller's resolved visibility scope.
///
/// Built by an [`AuthorizationProvider`](super::AuthorizationProvider) once
/// per request (or served from its cache). `subjects` are the hierarchy
/// entities the caller is attached to; `allowed_ids` is the id universe
/// derived from them.
#[derive(Debug, Clone)]
pub struct AuthorizationContext {
    caller: CallerIdentity,
    subjects: Arc<[String]>,
    allowed_ids: AuthorizedIdSet,
    resolved_at: DateTime<Utc>,
}

impl AuthorizationContext {
    /// Creates a context resolved now.
    pub fn new(caller: CallerIdentity, subjects: Vec<String>, allowed_ids: AuthorizedIdSet) -> Self {
        Self {
            caller,
            subjects: subjects.into(),
            allowed_ids,
            resolved_at: Utc::now(),
        }
    }

    /// Returns the caller this context was resolved for.
    pub fn caller(&self) -> &CallerIdentity {
        &self.caller
    }

    /// Returns the subjects the caller is attached to.
    pub fn subjects(&self) -> &[String] {
        &self.subjects
    }

    /// Returns `true` if `subject` is one of the caller's subjects.
    pub fn has_subject(&self, subject: &str) -> bool {
        self.subjects.iter().any(|s| s == subject)
    }

    /// Returns the authorized id snapshot.
    pub fn allowed_ids(&self) -> &AuthorizedIdSet {
        &self.allowed_ids
    }

    /// When the context was resolved.
    pub fn resolved_at(&self) -> DateTime<Utc> {
        self.resolved_at
    }

    /// Returns this scope bound to `caller`, keeping subjects, ids and
    /// resolution time.
    pub fn with_caller(mut self, caller: CallerIdentity) -> Self {
        self.caller = caller;
        self
    }
}
