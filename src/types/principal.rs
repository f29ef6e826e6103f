//! Caller identity types.

use std::collections::BTreeSet;

use serde::{Deserialize, Serialize};

/// The identity of a caller, as established by the authentication
/// collaborator or by client authentication at the token endpoint.
///
/// A principal is either authenticated (carrying a subject and its
/// granted authorities) or anonymous. Authorization predicates such as
/// [`AccessGuard`](crate::token::AccessGuard) branch on that state only.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Principal {
    /// Subject identifier (resource owner or client identity).
    pub subject: String,

    /// Role identifiers granted to this principal.
    #[serde(default)]
    pub authorities: BTreeSet<String>,

    /// Whether this principal was successfully authenticated.
    authenticated: bool,
}

impl Principal {
    /// Creates an authenticated principal.
    #[must_use]
    pub fn authenticated(
        subject: impl Into<String>,
        authorities: impl IntoIterator<Item = String>,
    ) -> Self {
        Self {
            subject: subject.into(),
            authorities: authorities.into_iter().collect(),
            authenticated: true,
        }
    }

    /// Creates an anonymous (unauthenticated) principal.
    #[must_use]
    pub fn anonymous() -> Self {
        Self {
            subject: String::new(),
            authorities: BTreeSet::new(),
            authenticated: false,
        }
    }

    /// Returns `true` if this principal was successfully authenticated.
    #[must_use]
    pub fn is_authenticated(&self) -> bool {
        self.authenticated
    }

    /// Checks whether the principal holds the given authority.
    #[must_use]
    pub fn has_authority(&self, authority: &str) -> bool {
        self.authorities.contains(authority)
    }
}
