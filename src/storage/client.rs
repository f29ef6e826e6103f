//! Client details store trait.
//!
//! Defines the interface for the external client-details collaborator.
//! Implementations are provided by storage backends; an in-memory
//! implementation for tests and embedders lives in
//! [`crate::storage::memory`].

use async_trait::async_trait;

use crate::AuthResult;

/// A raw client registration as persisted by the backing store.
///
/// Records are unvalidated: grant types are plain strings and no
/// invariant is enforced at this layer. The
/// [`ClientRegistry`](crate::registry::ClientRegistry) converts records
/// into validated [`ClientDescriptor`](crate::types::ClientDescriptor)s
/// at resolution time.
#[derive(Debug, Clone, serde::Serialize, serde::Deserialize)]
pub struct ClientRecord {
    /// Unique client identifier.
    pub client_id: String,

    /// Client secret as stored.
    pub client_secret: String,

    /// Resource server identifiers.
    #[serde(default)]
    pub resource_ids: Vec<String>,

    /// Allowed scopes.
    #[serde(default)]
    pub scopes: Vec<String>,

    /// Authorized grant types, unparsed.
    #[serde(default)]
    pub authorized_grant_types: Vec<String>,

    /// Granted role identifiers.
    #[serde(default)]
    pub authorities: Vec<String>,

    /// Access token validity in seconds. `0` means the system default.
    #[serde(default)]
    pub access_token_validity: u64,

    /// Refresh token validity in seconds. `0` means the system default.
    #[serde(default)]
    pub refresh_token_validity: u64,
}

/// Storage operations for OAuth 2.0 client registrations.
///
/// # Errors
///
/// `find_by_client_id` may fail with
/// [`AuthError::IllegalArgument`](crate::error::AuthError::IllegalArgument)
/// for ids the backend rejects outright, or with a storage fault. The
/// registry maps both a miss and a fault to the same resolution failure,
/// so callers cannot probe which ids exist.
#[async_trait]
pub trait ClientDetailsStore: Send + Sync {
    /// Find a client record by its OAuth `client_id`.
    ///
    /// Returns `None` if no record exists for the id.
    ///
    /// # Errors
    ///
    /// Returns an error if the lookup fails.
    async fn find_by_client_id(&self, client_id: &str) -> AuthResult<Option<ClientRecord>>;
}
