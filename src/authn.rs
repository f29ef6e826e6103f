//! Resource-owner authentication collaborator.
//!
//! The user credential subsystem is external to this core; the token
//! issuer only needs a capability that turns a credential into an
//! authenticated [`Principal`] or fails. Password hashing, account
//! lockout, and federation all live behind this seam.

use async_trait::async_trait;

use crate::AuthResult;
use crate::types::Principal;

/// Opaque capability for authenticating resource owners.
///
/// Implementations must be stateless with respect to requests; the
/// issuer calls `authenticate` concurrently from many grants.
#[async_trait]
pub trait AuthenticationBackend: Send + Sync {
    /// Validates a resource-owner credential.
    ///
    /// Returns the authenticated principal on success.
    ///
    /// # Errors
    ///
    /// Returns [`AuthError::AuthenticationFailed`] when the credential
    /// does not verify, or another fault if the backend itself fails.
    /// The issuer folds every failure into the same coarse grant error.
    ///
    /// [`AuthError::AuthenticationFailed`]: crate::error::AuthError::AuthenticationFailed
    async fn authenticate(&self, username: &str, password: &str) -> AuthResult<Principal>;
}
