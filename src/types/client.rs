//! OAuth 2.0 client domain types.
//!
//! This module defines the validated, immutable [`ClientDescriptor`]
//! produced by the client registry, along with the [`GrantType`] enum.
//! Raw, unvalidated records as returned by the backing store live in
//! [`crate::storage::client`].

use std::collections::BTreeSet;
use std::str::FromStr;
use std::time::Duration;

use serde::{Deserialize, Serialize};

// =============================================================================
// Grant Type
// =============================================================================

/// OAuth 2.0 grant types.
///
/// Defines the authorization flows a client is allowed to use. Unknown
/// grant-type strings are rejected when a client record is resolved.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum GrantType {
    /// Authorization Code flow.
    AuthorizationCode,
    /// Resource Owner Password Credentials flow.
    Password,
    /// Client Credentials flow (machine-to-machine).
    ClientCredentials,
    /// Refresh Token flow.
    RefreshToken,
    /// Implicit flow (legacy; never serviced by the token endpoint).
    Implicit,
}

impl GrantType {
    /// Returns the OAuth 2.0 `grant_type` parameter value.
    #[must_use]
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::AuthorizationCode => "authorization_code",
            Self::Password => "password",
            Self::ClientCredentials => "client_credentials",
            Self::RefreshToken => "refresh_token",
            Self::Implicit => "implicit",
        }
    }
}

impl std::fmt::Display for GrantType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

impl FromStr for GrantType {
    type Err = UnknownGrantType;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "authorization_code" => Ok(Self::AuthorizationCode),
            "password" => Ok(Self::Password),
            "client_credentials" => Ok(Self::ClientCredentials),
            "refresh_token" => Ok(Self::RefreshToken),
            "implicit" => Ok(Self::Implicit),
            other => Err(UnknownGrantType(other.to_string())),
        }
    }
}

/// Error returned when parsing an unrecognized grant-type string.
#[derive(Debug, Clone, thiserror::Error)]
#[error("Unknown grant type: {0}")]
pub struct UnknownGrantType(pub String);

// =============================================================================
// Client Descriptor
// =============================================================================

/// A fully-validated OAuth 2.0 client registration.
///
/// Descriptors are produced by [`ClientRegistry::resolve`] and never
/// mutated afterwards; a fresh descriptor is built on each lookup.
///
/// [`ClientRegistry::resolve`]: crate::registry::ClientRegistry::resolve
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ClientDescriptor {
    /// Unique client identifier used in OAuth flows.
    pub client_id: String,

    /// Client secret. Compared in constant time at the token endpoint
    /// and never written to logs.
    pub client_secret: String,

    /// Resource server identifiers this client may access.
    #[serde(default)]
    pub resource_ids: BTreeSet<String>,

    /// Scopes this client is allowed to request.
    #[serde(default)]
    pub scopes: BTreeSet<String>,

    /// Grant types this client is authorized to use. Never empty.
    pub authorized_grant_types: BTreeSet<GrantType>,

    /// Role identifiers granted to tokens issued for this client.
    #[serde(default)]
    pub authorities: BTreeSet<String>,

    /// Access token validity in seconds. `0` means the system default.
    #[serde(default)]
    pub access_token_validity_seconds: u64,

    /// Refresh token validity in seconds. `0` means the system default.
    #[serde(default)]
    pub refresh_token_validity_seconds: u64,
}

impl ClientDescriptor {
    /// Validates descriptor invariants.
    ///
    /// # Errors
    ///
    /// Returns an error if the client id is empty or no grant types are
    /// authorized. A client with no permitted grants cannot authenticate
    /// and is treated as unresolvable by the registry.
    pub fn validate(&self) -> Result<(), ClientValidationError> {
        if self.client_id.is_empty() {
            return Err(ClientValidationError::EmptyClientId);
        }

        if self.authorized_grant_types.is_empty() {
            return Err(ClientValidationError::NoGrantTypes);
        }

        Ok(())
    }

    /// Checks whether the given grant type is authorized for this client.
    #[must_use]
    pub fn is_grant_type_allowed(&self, grant_type: GrantType) -> bool {
        self.authorized_grant_types.contains(&grant_type)
    }

    /// Intersects a requested scope set with the allowed scopes.
    ///
    /// An empty request defaults to the full allowed set. The result may
    /// be empty only when the request was non-empty and disjoint from
    /// the allowed set; callers reject that case as an invalid scope.
    #[must_use]
    pub fn narrow_scopes(&self, requested: &BTreeSet<String>) -> BTreeSet<String> {
        if requested.is_empty() {
            self.scopes.clone()
        } else {
            requested.intersection(&self.scopes).cloned().collect()
        }
    }

    /// Returns the access token lifetime, falling back to `default` when
    /// the descriptor carries no explicit window.
    #[must_use]
    pub fn access_token_lifetime(&self, default: Duration) -> Duration {
        if self.access_token_validity_seconds == 0 {
            default
        } else {
            Duration::from_secs(self.access_token_validity_seconds)
        }
    }

    /// Returns the refresh token lifetime, falling back to `default`.
    #[must_use]
    pub fn refresh_token_lifetime(&self, default: Duration) -> Duration {
        if self.refresh_token_validity_seconds == 0 {
            default
        } else {
            Duration::from_secs(self.refresh_token_validity_seconds)
        }
    }
}

// =============================================================================
// Validation Error
// =============================================================================

/// Errors that can occur during client descriptor validation.
#[derive(Debug, thiserror::Error)]
pub enum ClientValidationError {
    /// Client ID cannot be empty.
    #[error("Client ID cannot be empty")]
    EmptyClientId,

    /// At least one authorized grant type is required.
    #[error("At least one authorized grant type is required")]
    NoGrantTypes,
}

// =============================================================================
// Tests
// =============================================================================
