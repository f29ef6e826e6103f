//! Token introspection (RFC 7662).
//!
//! Introspection is a protected capability: the caller must present an
//! authenticated principal, checked by the [`AccessGuard`], before any
//! token is examined. For authorized callers the response never explains
//! *why* a token is inactive; expired, forged, and malformed tokens all
//! yield the same `{"active": false}` body.

use std::sync::Arc;

use serde::{Deserialize, Serialize};

use crate::token::codec::{AccessTokenClaims, TokenCodec, TokenUse};
use crate::types::Principal;

// =============================================================================
// Access Guard
// =============================================================================

/// Guards protected issuer capabilities behind an authentication check.
///
/// The only requirement is that the caller is authenticated; authority
/// and scope checks belong to the resource layer, not here.
#[derive(Debug, Clone, Copy, Default)]
pub struct AccessGuard;

impl AccessGuard {
    /// Creates a guard.
    #[must_use]
    pub fn new() -> Self {
        Self
    }

    /// Returns true iff the principal is authenticated.
    ///
    /// Anonymous principals are denied regardless of their authorities.
    #[must_use]
    pub fn authorize(&self, principal: &Principal) -> bool {
        principal.is_authenticated()
    }
}

// =============================================================================
// Request / Response Types
// =============================================================================

/// Token introspection request (RFC 7662 §2.1).
#[derive(Debug, Clone, Deserialize)]
pub struct IntrospectionRequest {
    /// The token to introspect.
    pub token: String,

    /// Optional hint about the token type. Accepted for interface
    /// compatibility; the token itself carries its type claim.
    #[serde(default)]
    pub token_type_hint: Option<String>,
}

impl IntrospectionRequest {
    /// Creates a request for the given token.
    #[must_use]
    pub fn new(token: impl Into<String>) -> Self {
        Self {
            token: token.into(),
            token_type_hint: None,
        }
    }
}

/// Token introspection response (RFC 7662 §2.2).
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct IntrospectionResponse {
    /// Whether the token is currently active.
    pub active: bool,

    /// Granted scopes (space-separated).
    #[serde(skip_serializing_if = "Option::is_none")]
    pub scope: Option<String>,

    /// Client the token was issued to.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub client_id: Option<String>,

    /// Subject of the token.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub sub: Option<String>,

    /// Expiration time (Unix seconds).
    #[serde(skip_serializing_if = "Option::is_none")]
    pub exp: Option<i64>,

    /// Issuance time (Unix seconds).
    #[serde(skip_serializing_if = "Option::is_none")]
    pub iat: Option<i64>,

    /// Token identifier.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub jti: Option<String>,

    /// Token type, "Bearer" for access tokens.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub token_type: Option<String>,
}

impl IntrospectionResponse {
    /// The uniform response for any token that cannot be validated.
    #[must_use]
    pub fn inactive() -> Self {
        Self {
            active: false,
            scope: None,
            client_id: None,
            sub: None,
            exp: None,
            iat: None,
            jti: None,
            token_type: None,
        }
    }

    /// Builds an active response from validated claims.
    #[must_use]
    pub fn active(claims: &AccessTokenClaims) -> Self {
        let token_type = match claims.token_use {
            TokenUse::Access => "Bearer",
            TokenUse::Refresh => "refresh_token",
        };
        Self {
            active: true,
            scope: Some(claims.scope.clone()),
            client_id: Some(claims.client_id.clone()),
            sub: Some(claims.sub.clone()),
            exp: Some(claims.exp),
            iat: Some(claims.iat),
            jti: Some(claims.jti.clone()),
            token_type: Some(token_type.to_string()),
        }
    }
}

// =============================================================================
// Errors
// =============================================================================

/// Errors returned by the introspection service.
#[derive(Debug, thiserror::Error)]
pub enum IntrospectionError {
    /// The caller is not authenticated.
    ///
    /// Distinct from an inactive-token response: an unauthorized caller
    /// learns nothing about the token at all.
    #[error("Caller is not authorized to introspect tokens")]
    AccessDenied,
}

// =============================================================================
// Introspection Service
// =============================================================================

/// Validates tokens on behalf of authenticated resource servers.
pub struct IntrospectionService {
    guard: AccessGuard,
    codec: Arc<TokenCodec>,
}

impl IntrospectionService {
    /// Creates a service over the given codec.
    #[must_use]
    pub fn new(codec: Arc<TokenCodec>) -> Self {
        Self {
            guard: AccessGuard::new(),
            codec,
        }
    }

    /// Introspects a token for an authenticated caller.
    ///
    /// # Errors
    ///
    /// Returns [`IntrospectionError::AccessDenied`] when the caller is
    /// not authenticated. Token problems are never errors; they produce
    /// an inactive response.
    pub fn introspect(
        &self,
        caller: &Principal,
        request: &IntrospectionRequest,
    ) -> Result<IntrospectionResponse, IntrospectionError> {
        if !self.guard.authorize(caller) {
            tracing::warn!("Rejected introspection by unauthenticated caller");
            return Err(IntrospectionError::AccessDenied);
        }

        match self.codec.decode(&request.token) {
            Ok(claims) => Ok(IntrospectionResponse::active(&claims)),
            Err(e) => {
                // Expired, forged, and malformed all collapse here.
                tracing::debug!(error = %e, "Token failed introspection");
                Ok(IntrospectionResponse::inactive())
            }
        }
    }
}
