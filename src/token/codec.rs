//! JWT access token encoding and decoding.
//!
//! The codec is the single place tokens are signed and verified. It is
//! pure and symmetric: `encode` signs a claims set with the process-wide
//! secret, `decode` verifies and parses it back. Expiry is enforced by
//! recomputation at verification time; nothing is stored server-side.
//!
//! # Example
//!
//! ```
//! use brainstorm_auth::token::{AccessTokenClaims, TokenCodec};
//!
//! let codec = TokenCodec::new("signing-secret");
//!
//! let claims = AccessTokenClaims::builder("alice", "web-app")
//!     .scope("read write")
//!     .expires_in_seconds(3600)
//!     .build();
//!
//! let token = codec.encode(&claims).unwrap();
//! let decoded = codec.decode(&token).unwrap();
//! assert_eq!(decoded.sub, "alice");
//! ```

use std::time::Duration;

use jsonwebtoken::{Algorithm, DecodingKey, EncodingKey, Header, Validation, decode, encode};
use serde::{Deserialize, Serialize};
use time::OffsetDateTime;

use crate::config::AuthConfig;

// ============================================================================
// Error Types
// ============================================================================

/// Errors that can occur while decoding or encoding a token.
///
/// Decoding outcomes are distinct so that callers can branch on them:
/// introspection reports expiry separately from forgery.
#[derive(Debug, thiserror::Error)]
pub enum TokenCodecError {
    /// The token string could not be parsed as the expected structure.
    #[error("Malformed token: {message}")]
    Malformed {
        /// Description of the parse failure.
        message: String,
    },

    /// Signature verification failed.
    #[error("Invalid signature")]
    BadSignature,

    /// The token's expiry has passed relative to the current time.
    #[error("Token expired")]
    Expired,

    /// Failed to encode a token.
    #[error("Failed to encode token: {message}")]
    Encoding {
        /// Description of the encoding error.
        message: String,
    },
}

impl TokenCodecError {
    /// Creates a new `Malformed` error.
    #[must_use]
    pub fn malformed(message: impl Into<String>) -> Self {
        Self::Malformed {
            message: message.into(),
        }
    }

    /// Returns the OAuth 2.0 error code for this error.
    #[must_use]
    pub fn oauth_error_code(&self) -> &'static str {
        "invalid_token"
    }
}

impl From<jsonwebtoken::errors::Error> for TokenCodecError {
    fn from(err: jsonwebtoken::errors::Error) -> Self {
        use jsonwebtoken::errors::ErrorKind;

        match err.kind() {
            ErrorKind::ExpiredSignature => Self::Expired,
            ErrorKind::InvalidSignature => Self::BadSignature,
            _ => Self::malformed(err.to_string()),
        }
    }
}

// ============================================================================
// Token Claims
// ============================================================================

/// Discriminates access tokens from refresh tokens.
///
/// A refresh token presented where an access token is expected (or the
/// reverse) must be rejected even though both verify against the same
/// key.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TokenUse {
    /// Short-lived bearer token for resource access.
    Access,
    /// Longer-lived token exchanged for fresh access tokens.
    Refresh,
}

/// Claims carried by a signed token.
///
/// Timestamps are second-resolution Unix epoch integers.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct AccessTokenClaims {
    /// Subject (resource-owner or client identity).
    pub sub: String,

    /// OAuth client the token was issued to.
    pub client_id: String,

    /// Space-separated granted scopes.
    pub scope: String,

    /// Role identifiers granted to the token.
    #[serde(default)]
    pub authorities: Vec<String>,

    /// Issued at (Unix timestamp).
    pub iat: i64,

    /// Expiration time (Unix timestamp).
    pub exp: i64,

    /// Unique token identifier.
    pub jti: String,

    /// Whether this is an access or a refresh token.
    pub token_use: TokenUse,
}

impl AccessTokenClaims {
    /// Creates a new builder for token claims.
    #[must_use]
    pub fn builder(subject: impl Into<String>, client_id: impl Into<String>) -> AccessTokenClaimsBuilder {
        AccessTokenClaimsBuilder::new(subject, client_id)
    }

    /// Returns the granted scopes as a set.
    #[must_use]
    pub fn scopes(&self) -> std::collections::BTreeSet<String> {
        self.scope
            .split_whitespace()
            .map(ToString::to_string)
            .collect()
    }
}

/// Builder for [`AccessTokenClaims`].
pub struct AccessTokenClaimsBuilder {
    sub: String,
    client_id: String,
    scope: String,
    authorities: Vec<String>,
    iat: i64,
    exp: i64,
    token_use: TokenUse,
}

impl AccessTokenClaimsBuilder {
    fn new(subject: impl Into<String>, client_id: impl Into<String>) -> Self {
        let now = OffsetDateTime::now_utc().unix_timestamp();
        Self {
            sub: subject.into(),
            client_id: client_id.into(),
            scope: String::new(),
            authorities: Vec::new(),
            iat: now,
            exp: now + 3600,
            token_use: TokenUse::Access,
        }
    }

    /// Sets the scopes (space-separated).
    #[must_use]
    pub fn scope(mut self, scope: impl Into<String>) -> Self {
        self.scope = scope.into();
        self
    }

    /// Sets the granted authorities.
    #[must_use]
    pub fn authorities(mut self, authorities: impl IntoIterator<Item = String>) -> Self {
        self.authorities = authorities.into_iter().collect();
        self
    }

    /// Sets the expiration time in seconds from the issue instant.
    #[must_use]
    pub fn expires_in_seconds(mut self, seconds: i64) -> Self {
        self.exp = self.iat + seconds;
        self
    }

    /// Marks the claims as a refresh token.
    #[must_use]
    pub fn refresh(mut self) -> Self {
        self.token_use = TokenUse::Refresh;
        self
    }

    /// Builds the claims with a fresh `jti`.
    #[must_use]
    pub fn build(self) -> AccessTokenClaims {
        AccessTokenClaims {
            sub: self.sub,
            client_id: self.client_id,
            scope: self.scope,
            authorities: self.authorities,
            iat: self.iat,
            exp: self.exp,
            jti: uuid::Uuid::new_v4().to_string(),
            token_use: self.token_use,
        }
    }
}

// ============================================================================
// Token Codec
// ============================================================================

/// Encodes and decodes signed tokens with a shared HS256 secret.
///
/// The signing key is supplied once at construction and immutable for
/// the codec's lifetime; there is no key rotation (rotation would need
/// multi-key verification). The codec is `Send + Sync` and shared by
/// reference across concurrent requests.
pub struct TokenCodec {
    encoding_key: EncodingKey,
    decoding_key: DecodingKey,
    leeway_secs: u64,
}

impl TokenCodec {
    /// Creates a codec over the given signing secret with strict (zero)
    /// clock-skew tolerance.
    #[must_use]
    pub fn new(signing_secret: &str) -> Self {
        Self {
            encoding_key: EncodingKey::from_secret(signing_secret.as_bytes()),
            decoding_key: DecodingKey::from_secret(signing_secret.as_bytes()),
            leeway_secs: 0,
        }
    }

    /// Creates a codec from the process configuration.
    #[must_use]
    pub fn from_config(config: &AuthConfig) -> Self {
        Self::new(&config.signing_secret).with_leeway(config.clock_skew_leeway)
    }

    /// Sets the clock-skew leeway applied when validating expiry.
    #[must_use]
    pub fn with_leeway(mut self, leeway: Duration) -> Self {
        self.leeway_secs = leeway.as_secs();
        self
    }

    /// Signs a claims set into a compact JWT string.
    ///
    /// Deterministic for identical claims and key; never fails for
    /// well-formed claims.
    ///
    /// # Errors
    ///
    /// Returns [`TokenCodecError::Encoding`] if serialization fails.
    pub fn encode(&self, claims: &AccessTokenClaims) -> Result<String, TokenCodecError> {
        encode(&Header::new(Algorithm::HS256), claims, &self.encoding_key).map_err(|e| {
            TokenCodecError::Encoding {
                message: e.to_string(),
            }
        })
    }

    /// Verifies and parses a token string.
    ///
    /// # Errors
    ///
    /// - [`TokenCodecError::Malformed`] if the string is not a parseable
    ///   token of the expected structure
    /// - [`TokenCodecError::BadSignature`] if verification against the
    ///   codec's key fails
    /// - [`TokenCodecError::Expired`] if `exp` has passed (signature is
    ///   checked first, so a genuine stale token is never reported as
    ///   forged)
    pub fn decode(&self, token: &str) -> Result<AccessTokenClaims, TokenCodecError> {
        let data = decode::<AccessTokenClaims>(token, &self.decoding_key, &self.validation(true))?;
        Ok(data.claims)
    }

    /// Verifies and parses a token without enforcing expiry.
    ///
    /// Used by introspection, which reports expired tokens as inactive
    /// rather than rejecting the request.
    ///
    /// # Errors
    ///
    /// Returns an error if parsing or signature verification fails.
    pub fn decode_allow_expired(&self, token: &str) -> Result<AccessTokenClaims, TokenCodecError> {
        let data = decode::<AccessTokenClaims>(token, &self.decoding_key, &self.validation(false))?;
        Ok(data.claims)
    }

    fn validation(&self, validate_exp: bool) -> Validation {
        let mut validation = Validation::new(Algorithm::HS256);
        validation.leeway = self.leeway_secs;
        validation.validate_exp = validate_exp;
        validation.validate_aud = false;
        validation.set_required_spec_claims(&["exp"]);
        validation
    }
}

// ============================================================================
// Tests
// ============================================================================
