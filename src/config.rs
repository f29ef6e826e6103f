//! Authorization core configuration.
//!
//! Configuration is read once at process start and is immutable for the
//! process lifetime. The signing secret in particular is loaded here and
//! handed to [`TokenCodec`](crate::token::TokenCodec) by shared
//! ownership; it is never copied per token.
//!
//! # Example (TOML)
//!
//! ```toml
//! [auth]
//! signing_secret = "change-me"
//! access_token_lifetime = "1h"
//! refresh_token_lifetime = "30d"
//! clock_skew_leeway = "0s"
//! ```

use serde::{Deserialize, Serialize};
use std::time::Duration;

/// Authorization core configuration.
///
/// Token lifetimes configured here are the system defaults; a client
/// descriptor with an explicit validity window overrides them per grant.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct AuthConfig {
    /// Shared secret used to sign and verify tokens (HS256).
    ///
    /// The whole process uses a single key; rotation would require
    /// multi-key verification, which is out of scope.
    pub signing_secret: String,

    /// Default access token lifetime, used when the client descriptor
    /// does not carry one.
    #[serde(with = "humantime_serde")]
    pub access_token_lifetime: Duration,

    /// Default refresh token lifetime, independently configurable from
    /// the access token window.
    #[serde(with = "humantime_serde")]
    pub refresh_token_lifetime: Duration,

    /// Clock skew tolerated when validating token expiry.
    ///
    /// Strict (zero) by default; deployments with drifting clocks can
    /// widen this.
    #[serde(with = "humantime_serde")]
    pub clock_skew_leeway: Duration,
}

impl Default for AuthConfig {
    fn default() -> Self {
        Self {
            signing_secret: String::new(),
            access_token_lifetime: Duration::from_secs(3600), // 1 hour
            refresh_token_lifetime: Duration::from_secs(30 * 24 * 3600), // 30 days
            clock_skew_leeway: Duration::ZERO,
        }
    }
}

impl AuthConfig {
    /// Validates the configuration.
    ///
    /// # Errors
    ///
    /// Returns an error describing the first invalid field.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.signing_secret.is_empty() {
            return Err(ConfigError::MissingSigningSecret);
        }

        if self.access_token_lifetime.is_zero() {
            return Err(ConfigError::ZeroLifetime {
                field: "access_token_lifetime",
            });
        }

        if self.refresh_token_lifetime.is_zero() {
            return Err(ConfigError::ZeroLifetime {
                field: "refresh_token_lifetime",
            });
        }

        Ok(())
    }
}

/// Errors that can occur during configuration validation.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    /// No signing secret was configured.
    #[error("signing_secret must not be empty")]
    MissingSigningSecret,

    /// A token lifetime was configured as zero.
    #[error("{field} must be greater than zero")]
    ZeroLifetime {
        /// Name of the offending field.
        field: &'static str,
    },
}
