//! OAuth 2.0 authorization server core for the Brainstorm platform.
//!
//! This crate implements the token-issuing half of an authorization
//! server: client resolution against an external client-details store,
//! grant servicing for the `password`, `client_credentials`, and
//! `refresh_token` grant types, symmetric JWT minting and validation,
//! and RFC 7662 token introspection gated behind caller authentication.
//!
//! Persistence and resource-owner credentials are collaborator seams:
//! implement [`storage::ClientDetailsStore`] over your client database
//! and [`authn::AuthenticationBackend`] over your user directory, and
//! wire them into a [`token::TokenIssuer`].
//!
//! # Example
//!
//! ```no_run
//! use std::sync::Arc;
//!
//! use brainstorm_auth::config::AuthConfig;
//! use brainstorm_auth::registry::ClientRegistry;
//! use brainstorm_auth::storage::MemoryClientStore;
//! use brainstorm_auth::token::{TokenCodec, TokenGrantRequest, TokenIssuer};
//! # use brainstorm_auth::authn::AuthenticationBackend;
//!
//! # async fn demo(backend: Arc<dyn AuthenticationBackend>) -> Result<(), Box<dyn std::error::Error>> {
//! let config = AuthConfig {
//!     signing_secret: "change-me".to_string(),
//!     ..AuthConfig::default()
//! };
//! config.validate()?;
//!
//! let registry = ClientRegistry::new(Arc::new(MemoryClientStore::new()));
//! let codec = Arc::new(TokenCodec::from_config(&config));
//! let issuer = TokenIssuer::new(registry, backend, codec, &config);
//!
//! let request = TokenGrantRequest::password("web-app", "s3cr3t", "alice", "wonderland")
//!     .with_scope("read");
//! let grant = issuer.issue(&request).await?;
//! println!("access token: {}", grant.access_token);
//! # Ok(())
//! # }
//! ```

pub mod authn;
pub mod config;
pub mod error;
pub mod registry;
pub mod secret;
pub mod storage;
pub mod token;
pub mod types;

pub use authn::AuthenticationBackend;
pub use config::{AuthConfig, ConfigError};
pub use error::AuthError;
pub use registry::{ClientRegistry, ClientResolutionError};
pub use storage::{ClientDetailsStore, ClientRecord, MemoryClientStore};
pub use token::{
    AccessGuard, AccessTokenClaims, IntrospectionRequest, IntrospectionResponse,
    IntrospectionService, IssuanceError, TokenCodec, TokenCodecError, TokenGrant,
    TokenGrantRequest, TokenIssuer, TokenUse,
};
pub use types::{ClientDescriptor, GrantType, Principal};

/// Result alias for collaborator-facing operations.
pub type AuthResult<T> = Result<T, AuthError>;

/// Convenience re-exports for embedders.
pub mod prelude {
    pub use crate::authn::AuthenticationBackend;
    pub use crate::config::AuthConfig;
    pub use crate::registry::ClientRegistry;
    pub use crate::storage::{ClientDetailsStore, ClientRecord};
    pub use crate::token::{
        IntrospectionService, TokenCodec, TokenGrant, TokenGrantRequest, TokenIssuer,
    };
    pub use crate::types::{ClientDescriptor, GrantType, Principal};
    pub use crate::{AuthError, AuthResult};
}
