//! Token issuance.
//!
//! The issuer orchestrates a grant request end to end: client
//! resolution, client authentication, grant-type policy, resource-owner
//! authentication, scope narrowing, and finally token minting through
//! the codec. Each request walks the same sequence and fails into one of
//! three coarse outcomes; the precise reason is logged, never returned.
//!
//! # Supported Grant Types
//!
//! - `password` - Resource Owner Password Credentials
//! - `client_credentials` - Machine-to-machine authentication
//! - `refresh_token` - Exchange a refresh token for fresh tokens
//!
//! `authorization_code` and `implicit` require authorization-endpoint
//! machinery that lives outside this core; requests naming them are
//! rejected as invalid grants even when a descriptor authorizes them.

use std::collections::BTreeSet;
use std::sync::Arc;
use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::authn::AuthenticationBackend;
use crate::config::AuthConfig;
use crate::registry::{ClientRegistry, ClientResolutionError};
use crate::secret::verify_secret;
use crate::token::codec::{AccessTokenClaims, TokenCodec, TokenCodecError, TokenUse};
use crate::types::{ClientDescriptor, GrantType};

// =============================================================================
// Request / Response Types
// =============================================================================

/// Token grant request parameters.
///
/// Deserializable from a token-endpoint form body. Different fields are
/// required depending on `grant_type`:
///
/// - `password`: username, password
/// - `client_credentials`: no extra fields
/// - `refresh_token`: refresh_token
#[derive(Debug, Clone, Deserialize)]
pub struct TokenGrantRequest {
    /// OAuth 2.0 grant type.
    pub grant_type: String,

    /// Client identifier.
    pub client_id: String,

    /// Client secret.
    pub client_secret: String,

    /// Resource-owner username (password grant).
    #[serde(default)]
    pub username: Option<String>,

    /// Resource-owner password (password grant).
    #[serde(default)]
    pub password: Option<String>,

    /// Refresh token (refresh_token grant).
    #[serde(default)]
    pub refresh_token: Option<String>,

    /// Requested scopes, space-separated. Empty or absent defaults to
    /// the client's full allowed set.
    #[serde(default)]
    pub scope: Option<String>,
}

impl TokenGrantRequest {
    /// Builds a password-grant request.
    #[must_use]
    pub fn password(
        client_id: impl Into<String>,
        client_secret: impl Into<String>,
        username: impl Into<String>,
        password: impl Into<String>,
    ) -> Self {
        Self {
            grant_type: "password".to_string(),
            client_id: client_id.into(),
            client_secret: client_secret.into(),
            username: Some(username.into()),
            password: Some(password.into()),
            refresh_token: None,
            scope: None,
        }
    }

    /// Builds a client-credentials-grant request.
    #[must_use]
    pub fn client_credentials(
        client_id: impl Into<String>,
        client_secret: impl Into<String>,
    ) -> Self {
        Self {
            grant_type: "client_credentials".to_string(),
            client_id: client_id.into(),
            client_secret: client_secret.into(),
            username: None,
            password: None,
            refresh_token: None,
            scope: None,
        }
    }

    /// Builds a refresh-token-grant request.
    #[must_use]
    pub fn refresh(
        client_id: impl Into<String>,
        client_secret: impl Into<String>,
        refresh_token: impl Into<String>,
    ) -> Self {
        Self {
            grant_type: "refresh_token".to_string(),
            client_id: client_id.into(),
            client_secret: client_secret.into(),
            username: None,
            password: None,
            refresh_token: Some(refresh_token.into()),
            scope: None,
        }
    }

    /// Sets the requested scopes (space-separated).
    #[must_use]
    pub fn with_scope(mut self, scope: impl Into<String>) -> Self {
        self.scope = Some(scope.into());
        self
    }

    fn requested_scopes(&self) -> BTreeSet<String> {
        self.scope
            .as_deref()
            .unwrap_or("")
            .split_whitespace()
            .map(ToString::to_string)
            .collect()
    }
}

/// Successful token grant response.
#[derive(Debug, Clone, Serialize)]
pub struct TokenGrant {
    /// The signed access token.
    pub access_token: String,

    /// Token type, always "Bearer".
    pub token_type: String,

    /// Access token lifetime in seconds.
    pub expires_in: u64,

    /// Granted scopes (space-separated).
    pub scope: String,

    /// Refresh token, present only when the client is authorized for
    /// the refresh_token grant.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub refresh_token: Option<String>,
}

// =============================================================================
// Errors
// =============================================================================

/// Errors that can occur while servicing a grant request.
#[derive(Debug, thiserror::Error)]
pub enum IssuanceError {
    /// The client could not be resolved.
    ///
    /// Malformed and absent ids produce this same error; the wrapped
    /// resolution error distinguishes them for logs only.
    #[error("Unknown client")]
    UnknownClient {
        /// Resolution failure, kept for diagnostics.
        #[source]
        source: ClientResolutionError,
    },

    /// The grant was rejected: wrong secret, unauthorized grant type,
    /// failed resource-owner authentication, or an unusable refresh
    /// token. The reason is deliberately not distinguished.
    #[error("Invalid grant")]
    InvalidGrant,

    /// The requested scopes do not intersect the allowed set.
    #[error("Requested scopes exceed the client's allowed set")]
    InvalidScope,

    /// Token minting failed. Not part of the OAuth taxonomy; reported
    /// to clients as a server error.
    #[error("Failed to mint token")]
    Internal {
        /// The codec failure.
        #[source]
        source: TokenCodecError,
    },
}

impl IssuanceError {
    /// Returns the OAuth 2.0 error code for this error.
    #[must_use]
    pub fn oauth_error_code(&self) -> &'static str {
        match self {
            Self::UnknownClient { .. } => "invalid_client",
            Self::InvalidGrant => "invalid_grant",
            Self::InvalidScope => "invalid_scope",
            Self::Internal { .. } => "server_error",
        }
    }
}

// =============================================================================
// Token Issuer
// =============================================================================

/// Issues access and refresh tokens for grant requests.
///
/// Stateless; collaborators are shared behind `Arc` and every call is an
/// independent grant. Issuing twice with identical inputs produces two
/// independently valid tokens.
pub struct TokenIssuer {
    registry: ClientRegistry,
    authn: Arc<dyn AuthenticationBackend>,
    codec: Arc<TokenCodec>,
    default_access_lifetime: Duration,
    default_refresh_lifetime: Duration,
}

/// Identity established for a grant before minting.
struct GrantSubject {
    subject: String,
    authorities: Vec<String>,
    /// Scope base the request narrows against. `None` means the
    /// client's registered scopes.
    scope_base: Option<BTreeSet<String>>,
}

impl TokenIssuer {
    /// Creates an issuer.
    ///
    /// Default token lifetimes are taken from `config`; a descriptor
    /// with explicit validity windows overrides them per client.
    #[must_use]
    pub fn new(
        registry: ClientRegistry,
        authn: Arc<dyn AuthenticationBackend>,
        codec: Arc<TokenCodec>,
        config: &AuthConfig,
    ) -> Self {
        Self {
            registry,
            authn,
            codec,
            default_access_lifetime: config.access_token_lifetime,
            default_refresh_lifetime: config.refresh_token_lifetime,
        }
    }

    /// Services a grant request.
    ///
    /// # Errors
    ///
    /// - [`IssuanceError::UnknownClient`] when the client id does not
    ///   resolve (malformed and absent ids are indistinguishable)
    /// - [`IssuanceError::InvalidGrant`] when any authentication or
    ///   grant-type check fails (which one is never revealed)
    /// - [`IssuanceError::InvalidScope`] when a non-empty scope request
    ///   does not intersect the allowed set
    pub async fn issue(&self, request: &TokenGrantRequest) -> Result<TokenGrant, IssuanceError> {
        // START -> CLIENT_RESOLVED
        let client = self
            .registry
            .resolve(&request.client_id)
            .await
            .map_err(|source| IssuanceError::UnknownClient { source })?;

        // CLIENT_RESOLVED -> AUTHENTICATED
        if !verify_secret(&request.client_secret, &client.client_secret) {
            tracing::debug!(client_id = %client.client_id, "Client secret mismatch");
            return Err(IssuanceError::InvalidGrant);
        }

        let grant_type = request.grant_type.parse::<GrantType>().map_err(|e| {
            tracing::debug!(client_id = %client.client_id, error = %e, "Unparseable grant type");
            IssuanceError::InvalidGrant
        })?;

        if !client.is_grant_type_allowed(grant_type) {
            tracing::debug!(
                client_id = %client.client_id,
                grant_type = %grant_type,
                "Grant type not authorized for client"
            );
            return Err(IssuanceError::InvalidGrant);
        }

        let grant_subject = self.authenticate(request, &client, grant_type).await?;

        // AUTHENTICATED -> SCOPE_NARROWED
        let requested = request.requested_scopes();
        let granted = match &grant_subject.scope_base {
            Some(base) => {
                if requested.is_empty() {
                    base.clone()
                } else {
                    requested.intersection(base).cloned().collect()
                }
            }
            None => client.narrow_scopes(&requested),
        };

        if granted.is_empty() && !requested.is_empty() {
            tracing::debug!(client_id = %client.client_id, "Requested scopes outside allowed set");
            return Err(IssuanceError::InvalidScope);
        }

        // SCOPE_NARROWED -> ISSUED
        self.mint(&client, grant_subject, &granted)
    }

    /// Establishes the grant's subject per grant type.
    async fn authenticate(
        &self,
        request: &TokenGrantRequest,
        client: &ClientDescriptor,
        grant_type: GrantType,
    ) -> Result<GrantSubject, IssuanceError> {
        match grant_type {
            GrantType::Password => {
                let (username, password) = match (&request.username, &request.password) {
                    (Some(u), Some(p)) => (u, p),
                    _ => {
                        tracing::debug!(client_id = %client.client_id, "Missing resource-owner credential");
                        return Err(IssuanceError::InvalidGrant);
                    }
                };

                let principal = self.authn.authenticate(username, password).await.map_err(|e| {
                    tracing::debug!(client_id = %client.client_id, error = %e, "Resource-owner authentication failed");
                    IssuanceError::InvalidGrant
                })?;

                Ok(GrantSubject {
                    subject: principal.subject.clone(),
                    authorities: principal.authorities.iter().cloned().collect(),
                    scope_base: None,
                })
            }

            GrantType::ClientCredentials => Ok(GrantSubject {
                subject: client.client_id.clone(),
                authorities: client.authorities.iter().cloned().collect(),
                scope_base: None,
            }),

            GrantType::RefreshToken => {
                let token = request.refresh_token.as_deref().ok_or_else(|| {
                    tracing::debug!(client_id = %client.client_id, "Missing refresh token");
                    IssuanceError::InvalidGrant
                })?;
                self.verify_refresh_token(token, client)
            }

            GrantType::AuthorizationCode | GrantType::Implicit => {
                tracing::debug!(
                    client_id = %client.client_id,
                    grant_type = %grant_type,
                    "Grant type not serviceable by this issuer"
                );
                Err(IssuanceError::InvalidGrant)
            }
        }
    }

    /// Verifies a presented refresh token and derives the grant subject
    /// from its claims.
    fn verify_refresh_token(
        &self,
        token: &str,
        client: &ClientDescriptor,
    ) -> Result<GrantSubject, IssuanceError> {
        let claims = self.codec.decode(token).map_err(|e| {
            tracing::debug!(client_id = %client.client_id, error = %e, "Refresh token rejected");
            IssuanceError::InvalidGrant
        })?;

        if claims.token_use != TokenUse::Refresh {
            tracing::debug!(client_id = %client.client_id, "Access token presented as refresh token");
            return Err(IssuanceError::InvalidGrant);
        }

        // A refresh token issued to another client must not be honored.
        if claims.client_id != client.client_id {
            tracing::debug!(
                client_id = %client.client_id,
                token_client_id = %claims.client_id,
                "Refresh token issued to a different client"
            );
            return Err(IssuanceError::InvalidGrant);
        }

        Ok(GrantSubject {
            subject: claims.sub.clone(),
            authorities: claims.authorities.clone(),
            scope_base: Some(claims.scopes()),
        })
    }

    /// Mints the access token and, when authorized, a refresh token.
    fn mint(
        &self,
        client: &ClientDescriptor,
        grant_subject: GrantSubject,
        granted: &BTreeSet<String>,
    ) -> Result<TokenGrant, IssuanceError> {
        let scope = granted.iter().cloned().collect::<Vec<_>>().join(" ");
        let access_lifetime = client.access_token_lifetime(self.default_access_lifetime);

        let access_claims = AccessTokenClaims::builder(&grant_subject.subject, &client.client_id)
            .scope(&scope)
            .authorities(grant_subject.authorities.iter().cloned())
            .expires_in_seconds(access_lifetime.as_secs() as i64)
            .build();

        let access_token = self
            .codec
            .encode(&access_claims)
            .map_err(|source| IssuanceError::Internal { source })?;

        let refresh_token = if client.is_grant_type_allowed(GrantType::RefreshToken) {
            let refresh_lifetime = client.refresh_token_lifetime(self.default_refresh_lifetime);
            let refresh_claims =
                AccessTokenClaims::builder(&grant_subject.subject, &client.client_id)
                    .scope(&scope)
                    .authorities(grant_subject.authorities.iter().cloned())
                    .expires_in_seconds(refresh_lifetime.as_secs() as i64)
                    .refresh()
                    .build();
            Some(
                self.codec
                    .encode(&refresh_claims)
                    .map_err(|source| IssuanceError::Internal { source })?,
            )
        } else {
            None
        };

        tracing::debug!(
            client_id = %client.client_id,
            subject = %grant_subject.subject,
            scope = %scope,
            "Issued access token"
        );

        Ok(TokenGrant {
            access_token,
            token_type: "Bearer".to_string(),
            expires_in: access_lifetime.as_secs(),
            scope,
            refresh_token,
        })
    }
}

// =============================================================================
// Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use async_trait::async_trait;

    use super::*;
    use crate::AuthResult;
    use crate::error::AuthError;
    use crate::storage::{ClientRecord, MemoryClientStore};
    use crate::types::Principal;

    /// Backend double that accepts exactly one credential pair.
    struct StaticBackend {
        username: String,
        password: String,
    }

    #[async_trait]
    impl AuthenticationBackend for StaticBackend {
        async fn authenticate(&self, username: &str, password: &str) -> AuthResult<Principal> {
            if username == self.username && password == self.password {
                Ok(Principal::authenticated(
                    username,
                    ["ROLE_USER".to_string()],
                ))
            } else {
                Err(AuthError::authentication_failed("bad credentials"))
            }
        }
    }

    fn web_app_record() -> ClientRecord {
        ClientRecord {
            client_id: "web-app".to_string(),
            client_secret: "s3cr3t".to_string(),
            resource_ids: vec!["api".to_string()],
            scopes: vec!["read".to_string(), "write".to_string()],
            authorized_grant_types: vec!["password".to_string(), "refresh_token".to_string()],
            authorities: vec!["ROLE_CLIENT".to_string()],
            access_token_validity: 3600,
            refresh_token_validity: 86400,
        }
    }

    fn service_record() -> ClientRecord {
        ClientRecord {
            client_id: "batch-svc".to_string(),
            client_secret: "svc-secret".to_string(),
            resource_ids: vec![],
            scopes: vec!["report".to_string()],
            authorized_grant_types: vec!["client_credentials".to_string()],
            authorities: vec!["ROLE_SERVICE".to_string()],
            access_token_validity: 0,
            refresh_token_validity: 0,
        }
    }

    async fn make_issuer() -> (TokenIssuer, Arc<TokenCodec>) {
        let store = MemoryClientStore::new();
        store.insert(web_app_record()).await;
        store.insert(service_record()).await;

        let config = AuthConfig {
            signing_secret: "test-signing-key".to_string(),
            ..AuthConfig::default()
        };
        let codec = Arc::new(TokenCodec::from_config(&config));
        let issuer = TokenIssuer::new(
            ClientRegistry::new(Arc::new(store)),
            Arc::new(StaticBackend {
                username: "alice".to_string(),
                password: "wonderland".to_string(),
            }),
            codec.clone(),
            &config,
        );
        (issuer, codec)
    }

    #[tokio::test]
    async fn test_password_grant_issues_narrowed_token_and_refresh() {
        let (issuer, codec) = make_issuer().await;

        let request = TokenGrantRequest::password("web-app", "s3cr3t", "alice", "wonderland")
            .with_scope("read");
        let grant = issuer.issue(&request).await.unwrap();

        assert_eq!(grant.token_type, "Bearer");
        assert_eq!(grant.expires_in, 3600);
        assert_eq!(grant.scope, "read");

        let claims = codec.decode(&grant.access_token).unwrap();
        assert_eq!(claims.sub, "alice");
        assert_eq!(claims.client_id, "web-app");
        assert_eq!(claims.scope, "read");
        assert_eq!(claims.authorities, vec!["ROLE_USER".to_string()]);
        assert_eq!(claims.exp - claims.iat, 3600);
        assert_eq!(claims.token_use, TokenUse::Access);

        let refresh = codec.decode(&grant.refresh_token.unwrap()).unwrap();
        assert_eq!(refresh.token_use, TokenUse::Refresh);
        assert_eq!(refresh.sub, "alice");
        assert_eq!(refresh.exp - refresh.iat, 86400);
    }

    #[tokio::test]
    async fn test_wrong_secret_is_invalid_grant() {
        let (issuer, _) = make_issuer().await;

        let request = TokenGrantRequest::password("web-app", "wrong", "alice", "wonderland");
        let err = issuer.issue(&request).await.unwrap_err();
        assert!(matches!(err, IssuanceError::InvalidGrant));
    }

    #[tokio::test]
    async fn test_bad_user_credentials_indistinguishable_from_wrong_secret() {
        let (issuer, _) = make_issuer().await;

        let request = TokenGrantRequest::password("web-app", "s3cr3t", "alice", "nope");
        let err = issuer.issue(&request).await.unwrap_err();
        assert!(matches!(err, IssuanceError::InvalidGrant));
        assert_eq!(err.oauth_error_code(), "invalid_grant");
    }

    #[tokio::test]
    async fn test_unknown_and_malformed_client_ids_share_error_category() {
        let (issuer, _) = make_issuer().await;

        let absent = issuer
            .issue(&TokenGrantRequest::password("ghost", "x", "alice", "wonderland"))
            .await
            .unwrap_err();
        let malformed = issuer
            .issue(&TokenGrantRequest::password("", "x", "alice", "wonderland"))
            .await
            .unwrap_err();

        assert!(matches!(absent, IssuanceError::UnknownClient { .. }));
        assert!(matches!(malformed, IssuanceError::UnknownClient { .. }));
        assert_eq!(absent.oauth_error_code(), malformed.oauth_error_code());
        assert_eq!(absent.oauth_error_code(), "invalid_client");
    }

    #[tokio::test]
    async fn test_unauthorized_grant_type_is_invalid_grant() {
        let (issuer, _) = make_issuer().await;

        // web-app is not authorized for client_credentials.
        let request = TokenGrantRequest::client_credentials("web-app", "s3cr3t");
        let err = issuer.issue(&request).await.unwrap_err();
        assert!(matches!(err, IssuanceError::InvalidGrant));
    }

    #[tokio::test]
    async fn test_unparseable_grant_type_is_invalid_grant() {
        let (issuer, _) = make_issuer().await;

        let mut request = TokenGrantRequest::password("web-app", "s3cr3t", "alice", "wonderland");
        request.grant_type = "saml-bearer".to_string();
        let err = issuer.issue(&request).await.unwrap_err();
        assert!(matches!(err, IssuanceError::InvalidGrant));
    }

    #[tokio::test]
    async fn test_disjoint_scope_request_is_invalid_scope() {
        let (issuer, _) = make_issuer().await;

        let request = TokenGrantRequest::password("web-app", "s3cr3t", "alice", "wonderland")
            .with_scope("admin");
        let err = issuer.issue(&request).await.unwrap_err();
        assert!(matches!(err, IssuanceError::InvalidScope));
        assert_eq!(err.oauth_error_code(), "invalid_scope");
    }

    #[tokio::test]
    async fn test_empty_scope_request_defaults_to_full_allowed_set() {
        let (issuer, _) = make_issuer().await;

        let request = TokenGrantRequest::password("web-app", "s3cr3t", "alice", "wonderland");
        let grant = issuer.issue(&request).await.unwrap();
        assert_eq!(grant.scope, "read write");
    }

    #[tokio::test]
    async fn test_partially_allowed_request_keeps_the_intersection() {
        let (issuer, _) = make_issuer().await;

        let request = TokenGrantRequest::password("web-app", "s3cr3t", "alice", "wonderland")
            .with_scope("read admin");
        let grant = issuer.issue(&request).await.unwrap();
        assert_eq!(grant.scope, "read");
    }

    #[tokio::test]
    async fn test_client_credentials_grant() {
        let (issuer, codec) = make_issuer().await;

        let request = TokenGrantRequest::client_credentials("batch-svc", "svc-secret");
        let grant = issuer.issue(&request).await.unwrap();

        // Default lifetime applies: the record carries no explicit window.
        assert_eq!(grant.expires_in, 3600);
        // Not authorized for refresh_token, so none is minted.
        assert!(grant.refresh_token.is_none());

        let claims = codec.decode(&grant.access_token).unwrap();
        assert_eq!(claims.sub, "batch-svc");
        assert_eq!(claims.authorities, vec!["ROLE_SERVICE".to_string()]);
        assert_eq!(claims.scope, "report");
    }

    #[tokio::test]
    async fn test_refresh_grant_rotates_tokens_and_preserves_subject() {
        let (issuer, codec) = make_issuer().await;

        let initial = issuer
            .issue(&TokenGrantRequest::password("web-app", "s3cr3t", "alice", "wonderland"))
            .await
            .unwrap();
        let refresh_token = initial.refresh_token.unwrap();

        let refreshed = issuer
            .issue(&TokenGrantRequest::refresh("web-app", "s3cr3t", &refresh_token))
            .await
            .unwrap();

        let claims = codec.decode(&refreshed.access_token).unwrap();
        assert_eq!(claims.sub, "alice");
        assert_eq!(claims.authorities, vec!["ROLE_USER".to_string()]);
        assert_eq!(refreshed.scope, "read write");

        // Rotation: a fresh refresh token, distinct from the presented one.
        let rotated = refreshed.refresh_token.unwrap();
        assert_ne!(rotated, refresh_token);
    }

    #[tokio::test]
    async fn test_refresh_grant_narrows_within_original_scope() {
        let (issuer, _) = make_issuer().await;

        let initial = issuer
            .issue(
                &TokenGrantRequest::password("web-app", "s3cr3t", "alice", "wonderland")
                    .with_scope("read"),
            )
            .await
            .unwrap();
        let refresh_token = initial.refresh_token.unwrap();

        // Widening beyond the originally granted set must fail.
        let err = issuer
            .issue(
                &TokenGrantRequest::refresh("web-app", "s3cr3t", &refresh_token)
                    .with_scope("write"),
            )
            .await
            .unwrap_err();
        assert!(matches!(err, IssuanceError::InvalidScope));

        // Staying within it succeeds.
        let narrowed = issuer
            .issue(
                &TokenGrantRequest::refresh("web-app", "s3cr3t", &refresh_token)
                    .with_scope("read"),
            )
            .await
            .unwrap();
        assert_eq!(narrowed.scope, "read");
    }

    #[tokio::test]
    async fn test_access_token_rejected_as_refresh_token() {
        let (issuer, _) = make_issuer().await;

        let initial = issuer
            .issue(&TokenGrantRequest::password("web-app", "s3cr3t", "alice", "wonderland"))
            .await
            .unwrap();

        let err = issuer
            .issue(&TokenGrantRequest::refresh(
                "web-app",
                "s3cr3t",
                &initial.access_token,
            ))
            .await
            .unwrap_err();
        assert!(matches!(err, IssuanceError::InvalidGrant));
    }

    #[tokio::test]
    async fn test_refresh_token_of_another_client_rejected() {
        let (issuer, codec) = make_issuer().await;

        // A genuine refresh token, but issued to a different client.
        let foreign = AccessTokenClaims::builder("alice", "other-app")
            .scope("read")
            .expires_in_seconds(86400)
            .refresh()
            .build();
        let token = codec.encode(&foreign).unwrap();

        let err = issuer
            .issue(&TokenGrantRequest::refresh("web-app", "s3cr3t", &token))
            .await
            .unwrap_err();
        assert!(matches!(err, IssuanceError::InvalidGrant));
    }

    #[tokio::test]
    async fn test_missing_credential_fields_are_invalid_grant() {
        let (issuer, _) = make_issuer().await;

        let mut request = TokenGrantRequest::password("web-app", "s3cr3t", "alice", "wonderland");
        request.password = None;
        assert!(matches!(
            issuer.issue(&request).await.unwrap_err(),
            IssuanceError::InvalidGrant
        ));

        let mut request = TokenGrantRequest::refresh("web-app", "s3cr3t", "x");
        request.refresh_token = None;
        assert!(matches!(
            issuer.issue(&request).await.unwrap_err(),
            IssuanceError::InvalidGrant
        ));
    }

    #[tokio::test]
    async fn test_issuance_is_not_idempotent() {
        let (issuer, codec) = make_issuer().await;

        let request = TokenGrantRequest::password("web-app", "s3cr3t", "alice", "wonderland");
        let first = issuer.issue(&request).await.unwrap();
        let second = issuer.issue(&request).await.unwrap();

        let a = codec.decode(&first.access_token).unwrap();
        let b = codec.decode(&second.access_token).unwrap();
        assert_ne!(a.jti, b.jti);
        // Both remain independently valid.
        assert_eq!(a.sub, b.sub);
    }

    #[tokio::test]
    async fn test_request_form_deserialization() {
        let json = r#"{
            "grant_type": "password",
            "client_id": "web-app",
            "client_secret": "s3cr3t",
            "username": "alice",
            "password": "wonderland",
            "scope": "read"
        }"#;

        let request: TokenGrantRequest = serde_json::from_str(json).unwrap();
        assert_eq!(request.grant_type, "password");
        assert_eq!(request.username.as_deref(), Some("alice"));
        assert!(request.refresh_token.is_none());
    }
}
