//! Client registry.
//!
//! Resolves an opaque client identifier into a validated, immutable
//! [`ClientDescriptor`] by delegating the lookup to the external
//! client-details store and validating the returned record.
//!
//! # Security
//!
//! A miss, a malformed record, and a store fault all resolve to the same
//! [`ClientResolutionError::NotFound`], so the registry cannot be used
//! as an enumeration oracle. The underlying cause is preserved on the
//! error for diagnostics and logged at debug level, never surfaced to
//! callers.

use std::collections::BTreeSet;
use std::sync::Arc;

use crate::storage::{ClientDetailsStore, ClientRecord};
use crate::types::{ClientDescriptor, GrantType};

/// Errors that can occur while resolving a client id.
#[derive(Debug, thiserror::Error)]
pub enum ClientResolutionError {
    /// The client id was empty or malformed and was rejected before the
    /// store was queried.
    #[error("Invalid client id")]
    InvalidId,

    /// No usable client registration exists for the id.
    ///
    /// Deliberately covers "no such record", "record fails validation",
    /// and "store fault" alike; the cause distinguishes them internally.
    #[error("No client details for client id")]
    NotFound {
        /// The underlying cause, kept for logging only.
        #[source]
        source: Option<Box<dyn std::error::Error + Send + Sync>>,
    },
}

impl ClientResolutionError {
    /// Creates a `NotFound` error without a cause.
    #[must_use]
    pub fn not_found() -> Self {
        Self::NotFound { source: None }
    }

    /// Creates a `NotFound` error wrapping the underlying cause.
    #[must_use]
    pub fn not_found_caused_by(source: impl std::error::Error + Send + Sync + 'static) -> Self {
        Self::NotFound {
            source: Some(Box::new(source)),
        }
    }

    /// Returns the OAuth 2.0 error code for this error.
    ///
    /// Both variants map to `invalid_client`; the endpoint layer must
    /// not report a finer distinction.
    #[must_use]
    pub fn oauth_error_code(&self) -> &'static str {
        "invalid_client"
    }
}

/// Resolves client ids against the external client-details store.
///
/// The registry is stateless and read-only: a fresh descriptor is built
/// on every lookup and nothing is cached here.
#[derive(Clone)]
pub struct ClientRegistry {
    store: Arc<dyn ClientDetailsStore>,
}

impl ClientRegistry {
    /// Creates a registry backed by the given store.
    #[must_use]
    pub fn new(store: Arc<dyn ClientDetailsStore>) -> Self {
        Self { store }
    }

    /// Resolves a client id to a validated descriptor.
    ///
    /// # Errors
    ///
    /// - [`ClientResolutionError::InvalidId`] for empty or blank ids,
    ///   rejected before the store is queried
    /// - [`ClientResolutionError::NotFound`] when no record exists, the
    ///   record fails validation (including an empty or unknown grant
    ///   type set), or the store lookup fails
    pub async fn resolve(&self, client_id: &str) -> Result<ClientDescriptor, ClientResolutionError> {
        if client_id.trim().is_empty() {
            return Err(ClientResolutionError::InvalidId);
        }

        let record = match self.store.find_by_client_id(client_id).await {
            Ok(Some(record)) => record,
            Ok(None) => {
                tracing::debug!(client_id, "Client not found in store");
                return Err(ClientResolutionError::not_found());
            }
            Err(e) => {
                tracing::debug!(client_id, error = %e, "Client lookup failed");
                return Err(ClientResolutionError::not_found_caused_by(e));
            }
        };

        Self::descriptor_from_record(record)
    }

    /// Converts a raw store record into a validated descriptor.
    fn descriptor_from_record(
        record: ClientRecord,
    ) -> Result<ClientDescriptor, ClientResolutionError> {
        let mut grant_types = BTreeSet::new();
        for raw in &record.authorized_grant_types {
            let grant: GrantType = raw.parse().map_err(|e| {
                tracing::debug!(client_id = %record.client_id, grant_type = %raw, "Rejected unknown grant type");
                ClientResolutionError::not_found_caused_by(e)
            })?;
            grant_types.insert(grant);
        }

        let descriptor = ClientDescriptor {
            client_id: record.client_id,
            client_secret: record.client_secret,
            resource_ids: record.resource_ids.into_iter().collect(),
            scopes: record.scopes.into_iter().collect(),
            authorized_grant_types: grant_types,
            authorities: record.authorities.into_iter().collect(),
            access_token_validity_seconds: record.access_token_validity,
            refresh_token_validity_seconds: record.refresh_token_validity,
        };

        descriptor
            .validate()
            .map_err(ClientResolutionError::not_found_caused_by)?;

        Ok(descriptor)
    }
}

#[cfg(test)]
mod tests {
    use std::sync::atomic::{AtomicUsize, Ordering};

    use async_trait::async_trait;

    use super::*;
    use crate::AuthResult;
    use crate::error::AuthError;
    use crate::storage::MemoryClientStore;

    fn record(client_id: &str, grant_types: &[&str]) -> ClientRecord {
        ClientRecord {
            client_id: client_id.to_string(),
            client_secret: "s3cr3t".to_string(),
            resource_ids: vec!["api".to_string()],
            scopes: vec!["read".to_string(), "write".to_string()],
            authorized_grant_types: grant_types.iter().map(ToString::to_string).collect(),
            authorities: vec!["ROLE_CLIENT".to_string()],
            access_token_validity: 3600,
            refresh_token_validity: 86400,
        }
    }

    /// Store double that counts lookups and always fails.
    struct FailingStore {
        calls: AtomicUsize,
    }

    #[async_trait]
    impl ClientDetailsStore for FailingStore {
        async fn find_by_client_id(&self, _client_id: &str) -> AuthResult<Option<ClientRecord>> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            Err(AuthError::illegal_argument("malformed client id"))
        }
    }

    #[tokio::test]
    async fn test_resolve_valid_client() {
        let store = MemoryClientStore::new();
        store
            .insert(record("web-app", &["password", "refresh_token"]))
            .await;

        let registry = ClientRegistry::new(Arc::new(store));
        let descriptor = registry.resolve("web-app").await.unwrap();

        assert_eq!(descriptor.client_id, "web-app");
        assert!(descriptor.is_grant_type_allowed(GrantType::Password));
        assert!(descriptor.is_grant_type_allowed(GrantType::RefreshToken));
        assert_eq!(descriptor.access_token_validity_seconds, 3600);
        assert!(descriptor.scopes.contains("read"));
    }

    #[tokio::test]
    async fn test_empty_id_rejected_before_store_query() {
        let store = Arc::new(FailingStore {
            calls: AtomicUsize::new(0),
        });
        let registry = ClientRegistry::new(store.clone());

        for id in ["", "   "] {
            let err = registry.resolve(id).await.unwrap_err();
            assert!(matches!(err, ClientResolutionError::InvalidId));
        }
        assert_eq!(store.calls.load(Ordering::SeqCst), 0);
    }

    #[tokio::test]
    async fn test_unknown_client_is_not_found_without_cause() {
        let registry = ClientRegistry::new(Arc::new(MemoryClientStore::new()));
        let err = registry.resolve("ghost").await.unwrap_err();
        assert!(matches!(err, ClientResolutionError::NotFound { source: None }));
    }

    #[tokio::test]
    async fn test_store_fault_is_not_found_with_cause() {
        let registry = ClientRegistry::new(Arc::new(FailingStore {
            calls: AtomicUsize::new(0),
        }));

        let err = registry.resolve("web-app").await.unwrap_err();
        match err {
            ClientResolutionError::NotFound { source: Some(cause) } => {
                assert!(cause.to_string().contains("malformed client id"));
            }
            other => panic!("expected NotFound with cause, got {other:?}"),
        }
    }

    #[tokio::test]
    async fn test_empty_grant_types_treated_as_not_found() {
        let store = MemoryClientStore::new();
        store.insert(record("web-app", &[])).await;

        let registry = ClientRegistry::new(Arc::new(store));
        let err = registry.resolve("web-app").await.unwrap_err();
        assert!(matches!(err, ClientResolutionError::NotFound { source: Some(_) }));
    }

    #[tokio::test]
    async fn test_unknown_grant_type_treated_as_not_found() {
        let store = MemoryClientStore::new();
        store.insert(record("web-app", &["password", "saml"])).await;

        let registry = ClientRegistry::new(Arc::new(store));
        let err = registry.resolve("web-app").await.unwrap_err();
        match err {
            ClientResolutionError::NotFound { source: Some(cause) } => {
                assert!(cause.to_string().contains("saml"));
            }
            other => panic!("expected NotFound with cause, got {other:?}"),
        }
    }

    #[tokio::test]
    async fn test_oauth_error_code_identical_for_all_failures() {
        let registry = ClientRegistry::new(Arc::new(MemoryClientStore::new()));

        let invalid = registry.resolve("").await.unwrap_err();
        let missing = registry.resolve("ghost").await.unwrap_err();
        assert_eq!(invalid.oauth_error_code(), missing.oauth_error_code());
        assert_eq!(missing.oauth_error_code(), "invalid_client");
    }
}
