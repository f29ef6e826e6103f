//! In-memory client store.
//!
//! A `HashMap`-backed [`ClientDetailsStore`] used by tests and by
//! embedders that configure clients statically.

use std::collections::HashMap;

use async_trait::async_trait;
use tokio::sync::RwLock;

use crate::AuthResult;
use crate::storage::client::{ClientDetailsStore, ClientRecord};

/// In-memory implementation of [`ClientDetailsStore`].
#[derive(Debug, Default)]
pub struct MemoryClientStore {
    records: RwLock<HashMap<String, ClientRecord>>,
}

impl MemoryClientStore {
    /// Creates an empty store.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Inserts or replaces a client record, keyed by its `client_id`.
    pub async fn insert(&self, record: ClientRecord) {
        self.records
            .write()
            .await
            .insert(record.client_id.clone(), record);
    }

    /// Removes a client record. Returns `true` if one was present.
    pub async fn remove(&self, client_id: &str) -> bool {
        self.records.write().await.remove(client_id).is_some()
    }
}

#[async_trait]
impl ClientDetailsStore for MemoryClientStore {
    async fn find_by_client_id(&self, client_id: &str) -> AuthResult<Option<ClientRecord>> {
        Ok(self.records.read().await.get(client_id).cloned())
    }
}
