//! User record storage backends.

use crate::error::RegistrationResult;
use crate::record::UserRecord;
use async_trait::async_trait;
use realtime_db_client::RealtimeDbClient;
use std::collections::HashMap;
use std::sync::Arc;
use tokio::sync::RwLock;
use tracing::debug;

/// Document store holding user records by path.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait UserStore: Send + Sync {
    /// Read the record at `path`, `None` if nothing is stored there.
    async fn read(&self, path: &str) -> RegistrationResult<Option<UserRecord>>;

    /// Whether any document is stored at `path`, whatever its shape.
    async fn exists(&self, path: &str) -> RegistrationResult<bool>;

    /// Create or overwrite the record at `path`.
    async fn write(&self, path: &str, record: &UserRecord) -> RegistrationResult<()>;
}

/// In-memory store for testing or when no database is configured.
///
/// Records are kept as JSON documents, the same shape the remote database
/// holds.
#[derive(Clone, Default)]
pub struct MemoryStore {
    documents: Arc<RwLock<HashMap<String, serde_json::Value>>>,
}

impl MemoryStore {
    /// Create a new empty store.
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of stored documents.
    pub async fn count(&self) -> usize {
        self.documents.read().await.len()
    }

    /// All stored paths.
    pub async fn paths(&self) -> Vec<String> {
        self.documents.read().await.keys().cloned().collect()
    }

    /// Raw document at `path`.
    pub async fn document(&self, path: &str) -> Option<serde_json::Value> {
        self.documents.read().await.get(path).cloned()
    }

    /// Store a raw document, bypassing the record shape.
    pub async fn insert_document(&self, path: &str, doc: serde_json::Value) {
        self.documents.write().await.insert(path.to_string(), doc);
    }
}

#[async_trait]
impl UserStore for MemoryStore {
    async fn read(&self, path: &str) -> RegistrationResult<Option<UserRecord>> {
        let documents = self.documents.read().await;
        match documents.get(path) {
            Some(doc) => Ok(Some(serde_json::from_value(doc.clone())?)),
            None => Ok(None),
        }
    }

    async fn exists(&self, path: &str) -> RegistrationResult<bool> {
        Ok(self.documents.read().await.contains_key(path))
    }

    async fn write(&self, path: &str, record: &UserRecord) -> RegistrationResult<()> {
        let doc = serde_json::to_value(record)?;
        self.documents.write().await.insert(path.to_string(), doc);
        debug!(path = %path, "Memory store: record written");
        Ok(())
    }
}

/// Store backed by the realtime database.
#[derive(Clone)]
pub struct RealtimeDbStore {
    client: RealtimeDbClient,
}

impl RealtimeDbStore {
    pub fn new(client: RealtimeDbClient) -> Self {
        Self { client }
    }

    /// Check if the database is reachable.
    pub async fn health_check(&self) -> bool {
        self.client.health_check().await
    }
}

#[async_trait]
impl UserStore for RealtimeDbStore {
    async fn read(&self, path: &str) -> RegistrationResult<Option<UserRecord>> {
        Ok(self.client.get::<UserRecord>(path).await?)
    }

    async fn exists(&self, path: &str) -> RegistrationResult<bool> {
        let doc = self.client.get::<serde_json::Value>(path).await?;
        Ok(doc.is_some())
    }

    async fn write(&self, path: &str, record: &UserRecord) -> RegistrationResult<()> {
        Ok(self.client.put(path, record).await?)
    }
}
