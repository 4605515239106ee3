//! Key-value collaborator — persisted path choice and partner attribution.
//!
//! The wizard never touches ambient storage directly; the host injects an
//! implementation of [`KeyValueStore`] (browser storage, a settings table,
//! whatever it has). [`MemoryStore`] is the bundled in-memory backend used
//! by the demo binary and the test suite.

use std::collections::HashMap;

use async_trait::async_trait;
use tokio::sync::RwLock;

use crate::error::StoreError;

/// Keys the wizard reads and writes.
pub mod storage_keys {
    /// Persisted path choice: `"quiz"` or `"direct-search"`.
    pub const USER_PATH: &str = "car_quiz.user_path";
    /// Broker/partner attribution captured at entry.
    pub const BROKER_INFO: &str = "car_quiz.broker_info";
}

/// Backend-agnostic key-value store. Single reader, single writer; values
/// are JSON.
#[async_trait]
pub trait KeyValueStore: Send + Sync {
    /// Read a value, `None` if the key has never been written.
    async fn get(&self, key: &str) -> Result<Option<serde_json::Value>, StoreError>;

    /// Write a value, replacing any previous one.
    async fn set(&self, key: &str, value: serde_json::Value) -> Result<(), StoreError>;
}

/// In-memory [`KeyValueStore`].
#[derive(Default)]
pub struct MemoryStore {
    values: RwLock<HashMap<String, serde_json::Value>>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl KeyValueStore for MemoryStore {
    async fn get(&self, key: &str) -> Result<Option<serde_json::Value>, StoreError> {
        Ok(self.values.read().await.get(key).cloned())
    }

    async fn set(&self, key: &str, value: serde_json::Value) -> Result<(), StoreError> {
        self.values.write().await.insert(key.to_string(), value);
        Ok(())
    }
}
