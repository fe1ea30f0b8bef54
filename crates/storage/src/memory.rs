use crate::{ResultStore, StorageError, check_key};
use async_trait::async_trait;
use serde_json::Value;
use std::collections::HashMap;
use tokio::sync::RwLock;

#[derive(Debug, Default)]
pub struct MemoryStore {
    entries: RwLock<HashMap<String, Vec<Value>>>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl ResultStore for MemoryStore {
    async fn write(&self, key: &str, records: &[Value]) -> Result<(), StorageError> {
        check_key(key)?;
        self.entries
            .write()
            .await
            .insert(key.to_string(), records.to_vec());
        Ok(())
    }

    async fn read(&self, key: &str) -> Result<Option<Vec<Value>>, StorageError> {
        check_key(key)?;
        Ok(self.entries.read().await.get(key).cloned())
    }
}
