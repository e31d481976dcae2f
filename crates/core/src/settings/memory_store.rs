use std::collections::HashMap;
use std::sync::Mutex;

use async_trait::async_trait;

use crate::errors::{Error, Result, StoreError};
use crate::settings::settings_traits::StateStoreTrait;

/// In-memory state store for tests and ephemeral (non-persistent) sessions.
#[derive(Debug, Default)]
pub struct MemoryStateStore {
    values: Mutex<HashMap<String, String>>,
}

impl MemoryStateStore {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl StateStoreTrait for MemoryStateStore {
    fn get(&self, key: &str) -> Result<Option<String>> {
        let values = self
            .values
            .lock()
            .map_err(|e| Error::Store(StoreError::Query(e.to_string())))?;
        Ok(values.get(key).cloned())
    }

    async fn set(&self, key: &str, value: &str) -> Result<()> {
        let mut values = self
            .values
            .lock()
            .map_err(|e| Error::Store(StoreError::Query(e.to_string())))?;
        values.insert(key.to_string(), value.to_string());
        Ok(())
    }

    async fn delete(&self, key: &str) -> Result<()> {
        let mut values = self
            .values
            .lock()
            .map_err(|e| Error::Store(StoreError::Query(e.to_string())))?;
        values.remove(key);
        Ok(())
    }
}
