use std::sync::Arc;

use async_trait::async_trait;
use diesel::prelude::*;

use super::model::DeviceStateRow;
use crate::db::{get_connection, DbPool};
use crate::errors::StorageError;
use crate::schema::device_state::dsl::*;
use pennyflow_core::errors::Result;
use pennyflow_core::settings::StateStoreTrait;

/// Diesel-backed implementation of the device-state store.
pub struct SqliteStateStore {
    pool: Arc<DbPool>,
}

impl SqliteStateStore {
    pub fn new(pool: Arc<DbPool>) -> Self {
        SqliteStateStore { pool }
    }
}

#[async_trait]
impl StateStoreTrait for SqliteStateStore {
    fn get(&self, key: &str) -> Result<Option<String>> {
        let mut conn = get_connection(&self.pool)?;
        let value = device_state
            .filter(setting_key.eq(key))
            .select(setting_value)
            .first::<String>(&mut conn)
            .optional()
            .map_err(StorageError::from)?;
        Ok(value)
    }

    async fn set(&self, key: &str, value: &str) -> Result<()> {
        let mut conn = get_connection(&self.pool)?;
        diesel::replace_into(device_state)
            .values(&DeviceStateRow {
                setting_key: key.to_string(),
                setting_value: value.to_string(),
            })
            .execute(&mut conn)
            .map_err(StorageError::from)?;
        Ok(())
    }

    async fn delete(&self, key: &str) -> Result<()> {
        let mut conn = get_connection(&self.pool)?;
        diesel::delete(device_state.filter(setting_key.eq(key)))
            .execute(&mut conn)
            .map_err(StorageError::from)?;
        Ok(())
    }
}
