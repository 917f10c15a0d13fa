//! In-process storage with the same unique keys as the MySQL tables.
//!
//! Used when `STORAGE=memory` and by the test suites. Data is lost on restart.

use async_trait::async_trait;
use tokio::sync::Mutex;

use super::store::{FieldMappingStore, SchedulerConfigStore};
use crate::models::{FieldMapping, SchedulerConfig};
use crate::utils::error::{AppError, Result};

struct Table<T> {
    next_id: i64,
    rows: Vec<T>,
}

impl<T> Default for Table<T> {
    fn default() -> Self {
        Self {
            next_id: 0,
            rows: Vec::new(),
        }
    }
}

impl<T> Table<T> {
    fn next_id(&mut self) -> i64 {
        self.next_id += 1;
        self.next_id
    }
}

#[derive(Default)]
pub struct MemoryStore {
    mappings: Mutex<Table<FieldMapping>>,
    schedulers: Mutex<Table<SchedulerConfig>>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl FieldMappingStore for MemoryStore {
    async fn find_by_api_field(&self, api_field: &str) -> Result<Option<FieldMapping>> {
        let table = self.mappings.lock().await;
        Ok(table.rows.iter().find(|m| m.api_field == api_field).cloned())
    }

    async fn find_by_db_field(&self, db_field: &str) -> Result<Option<FieldMapping>> {
        let table = self.mappings.lock().await;
        Ok(table.rows.iter().find(|m| m.db_field == db_field).cloned())
    }

    async fn insert(&self, api_field: &str, db_field: &str) -> Result<FieldMapping> {
        let mut table = self.mappings.lock().await;

        if table.rows.iter().any(|m| m.api_field == api_field) {
            return Err(AppError::UniqueViolation(format!(
                "Duplicate entry '{}' for key 'uk_api_field'",
                api_field
            )));
        }
        if table.rows.iter().any(|m| m.db_field == db_field) {
            return Err(AppError::UniqueViolation(format!(
                "Duplicate entry '{}' for key 'uk_db_field'",
                db_field
            )));
        }

        let mapping = FieldMapping {
            id: table.next_id(),
            api_field: api_field.to_string(),
            db_field: db_field.to_string(),
        };
        table.rows.push(mapping.clone());

        Ok(mapping)
    }

    async fn update_db_field(&self, id: i64, db_field: &str) -> Result<FieldMapping> {
        let mut table = self.mappings.lock().await;

        if table.rows.iter().any(|m| m.db_field == db_field && m.id != id) {
            return Err(AppError::UniqueViolation(format!(
                "Duplicate entry '{}' for key 'uk_db_field'",
                db_field
            )));
        }

        let mapping = table
            .rows
            .iter_mut()
            .find(|m| m.id == id)
            .ok_or_else(|| AppError::NotFound(format!("Field mapping with id {} not found", id)))?;
        mapping.db_field = db_field.to_string();

        Ok(mapping.clone())
    }

    async fn list(&self, offset: i64, limit: i64) -> Result<Vec<FieldMapping>> {
        let table = self.mappings.lock().await;
        // 行按插入顺序保存，即主键顺序
        Ok(table
            .rows
            .iter()
            .skip(offset.max(0) as usize)
            .take(limit.max(0) as usize)
            .cloned()
            .collect())
    }
}

#[async_trait]
impl SchedulerConfigStore for MemoryStore {
    async fn find_by_task_name(&self, task_name: &str) -> Result<Option<SchedulerConfig>> {
        let table = self.schedulers.lock().await;
        Ok(table.rows.iter().find(|c| c.task_name == task_name).cloned())
    }

    async fn insert(&self, task_name: &str, enabled: bool) -> Result<SchedulerConfig> {
        let mut table = self.schedulers.lock().await;

        if table.rows.iter().any(|c| c.task_name == task_name) {
            return Err(AppError::UniqueViolation(format!(
                "Duplicate entry '{}' for key 'uk_task_name'",
                task_name
            )));
        }

        let config = SchedulerConfig {
            id: table.next_id(),
            task_name: task_name.to_string(),
            enabled,
        };
        table.rows.push(config.clone());

        Ok(config)
    }

    async fn set_enabled(&self, id: i64, enabled: bool) -> Result<SchedulerConfig> {
        let mut table = self.schedulers.lock().await;

        let config = table
            .rows
            .iter_mut()
            .find(|c| c.id == id)
            .ok_or_else(|| AppError::NotFound(format!("Scheduler config with id {} not found", id)))?;
        config.enabled = enabled;

        Ok(config.clone())
    }

    async fn list_enabled(&self) -> Result<Vec<SchedulerConfig>> {
        let table = self.schedulers.lock().await;
        Ok(table.rows.iter().filter(|c| c.enabled).cloned().collect())
    }
}
