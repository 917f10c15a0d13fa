use async_trait::async_trait;
use sqlx::MySqlPool;

use super::store::{FieldMappingStore, SchedulerConfigStore};
use crate::models::{FieldMapping, SchedulerConfig};
use crate::utils::error::{AppError, Result};

/// 将写入时的唯一约束冲突单独识别出来，其余错误按数据库错误处理
fn map_write_error(err: sqlx::Error) -> AppError {
    match &err {
        sqlx::Error::Database(db_err) if db_err.is_unique_violation() => {
            AppError::UniqueViolation(db_err.message().to_string())
        }
        _ => AppError::Database(err),
    }
}

/// 字段映射仓库
#[derive(Clone)]
pub struct MappingRepository {
    pool: MySqlPool,
}

impl MappingRepository {
    pub fn new(pool: MySqlPool) -> Self {
        Self { pool }
    }

    async fn find_by_id(&self, id: i64) -> Result<FieldMapping> {
        sqlx::query_as::<_, FieldMapping>(
            "SELECT id, api_field, db_field FROM field_mappings WHERE id = ?",
        )
        .bind(id)
        .fetch_optional(&self.pool)
        .await?
        .ok_or_else(|| AppError::NotFound(format!("Field mapping with id {} not found", id)))
    }
}

#[async_trait]
impl FieldMappingStore for MappingRepository {
    async fn find_by_api_field(&self, api_field: &str) -> Result<Option<FieldMapping>> {
        let mapping = sqlx::query_as::<_, FieldMapping>(
            "SELECT id, api_field, db_field FROM field_mappings WHERE api_field = ?",
        )
        .bind(api_field)
        .fetch_optional(&self.pool)
        .await?;

        Ok(mapping)
    }

    async fn find_by_db_field(&self, db_field: &str) -> Result<Option<FieldMapping>> {
        let mapping = sqlx::query_as::<_, FieldMapping>(
            "SELECT id, api_field, db_field FROM field_mappings WHERE db_field = ?",
        )
        .bind(db_field)
        .fetch_optional(&self.pool)
        .await?;

        Ok(mapping)
    }

    async fn insert(&self, api_field: &str, db_field: &str) -> Result<FieldMapping> {
        let result = sqlx::query("INSERT INTO field_mappings (api_field, db_field) VALUES (?, ?)")
            .bind(api_field)
            .bind(db_field)
            .execute(&self.pool)
            .await
            .map_err(map_write_error)?;

        Ok(FieldMapping {
            id: result.last_insert_id() as i64,
            api_field: api_field.to_string(),
            db_field: db_field.to_string(),
        })
    }

    async fn update_db_field(&self, id: i64, db_field: &str) -> Result<FieldMapping> {
        // MySQL 对值未变化的行返回 affected = 0，因此不依赖 rows_affected 判断
        sqlx::query("UPDATE field_mappings SET db_field = ? WHERE id = ?")
            .bind(db_field)
            .bind(id)
            .execute(&self.pool)
            .await
            .map_err(map_write_error)?;

        self.find_by_id(id).await
    }

    async fn list(&self, offset: i64, limit: i64) -> Result<Vec<FieldMapping>> {
        let mappings = sqlx::query_as::<_, FieldMapping>(
            "SELECT id, api_field, db_field FROM field_mappings ORDER BY id ASC LIMIT ? OFFSET ?",
        )
        .bind(limit)
        .bind(offset)
        .fetch_all(&self.pool)
        .await?;

        Ok(mappings)
    }
}

/// 定时任务配置仓库
#[derive(Clone)]
pub struct SchedulerRepository {
    pool: MySqlPool,
}

impl SchedulerRepository {
    pub fn new(pool: MySqlPool) -> Self {
        Self { pool }
    }

    async fn find_by_id(&self, id: i64) -> Result<SchedulerConfig> {
        sqlx::query_as::<_, SchedulerConfig>(
            "SELECT id, task_name, enabled FROM scheduler_config WHERE id = ?",
        )
        .bind(id)
        .fetch_optional(&self.pool)
        .await?
        .ok_or_else(|| AppError::NotFound(format!("Scheduler config with id {} not found", id)))
    }
}

#[async_trait]
impl SchedulerConfigStore for SchedulerRepository {
    async fn find_by_task_name(&self, task_name: &str) -> Result<Option<SchedulerConfig>> {
        let config = sqlx::query_as::<_, SchedulerConfig>(
            "SELECT id, task_name, enabled FROM scheduler_config WHERE task_name = ?",
        )
        .bind(task_name)
        .fetch_optional(&self.pool)
        .await?;

        Ok(config)
    }

    async fn insert(&self, task_name: &str, enabled: bool) -> Result<SchedulerConfig> {
        let result = sqlx::query("INSERT INTO scheduler_config (task_name, enabled) VALUES (?, ?)")
            .bind(task_name)
            .bind(enabled)
            .execute(&self.pool)
            .await
            .map_err(map_write_error)?;

        Ok(SchedulerConfig {
            id: result.last_insert_id() as i64,
            task_name: task_name.to_string(),
            enabled,
        })
    }

    async fn set_enabled(&self, id: i64, enabled: bool) -> Result<SchedulerConfig> {
        sqlx::query("UPDATE scheduler_config SET enabled = ? WHERE id = ?")
            .bind(enabled)
            .bind(id)
            .execute(&self.pool)
            .await?;

        self.find_by_id(id).await
    }

    async fn list_enabled(&self) -> Result<Vec<SchedulerConfig>> {
        let configs = sqlx::query_as::<_, SchedulerConfig>(
            "SELECT id, task_name, enabled FROM scheduler_config WHERE enabled = TRUE ORDER BY id ASC",
        )
        .fetch_all(&self.pool)
        .await?;

        Ok(configs)
    }
}
