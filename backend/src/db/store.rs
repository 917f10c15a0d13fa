//! Storage seams used by the services.
//!
//! Implementations must enforce the unique keys declared in [`super::schema`]
//! and report a violation as [`AppError::UniqueViolation`](crate::utils::error::AppError::UniqueViolation)
//! so the services can translate it into the matching business error.

use async_trait::async_trait;

use crate::models::{FieldMapping, SchedulerConfig};
use crate::utils::error::Result;

#[async_trait]
pub trait FieldMappingStore: Send + Sync {
    async fn find_by_api_field(&self, api_field: &str) -> Result<Option<FieldMapping>>;

    async fn find_by_db_field(&self, db_field: &str) -> Result<Option<FieldMapping>>;

    /// 插入新映射，返回带自增 id 的记录
    async fn insert(&self, api_field: &str, db_field: &str) -> Result<FieldMapping>;

    /// 修改已有映射的 db_field
    async fn update_db_field(&self, id: i64, db_field: &str) -> Result<FieldMapping>;

    /// 按主键顺序分页
    async fn list(&self, offset: i64, limit: i64) -> Result<Vec<FieldMapping>>;
}

#[async_trait]
pub trait SchedulerConfigStore: Send + Sync {
    async fn find_by_task_name(&self, task_name: &str) -> Result<Option<SchedulerConfig>>;

    async fn insert(&self, task_name: &str, enabled: bool) -> Result<SchedulerConfig>;

    async fn set_enabled(&self, id: i64, enabled: bool) -> Result<SchedulerConfig>;

    async fn list_enabled(&self) -> Result<Vec<SchedulerConfig>>;
}
