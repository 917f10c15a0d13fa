use std::sync::Arc;

use crate::db::FieldMappingStore;
use crate::models::{FieldMapping, UpsertMappingRequest};
use crate::services::require_name;
use crate::utils::error::{AppError, ConflictKind, Result};

pub const DEFAULT_PAGE_LIMIT: i64 = 100;

/// 字段映射服务
///
/// 唯一性分两步保证：写入前按 db_field 查询做一次乐观检查，
/// 写入时再由存储层的唯一约束兜底，两者都转换为 [`AppError::MappingConflict`]。
#[derive(Clone)]
pub struct MappingService {
    store: Arc<dyn FieldMappingStore>,
}

impl MappingService {
    pub fn new(store: Arc<dyn FieldMappingStore>) -> Self {
        Self { store }
    }

    /// 按 api_field 创建或更新映射
    pub async fn upsert(&self, request: UpsertMappingRequest) -> Result<FieldMapping> {
        let api_field = require_name("api_field", &request.api_field)?;
        let db_field = require_name("db_field", &request.db_field)?;

        match self.store.find_by_api_field(api_field).await? {
            Some(existing) => self.update_existing(existing, db_field).await,
            None => self.create(api_field, db_field).await,
        }
    }

    async fn update_existing(&self, existing: FieldMapping, db_field: &str) -> Result<FieldMapping> {
        if existing.db_field == db_field {
            tracing::debug!("Mapping '{}' already points at '{}'", existing.api_field, db_field);
            return Ok(existing);
        }

        if let Some(owner) = self.store.find_by_db_field(db_field).await? {
            if owner.id != existing.id {
                return Err(update_conflict(db_field, &owner.api_field));
            }
        }

        match self.store.update_db_field(existing.id, db_field).await {
            Ok(updated) => {
                tracing::info!(
                    "Updated mapping '{}': '{}' -> '{}'",
                    updated.api_field,
                    existing.db_field,
                    updated.db_field
                );
                Ok(updated)
            }
            Err(AppError::UniqueViolation(detail)) => {
                tracing::warn!("Update of mapping '{}' hit a unique constraint: {}", existing.api_field, detail);
                Err(AppError::MappingConflict {
                    kind: ConflictKind::Update,
                    message: format!("db_field '{}' already exists for another api_field", db_field),
                })
            }
            Err(e) => Err(e),
        }
    }

    async fn create(&self, api_field: &str, db_field: &str) -> Result<FieldMapping> {
        if let Some(owner) = self.store.find_by_db_field(db_field).await? {
            return Err(AppError::MappingConflict {
                kind: ConflictKind::Creation,
                message: format!(
                    "db_field '{}' is already mapped from api_field '{}'",
                    db_field, owner.api_field
                ),
            });
        }

        match self.store.insert(api_field, db_field).await {
            Ok(created) => {
                tracing::info!(
                    "Created mapping {}: '{}' -> '{}'",
                    created.id,
                    created.api_field,
                    created.db_field
                );
                Ok(created)
            }
            Err(AppError::UniqueViolation(detail)) => {
                tracing::warn!("Insert of mapping '{}' hit a unique constraint: {}", api_field, detail);
                Err(AppError::MappingConflict {
                    kind: ConflictKind::Creation,
                    message: "api_field or db_field already exists".to_string(),
                })
            }
            Err(e) => Err(e),
        }
    }

    pub async fn get(&self, api_field: &str) -> Result<FieldMapping> {
        let api_field = require_name("api_field", api_field)?;
        self.store
            .find_by_api_field(api_field)
            .await?
            .ok_or_else(|| AppError::NotFound(format!("Field mapping '{}' not found", api_field)))
    }

    pub async fn list(&self, skip: Option<i64>, limit: Option<i64>) -> Result<Vec<FieldMapping>> {
        let skip = skip.unwrap_or(0);
        let limit = limit.unwrap_or(DEFAULT_PAGE_LIMIT);
        if skip < 0 || limit < 0 {
            return Err(AppError::InvalidInput(
                "skip and limit must not be negative".to_string(),
            ));
        }

        self.store.list(skip, limit).await
    }
}

fn update_conflict(db_field: &str, owner: &str) -> AppError {
    AppError::MappingConflict {
        kind: ConflictKind::Update,
        message: format!("db_field '{}' is already mapped from api_field '{}'", db_field, owner),
    }
}
