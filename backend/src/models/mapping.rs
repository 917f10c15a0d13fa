use serde::{Deserialize, Serialize};

/// API 字段到数据库字段的映射
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq, sqlx::FromRow)]
pub struct FieldMapping {
    pub id: i64,
    pub api_field: String,
    pub db_field: String,
}

/// 创建或更新映射的请求
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct UpsertMappingRequest {
    pub api_field: String,
    pub db_field: String,
}

#[derive(Debug, Default, Deserialize)]
pub struct ListMappingsQuery {
    pub skip: Option<i64>,
    pub limit: Option<i64>,
}
