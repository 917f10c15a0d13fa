use axum::{
    extract::{Path, Query, State},
    Json,
};

use super::{error::ApiError, AppState};
use crate::models::{FieldMapping, ListMappingsQuery, UpsertMappingRequest};

/// 创建或更新字段映射
pub async fn upsert_mapping(
    State(state): State<AppState>,
    Json(request): Json<UpsertMappingRequest>,
) -> Result<Json<FieldMapping>, ApiError> {
    let mapping = state.mappings.upsert(request).await?;
    Ok(Json(mapping))
}

/// 按 api_field 获取映射
pub async fn get_mapping(
    State(state): State<AppState>,
    Path(api_field): Path<String>,
) -> Result<Json<FieldMapping>, ApiError> {
    let mapping = state.mappings.get(&api_field).await?;
    Ok(Json(mapping))
}

/// 分页获取映射列表
pub async fn list_mappings(
    State(state): State<AppState>,
    Query(params): Query<ListMappingsQuery>,
) -> Result<Json<Vec<FieldMapping>>, ApiError> {
    let mappings = state.mappings.list(params.skip, params.limit).await?;
    Ok(Json(mappings))
}
