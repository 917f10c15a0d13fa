use axum::{
    extract::{Path, Query, State},
    Json,
};

use super::{error::ApiError, AppState};
use crate::models::{CreateSchedulerRequest, JobSnapshot, SchedulerConfig, UpdateSchedulerQuery};

/// 创建定时任务配置
pub async fn create_scheduler(
    State(state): State<AppState>,
    Json(request): Json<CreateSchedulerRequest>,
) -> Result<Json<SchedulerConfig>, ApiError> {
    let config = state.schedulers.create_config(request).await?;
    Ok(Json(config))
}

/// 获取定时任务配置
pub async fn get_scheduler(
    State(state): State<AppState>,
    Path(task_name): Path<String>,
) -> Result<Json<SchedulerConfig>, ApiError> {
    let config = state.schedulers.get_config(&task_name).await?;
    Ok(Json(config))
}

/// 启用或停用定时任务
pub async fn update_scheduler(
    State(state): State<AppState>,
    Path(task_name): Path<String>,
    Query(params): Query<UpdateSchedulerQuery>,
) -> Result<Json<SchedulerConfig>, ApiError> {
    let config = state
        .schedulers
        .set_enabled(&task_name, params.enabled)
        .await?;
    Ok(Json(config))
}

/// 当前已注册的任务
pub async fn list_jobs(State(state): State<AppState>) -> Json<Vec<JobSnapshot>> {
    Json(state.schedulers.jobs().await)
}
