use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// 定时任务开关配置
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq, sqlx::FromRow)]
pub struct SchedulerConfig {
    pub id: i64,
    pub task_name: String,
    pub enabled: bool,
}

/// 创建定时任务配置的请求
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CreateSchedulerRequest {
    pub task_name: String,
    #[serde(default)]
    pub enabled: bool,
}

#[derive(Debug, Deserialize)]
pub struct UpdateSchedulerQuery {
    pub enabled: bool,
}

/// 已注册任务的运行状态
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct JobSnapshot {
    pub task_name: String,
    pub period_secs: u64,
    pub registered_at: DateTime<Utc>,
    pub last_run_at: Option<DateTime<Utc>>,
    pub run_count: u64,
    pub last_error: Option<String>,
}
