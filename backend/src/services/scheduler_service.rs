use std::sync::Arc;
use std::time::Duration;

use crate::db::SchedulerConfigStore;
use crate::models::{CreateSchedulerRequest, JobSnapshot, SchedulerConfig};
use crate::services::fetcher::JobAction;
use crate::services::job_registry::JobRegistry;
use crate::services::require_name;
use crate::utils::error::{AppError, Result};

/// 定时任务开关服务
///
/// 持久化的 enabled 标志与任务注册表保持一致：启用时注册（或替换）任务，
/// 停用时移除任务。移除失败不会回滚已经提交的标志。
#[derive(Clone)]
pub struct SchedulerService {
    store: Arc<dyn SchedulerConfigStore>,
    registry: Arc<dyn JobRegistry>,
    action: Arc<dyn JobAction>,
    period: Duration,
}

impl SchedulerService {
    pub fn new(
        store: Arc<dyn SchedulerConfigStore>,
        registry: Arc<dyn JobRegistry>,
        action: Arc<dyn JobAction>,
        period: Duration,
    ) -> Self {
        Self {
            store,
            registry,
            action,
            period,
        }
    }

    /// 创建任务配置
    pub async fn create_config(&self, request: CreateSchedulerRequest) -> Result<SchedulerConfig> {
        let task_name = require_name("task_name", &request.task_name)?;

        if self.store.find_by_task_name(task_name).await?.is_some() {
            return Err(duplicate(task_name));
        }

        let config = match self.store.insert(task_name, request.enabled).await {
            Ok(config) => config,
            Err(AppError::UniqueViolation(detail)) => {
                tracing::warn!("Insert of scheduler '{}' hit a unique constraint: {}", task_name, detail);
                return Err(duplicate(task_name));
            }
            Err(e) => return Err(e),
        };

        tracing::info!("Created scheduler config '{}' (enabled: {})", config.task_name, config.enabled);

        if config.enabled {
            self.registry
                .register(&config.task_name, self.period, self.action.clone())
                .await?;
        }

        Ok(config)
    }

    pub async fn get_config(&self, task_name: &str) -> Result<SchedulerConfig> {
        let task_name = require_name("task_name", task_name)?;
        self.store
            .find_by_task_name(task_name)
            .await?
            .ok_or_else(|| not_found(task_name))
    }

    /// 切换任务开关，并同步任务注册表
    pub async fn set_enabled(&self, task_name: &str, enabled: bool) -> Result<SchedulerConfig> {
        let task_name = require_name("task_name", task_name)?;
        let existing = self
            .store
            .find_by_task_name(task_name)
            .await?
            .ok_or_else(|| not_found(task_name))?;

        let updated = self.store.set_enabled(existing.id, enabled).await?;

        if enabled {
            self.registry
                .register(task_name, self.period, self.action.clone())
                .await?;
            tracing::info!("Scheduler '{}' enabled.", task_name);
        } else {
            // 标志已提交，注册表不一致时只向调用方报告
            if let Err(e) = self.registry.unregister(task_name).await {
                tracing::error!("Failed to update scheduler '{}': {}", task_name, e);
                return Err(e.into());
            }
            tracing::info!("Scheduler '{}' disabled.", task_name);
        }

        Ok(updated)
    }

    /// 启动时为所有已启用的配置重新注册任务
    pub async fn restore_jobs(&self) -> Result<usize> {
        let configs = self.store.list_enabled().await?;

        for config in &configs {
            self.registry
                .register(&config.task_name, self.period, self.action.clone())
                .await?;
        }

        tracing::info!("Restored {} scheduled job(s)", configs.len());
        Ok(configs.len())
    }

    pub async fn jobs(&self) -> Vec<JobSnapshot> {
        self.registry.jobs().await
    }

    pub async fn shutdown(&self) {
        self.registry.shutdown().await;
    }
}

fn duplicate(task_name: &str) -> AppError {
    AppError::DuplicateTask(format!("Scheduler config '{}' already exists", task_name))
}

fn not_found(task_name: &str) -> AppError {
    AppError::NotFound(format!("Scheduler config '{}' not found", task_name))
}
