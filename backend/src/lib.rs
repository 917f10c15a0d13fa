//! Field mapping and scheduler toggle service.

pub mod api;
pub mod config;
pub mod db;
pub mod models;
pub mod services;
pub mod utils;

use std::sync::Arc;

use crate::api::AppState;
use crate::config::AppConfig;
use crate::db::Storage;
use crate::services::{JobAction, JobRegistry, MappingService, SchedulerService};

/// 组装路由共享状态
pub fn build_state(
    storage: Storage,
    registry: Arc<dyn JobRegistry>,
    action: Arc<dyn JobAction>,
    config: &AppConfig,
) -> AppState {
    AppState {
        mappings: MappingService::new(storage.mappings),
        schedulers: SchedulerService::new(
            storage.schedulers,
            registry,
            action,
            config.fetch_interval(),
        ),
    }
}
