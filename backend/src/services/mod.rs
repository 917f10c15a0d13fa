pub mod fetcher;
pub mod job_registry;
pub mod mapping_service;
pub mod scheduler_service;

pub use fetcher::{HttpFetchAction, JobAction};
pub use job_registry::{IntervalJobRegistry, JobRegistry, RegistryError};
pub use mapping_service::MappingService;
pub use scheduler_service::SchedulerService;

use crate::utils::error::{AppError, Result};

/// 去掉首尾空白，空名称视为非法输入
pub(crate) fn require_name<'a>(label: &str, value: &'a str) -> Result<&'a str> {
    let trimmed = value.trim();
    if trimmed.is_empty() {
        return Err(AppError::InvalidInput(format!("{} must not be empty", label)));
    }
    Ok(trimmed)
}
