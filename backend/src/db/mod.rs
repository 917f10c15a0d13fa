pub mod memory;
pub mod repository;
pub mod schema;
pub mod store;

use std::sync::Arc;

use crate::config::{AppConfig, StorageBackend};
use crate::utils::error::Result;
use sqlx::{mysql::MySqlPoolOptions, MySqlPool};

pub use memory::MemoryStore;
pub use repository::*;
pub use store::*;

/// 两类记录各自的存储实现
#[derive(Clone)]
pub struct Storage {
    pub mappings: Arc<dyn FieldMappingStore>,
    pub schedulers: Arc<dyn SchedulerConfigStore>,
}

impl Storage {
    pub fn memory() -> Self {
        let store = Arc::new(MemoryStore::new());
        Self {
            mappings: store.clone(),
            schedulers: store,
        }
    }

    pub fn mysql(pool: MySqlPool) -> Self {
        Self {
            mappings: Arc::new(MappingRepository::new(pool.clone())),
            schedulers: Arc::new(SchedulerRepository::new(pool)),
        }
    }
}

/// 按配置初始化存储
pub async fn init_storage(config: &AppConfig) -> Result<Storage> {
    match config.storage {
        StorageBackend::Memory => {
            tracing::warn!("Using in-memory storage, data will not survive a restart");
            Ok(Storage::memory())
        }
        StorageBackend::Mysql => {
            let pool = init_database(&config.database_url, config.db_max_connections).await?;
            Ok(Storage::mysql(pool))
        }
    }
}

/// 初始化数据库
pub async fn init_database(database_url: &str, max_connections: u32) -> Result<MySqlPool> {
    tracing::info!("Initializing database at: {}", mask_password(database_url));

    // 创建连接池
    let pool = MySqlPoolOptions::new()
        .max_connections(max_connections)
        .connect(database_url)
        .await?;

    // 运行迁移
    run_migrations(&pool).await?;

    Ok(pool)
}

/// 运行数据库迁移
async fn run_migrations(pool: &MySqlPool) -> Result<()> {
    tracing::info!("Running database migrations");

    sqlx::query(schema::CREATE_FIELD_MAPPINGS_TABLE)
        .execute(pool)
        .await?;

    sqlx::query(schema::CREATE_SCHEDULER_CONFIG_TABLE)
        .execute(pool)
        .await?;

    tracing::info!("Database migrations completed");

    Ok(())
}

/// 隐藏密码用于日志输出
pub fn mask_password(url: &str) -> String {
    if let Some(at_pos) = url.find('@') {
        if let Some(colon_pos) = url[..at_pos].rfind(':') {
            // 只有用户名没有密码时，冒号属于协议部分
            if url[colon_pos..].starts_with("://") {
                return url.to_string();
            }
            let mut masked = url.to_string();
            masked.replace_range(colon_pos + 1..at_pos, "****");
            return masked;
        }
    }
    url.to_string()
}
