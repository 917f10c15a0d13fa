use std::fmt;

use thiserror::Error;

use crate::services::job_registry::RegistryError;

/// 映射冲突发生的路径
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ConflictKind {
    /// 更新已有映射时 db_field 被其他记录占用
    Update,
    /// 新建映射时 api_field 或 db_field 已存在
    Creation,
}

impl fmt::Display for ConflictKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ConflictKind::Update => f.write_str("update conflict"),
            ConflictKind::Creation => f.write_str("creation conflict"),
        }
    }
}

#[derive(Error, Debug)]
pub enum AppError {
    #[error("Database error: {0}")]
    Database(#[from] sqlx::Error),

    #[error("Invalid input: {0}")]
    InvalidInput(String),

    #[error("Not found: {0}")]
    NotFound(String),

    /// 存储层唯一约束冲突，由各 service 转换为具体的业务错误
    #[error("Unique constraint violated: {0}")]
    UniqueViolation(String),

    #[error("{kind}: {message}")]
    MappingConflict { kind: ConflictKind, message: String },

    #[error("Duplicate task: {0}")]
    DuplicateTask(String),

    #[error("Registry consistency error: {0}")]
    RegistryConsistency(#[from] RegistryError),

    #[error("Upstream error: {0}")]
    Upstream(String),

    #[error("Fetch error: {0}")]
    Fetch(#[from] reqwest::Error),
}

impl AppError {
    /// 返回给客户端的错误类别
    pub fn kind(&self) -> &'static str {
        match self {
            AppError::NotFound(_) => "not_found",
            AppError::MappingConflict { .. } => "mapping_conflict",
            AppError::DuplicateTask(_) => "duplicate_task",
            AppError::RegistryConsistency(_) => "registry_consistency",
            AppError::InvalidInput(_) => "invalid_input",
            _ => "internal",
        }
    }
}

pub type Result<T> = std::result::Result<T, AppError>;
