//! 建表语句
//!
//! 唯一列使用 `utf8mb4_bin` 排序规则，按字节比较，
//! 大小写不同的名称是不同的键，与内存存储的判定一致。

/// 字段映射表的 CREATE TABLE 语句 (MySQL 8)
pub const CREATE_FIELD_MAPPINGS_TABLE: &str = r#"
CREATE TABLE IF NOT EXISTS field_mappings (
    id BIGINT AUTO_INCREMENT PRIMARY KEY,
    api_field VARCHAR(255) CHARACTER SET utf8mb4 COLLATE utf8mb4_bin NOT NULL,
    db_field VARCHAR(255) CHARACTER SET utf8mb4 COLLATE utf8mb4_bin NOT NULL,
    UNIQUE KEY uk_api_field (api_field),
    UNIQUE KEY uk_db_field (db_field)
) ENGINE=InnoDB DEFAULT CHARSET=utf8mb4 COLLATE=utf8mb4_unicode_ci;
"#;

/// 定时任务配置表的 CREATE TABLE 语句 (MySQL 8)
pub const CREATE_SCHEDULER_CONFIG_TABLE: &str = r#"
CREATE TABLE IF NOT EXISTS scheduler_config (
    id BIGINT AUTO_INCREMENT PRIMARY KEY,
    task_name VARCHAR(255) CHARACTER SET utf8mb4 COLLATE utf8mb4_bin NOT NULL,
    enabled BOOLEAN NOT NULL DEFAULT FALSE,
    UNIQUE KEY uk_task_name (task_name)
) ENGINE=InnoDB DEFAULT CHARSET=utf8mb4 COLLATE=utf8mb4_unicode_ci;
"#;
