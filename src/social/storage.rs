//! 本地持久化端口
//!
//! 安全管理器和发现页只依赖 [`KeyValueStore`]：`get(key)` / `set(key, value)`，
//! 值统一为 JSON 字符串。SQLite 实现的表结构由 `migrations/` 目录下的
//! sqlx 迁移管理，通过 `sqlx::migrate!()` 自动升级。

use anyhow::{Context, Result};
use async_trait::async_trait;
use serde::de::DeserializeOwned;
use sqlx::{sqlite::SqlitePoolOptions, Pool, Row, Sqlite};
use std::collections::HashMap;
use std::sync::Mutex;
use tracing::{debug, warn};

/// 屏蔽用户列表
pub const BLOCKED_USERS_KEY: &str = "swipehub_blocked_users";
/// 本地隐藏内容列表
pub const HIDDEN_CONTENT_KEY: &str = "swipehub_hidden_content";
/// 已举报内容列表
pub const REPORTED_CONTENT_KEY: &str = "swipehub_reported_content";
/// 已举报创作者列表
pub const REPORTED_CREATORS_KEY: &str = "swipehub_reported_creators";
/// 安全设置对象
pub const SAFETY_SETTINGS_KEY: &str = "swipehub_safety_settings";
/// 发现页保存的筛选条件
pub const DISCOVERY_FILTERS_KEY: &str = "swipehub_discovery_filters";

/// 键值存储接口
#[async_trait]
pub trait KeyValueStore: Send + Sync {
    /// 读取键对应的值，不存在时返回 None
    async fn get(&self, key: &str) -> Result<Option<String>>;

    /// 写入（覆盖）键对应的值
    async fn set(&self, key: &str, value: &str) -> Result<()>;
}

/// 读取并反序列化 JSON 值，缺失或损坏时返回 None（只记录日志）
pub async fn load_json<T: DeserializeOwned>(store: &dyn KeyValueStore, key: &str) -> Option<T> {
    match store.get(key).await {
        Ok(Some(raw)) => match serde_json::from_str(&raw) {
            Ok(value) => Some(value),
            Err(e) => {
                warn!("[Storage] {} 内容损坏，使用默认值: {}", key, e);
                None
            }
        },
        Ok(None) => None,
        Err(e) => {
            warn!("[Storage] 读取 {} 失败，使用默认值: {:#}", key, e);
            None
        }
    }
}

/// 内存存储（测试与临时会话使用）
#[derive(Default)]
pub struct MemoryStore {
    entries: Mutex<HashMap<String, String>>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl KeyValueStore for MemoryStore {
    async fn get(&self, key: &str) -> Result<Option<String>> {
        let entries = self
            .entries
            .lock()
            .map_err(|_| anyhow::anyhow!("内存存储锁已中毒"))?;
        Ok(entries.get(key).cloned())
    }

    async fn set(&self, key: &str, value: &str) -> Result<()> {
        let mut entries = self
            .entries
            .lock()
            .map_err(|_| anyhow::anyhow!("内存存储锁已中毒"))?;
        entries.insert(key.to_string(), value.to_string());
        Ok(())
    }
}

/// 创建 SQLite 连接池并执行所有未执行的迁移
pub async fn create_sqlite_pool_with_migration(db_url: &str) -> Result<Pool<Sqlite>> {
    let pool = SqlitePoolOptions::new()
        .max_connections(5)
        .connect(db_url)
        .await
        .context(format!("连接SQLite数据库失败: {}", db_url))?;

    sqlx::migrate!().run(&pool).await.context("执行数据库迁移失败")?;

    Ok(pool)
}

/// SQLite 键值存储（基于 sqlx）
pub struct SqliteStore {
    db: Pool<Sqlite>,
}

impl SqliteStore {
    /// 使用已完成迁移的连接池创建存储
    pub fn new(db: Pool<Sqlite>) -> Self {
        Self { db }
    }

    /// 连接数据库并执行迁移
    pub async fn connect(db_url: &str) -> Result<Self> {
        let db = create_sqlite_pool_with_migration(db_url).await?;
        Ok(Self::new(db))
    }
}

#[async_trait]
impl KeyValueStore for SqliteStore {
    async fn get(&self, key: &str) -> Result<Option<String>> {
        let row = sqlx::query(
            r#"
            SELECT value FROM local_kv WHERE key = ?
            "#,
        )
        .bind(key)
        .fetch_optional(&self.db)
        .await
        .context(format!("读取本地存储失败: {}", key))?;

        Ok(row.map(|r| r.get::<String, _>("value")))
    }

    async fn set(&self, key: &str, value: &str) -> Result<()> {
        let sql = r#"
            INSERT INTO local_kv (key, value, updated_at) VALUES (?, ?, ?)
            ON CONFLICT(key) DO UPDATE SET
                value = excluded.value,
                updated_at = excluded.updated_at
        "#;

        sqlx::query(sql)
            .bind(key)
            .bind(value)
            .bind(chrono::Utc::now().timestamp_millis())
            .execute(&self.db)
            .await
            .context(format!("写入本地存储失败: {}", key))?;
        debug!("[Storage] 已写入 {}（{} 字节）", key, value.len());
        Ok(())
    }
}
