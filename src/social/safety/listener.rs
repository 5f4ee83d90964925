//! 安全管理器监听器回调接口

use crate::social::safety::models::SafetyNotification;
use async_trait::async_trait;

#[async_trait]
pub trait SafetyListener: Send + Sync {
    /// 安全操作完成或失败时的提示
    async fn on_notification(&self, notification: SafetyNotification);

    /// 本地持久化失败（不会中断操作，只用于日志/埋点）
    async fn on_persistence_failed(&self, key: String, error: String);
}

/// 默认空实现（无操作）
pub struct EmptySafetyListener;

#[async_trait]
impl SafetyListener for EmptySafetyListener {
    async fn on_notification(&self, _notification: SafetyNotification) {}

    async fn on_persistence_failed(&self, _key: String, _error: String) {}
}
