//! 发现页监听器回调接口

use crate::social::connection::ConnectionEvent;
use crate::social::discovery::models::{StackStatus, SwipeAction};
use async_trait::async_trait;

#[async_trait]
pub trait DiscoveryListener: Send + Sync {
    /// 滑卡堆栈状态变化（加载完成、前进、撤回、筛选变化）
    async fn on_stack_changed(&self, status: StackStatus);

    /// 服务端返回新配对，弹窗已打开
    async fn on_connection(&self, event: ConnectionEvent);

    /// 收到 401，调用方应跳转登录
    async fn on_unauthorized(&self);

    /// 滑卡上报失败（界面不会回滚）
    async fn on_swipe_failed(&self, candidate_id: String, action: SwipeAction, error: String);
}

/// 默认空实现（无操作）
pub struct EmptyDiscoveryListener;

#[async_trait]
impl DiscoveryListener for EmptyDiscoveryListener {
    async fn on_stack_changed(&self, _status: StackStatus) {}
    async fn on_connection(&self, _event: ConnectionEvent) {}
    async fn on_unauthorized(&self) {}
    async fn on_swipe_failed(&self, _candidate_id: String, _action: SwipeAction, _error: String) {}
}
