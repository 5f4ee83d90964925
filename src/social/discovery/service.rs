//! 发现页（滑卡）控制器
//!
//! 拉取候选人、驱动滑卡堆栈、上报滑卡动作并在服务端返回配对时打开弹窗。
//!
//! 滑卡上报不阻塞界面：动作立即在后台任务中发出，界面按固定延时前进，
//! 上报失败只记录日志并通知监听器，不回滚也不重试。

use crate::social::connection::{
    ConnectionData, ConnectionEvent, ConnectionModal, ConnectionType, NavigationTarget, UserRole,
};
use crate::social::discovery::api::DiscoveryApi;
use crate::social::discovery::listener::{DiscoveryListener, EmptyDiscoveryListener};
use crate::social::discovery::models::{
    DiscoveryFilters, ExistingConnection, StackStatus, SwipeAction, SwipeCandidate,
    SwipeDirection, SwipeHistoryEntry,
};
use crate::social::discovery::stack::SwipeStack;
use crate::social::error::SdkResult;
use crate::social::safety::SafetyManager;
use crate::social::storage::{load_json, KeyValueStore, DISCOVERY_FILTERS_KEY};
use std::collections::HashMap;
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};
use std::time::Duration;
use tokio::task::JoinHandle;
use tracing::{debug, error, info, warn};

/// 发现页配置
#[derive(Debug, Clone)]
pub struct DiscoveryConfig {
    /// 当前用户 ID
    pub user_id: String,
    pub role: UserRole,
    /// 滑卡动画时长，结束后前进到下一张
    pub advance_delay: Duration,
    /// 可撤回步数
    pub max_rewind_depth: usize,
}

impl DiscoveryConfig {
    pub fn new(user_id: String, role: UserRole) -> Self {
        Self {
            user_id,
            role,
            advance_delay: Duration::from_millis(300),
            max_rewind_depth: 1,
        }
    }
}

/// 一次滑卡的回执
pub struct SwipeReceipt {
    pub candidate_id: String,
    pub action: SwipeAction,
    /// 本次滑卡是否推进了堆栈（筛选条件在动画期间变化时为 false）
    pub advanced: bool,
    /// 后台上报任务，结果为新配对（如有）
    pub remote: JoinHandle<Option<ConnectionEvent>>,
}

impl SwipeReceipt {
    /// 等待后台上报完成
    pub async fn connection(self) -> Option<ConnectionEvent> {
        match self.remote.await {
            Ok(event) => event,
            Err(e) => {
                warn!("[Discovery] 滑卡上报任务异常结束: {}", e);
                None
            }
        }
    }
}

fn lock<T>(mutex: &Mutex<T>) -> MutexGuard<'_, T> {
    mutex.lock().unwrap_or_else(PoisonError::into_inner)
}

/// 发现页控制器
pub struct DiscoveryController {
    config: DiscoveryConfig,
    api: Arc<dyn DiscoveryApi>,
    safety: Arc<SafetyManager>,
    store: Arc<dyn KeyValueStore>,
    listener: Arc<dyn DiscoveryListener>,
    stack: Mutex<SwipeStack>,
    modal: Arc<Mutex<ConnectionModal>>,
    connections: Arc<Mutex<HashMap<String, ExistingConnection>>>,
}

impl DiscoveryController {
    /// 创建控制器（使用默认空监听器）
    pub fn new(
        config: DiscoveryConfig,
        api: Arc<dyn DiscoveryApi>,
        safety: Arc<SafetyManager>,
        store: Arc<dyn KeyValueStore>,
    ) -> Self {
        Self::with_listener(config, api, safety, store, Arc::new(EmptyDiscoveryListener))
    }

    pub fn with_listener(
        config: DiscoveryConfig,
        api: Arc<dyn DiscoveryApi>,
        safety: Arc<SafetyManager>,
        store: Arc<dyn KeyValueStore>,
        listener: Arc<dyn DiscoveryListener>,
    ) -> Self {
        let stack = SwipeStack::new(config.max_rewind_depth);
        Self {
            config,
            api,
            safety,
            store,
            listener,
            stack: Mutex::new(stack),
            modal: Arc::new(Mutex::new(ConnectionModal::new())),
            connections: Arc::new(Mutex::new(HashMap::new())),
        }
    }

    /// 加载候选人、已有配对和保存的筛选条件（三者并发）
    pub async fn load(&self) -> SdkResult<()> {
        info!("[Discovery] 🔄 开始加载发现页...");
        lock(&self.stack).set_loading();

        let (candidates, connections, filters) = tokio::join!(
            self.api.fetch_candidates(),
            self.api.load_connections(),
            load_json::<DiscoveryFilters>(self.store.as_ref(), DISCOVERY_FILTERS_KEY),
        );

        match connections {
            Ok(list) => {
                let mut map = lock(&self.connections);
                map.clear();
                map.extend(list.into_iter().map(|c| (c.partner_id.clone(), c)));
                debug!("[Discovery] 已有配对数: {}", map.len());
            }
            Err(e) => {
                warn!("[Discovery] 加载已有配对失败，忽略: {}", e);
            }
        }

        match candidates {
            Ok(batch) => {
                let total = batch.len();
                let visible: Vec<SwipeCandidate> = batch
                    .into_iter()
                    .filter(|c| !self.safety.should_filter_creator(&c.id, c.is_verified, c.age))
                    .collect();
                info!(
                    "[Discovery] ✅ 候选人加载完成 - 服务端: {}, 安全过滤后: {}",
                    total,
                    visible.len()
                );

                let status = {
                    let mut stack = lock(&self.stack);
                    if let Some(filters) = filters {
                        stack.set_filters(filters);
                    }
                    stack.set_candidates(visible);
                    stack.status()
                };
                self.listener.on_stack_changed(status).await;
                Ok(())
            }
            Err(e) => {
                error!("[Discovery] 候选人加载失败: {}", e);
                let status = {
                    let mut stack = lock(&self.stack);
                    stack.set_error(e.to_string());
                    stack.status()
                };
                self.listener.on_stack_changed(status).await;
                if e.is_unauthorized() {
                    self.listener.on_unauthorized().await;
                }
                Err(e)
            }
        }
    }

    /// 更新筛选条件并保存
    pub async fn set_filters(&self, filters: DiscoveryFilters) {
        let (status, raw) = {
            let mut stack = lock(&self.stack);
            stack.set_filters(filters);
            (stack.status(), serde_json::to_string(stack.filters()))
        };
        match raw {
            Ok(raw) => {
                if let Err(e) = self.store.set(DISCOVERY_FILTERS_KEY, &raw).await {
                    error!("[Discovery] 保存筛选条件失败: {:#}", e);
                }
            }
            Err(e) => error!("[Discovery] 序列化筛选条件失败: {}", e),
        }
        self.listener.on_stack_changed(status).await;
    }

    /// 滑动顶部卡片
    ///
    /// 返回 None 表示当前不能滑卡（没有卡片或上一张仍在动画中）。
    pub async fn swipe(&self, direction: SwipeDirection) -> Option<SwipeReceipt> {
        let pending = lock(&self.stack).begin_swipe(direction)?;
        let candidate_id = pending.candidate.id.clone();
        let action = pending.action;
        info!(
            "[Discovery] 👉 滑卡 {} -> {}",
            candidate_id,
            action.as_str()
        );

        let remote = self.spawn_swipe_action(pending.candidate, action);

        tokio::time::sleep(self.config.advance_delay).await;

        let (entry, status) = {
            let mut stack = lock(&self.stack);
            (stack.complete_swipe(), stack.status())
        };
        if entry.is_none() {
            warn!(
                "[Discovery] 动画期间堆栈已变化，{} 的滑卡已上报但未计入本地历史",
                candidate_id
            );
        }
        self.listener.on_stack_changed(status).await;

        Some(SwipeReceipt {
            candidate_id,
            action,
            advanced: entry.is_some(),
            remote,
        })
    }

    fn spawn_swipe_action(
        &self,
        candidate: SwipeCandidate,
        action: SwipeAction,
    ) -> JoinHandle<Option<ConnectionEvent>> {
        let api = self.api.clone();
        let listener = self.listener.clone();
        let modal = self.modal.clone();
        let connections = self.connections.clone();
        let user_id = self.config.user_id.clone();
        let role = self.config.role;

        tokio::spawn(async move {
            let resp = match api.swipe_action(&candidate.id, action).await {
                Ok(resp) => resp,
                Err(e) => {
                    warn!(
                        "[Discovery] 滑卡上报失败 {} ({}): {}",
                        candidate.id,
                        action.as_str(),
                        e
                    );
                    if e.is_unauthorized() {
                        listener.on_unauthorized().await;
                    }
                    listener
                        .on_swipe_failed(candidate.id.clone(), action, e.to_string())
                        .await;
                    return None;
                }
            };

            if !resp.is_connected {
                return None;
            }

            let connection_type = resp
                .connection_type
                .as_deref()
                .map(ConnectionType::from_tag)
                .unwrap_or(ConnectionType::InstantConnection);
            let event = ConnectionEvent::new(
                connection_type,
                &user_id,
                ConnectionData {
                    partner_id: candidate.id.clone(),
                    partner_name: candidate.display_name.clone(),
                    partner_photo: candidate.photos.first().cloned(),
                    total_spent: resp.total_spent,
                    monthly_spend: resp.monthly_spend,
                },
            );
            info!(
                "[Discovery] 💞 新配对: {} ({})",
                candidate.id,
                event.connection_type.as_tag()
            );

            lock(&connections).insert(
                candidate.id.clone(),
                ExistingConnection {
                    partner_id: candidate.id.clone(),
                    has_unread_messages: false,
                    connected_at: Some(event.created_at),
                },
            );
            lock(&modal).open(event.clone(), role);
            listener.on_connection(event.clone()).await;
            Some(event)
        })
    }

    /// 撤回最近一次滑卡（只在本地生效）
    pub async fn rewind(&self) -> Option<SwipeHistoryEntry> {
        let (entry, status) = {
            let mut stack = lock(&self.stack);
            (stack.rewind(), stack.status())
        };
        match &entry {
            Some(e) => {
                info!("[Discovery] ↩️ 撤回滑卡: {}", e.candidate.id);
                self.listener.on_stack_changed(status).await;
            }
            None => debug!("[Discovery] 无可撤回的滑卡"),
        }
        entry
    }

    /// 离开发现页：清空撤回历史
    pub fn leave(&self) {
        lock(&self.stack).clear_history();
    }

    pub fn status(&self) -> StackStatus {
        lock(&self.stack).status()
    }

    pub fn top(&self) -> Option<SwipeCandidate> {
        lock(&self.stack).top().cloned()
    }

    pub fn visible_cards(&self) -> Vec<SwipeCandidate> {
        lock(&self.stack).visible_cards().to_vec()
    }

    pub fn current_index(&self) -> usize {
        lock(&self.stack).current_index()
    }

    pub fn history_len(&self) -> usize {
        lock(&self.stack).history_len()
    }

    pub fn filters(&self) -> DiscoveryFilters {
        lock(&self.stack).filters().clone()
    }

    pub fn has_existing_connection(&self, partner_id: &str) -> bool {
        lock(&self.connections).contains_key(partner_id)
    }

    pub fn existing_connections(&self) -> Vec<ExistingConnection> {
        lock(&self.connections).values().cloned().collect()
    }

    // ========== 配对弹窗 ==========

    pub fn connection_modal(&self) -> ConnectionModal {
        lock(&self.modal).clone()
    }

    pub fn dismiss_connection(&self) -> Option<ConnectionEvent> {
        lock(&self.modal).dismiss()
    }

    pub fn connection_primary_action(&self) -> Option<NavigationTarget> {
        lock(&self.modal).primary_action()
    }

    pub fn connection_secondary_action(&self) -> Option<NavigationTarget> {
        lock(&self.modal).secondary_action()
    }
}
