//! 安全/审核管理器
//!
//! 维护四个本地集合（屏蔽用户、隐藏内容、已举报内容、已举报创作者）和一份安全设置，
//! 与本地存储及远端审核接口保持同步，并向渲染层提供是否显示的判定函数。
//!
//! 屏蔽/举报类操作必须先得到服务端确认再修改本地状态；隐藏和设置修改只在本地生效。
//! 本地存储写入失败只记录日志并通知监听器，从不返回给调用方。

use crate::social::error::{SdkError, SdkResult};
use crate::social::safety::api::ModerationApi;
use crate::social::safety::listener::{EmptySafetyListener, SafetyListener};
use crate::social::safety::models::{
    ActionReceipt, ContentItem, ReportReceipt, SafetyExport, SafetyNotification, SafetySettings,
    SafetySettingsPatch,
};
use crate::social::safety::reasons::{
    lookup_reason, should_auto_hide, should_auto_report, validate_report_reason,
};
use crate::social::storage::{
    load_json, KeyValueStore, BLOCKED_USERS_KEY, HIDDEN_CONTENT_KEY, REPORTED_CONTENT_KEY,
    REPORTED_CREATORS_KEY, SAFETY_SETTINGS_KEY,
};
use std::collections::BTreeSet;
use std::sync::{Arc, PoisonError, RwLock, RwLockReadGuard, RwLockWriteGuard};
use tracing::{debug, error, info, warn};

#[derive(Debug, Default)]
struct SafetyState {
    blocked_users: BTreeSet<String>,
    hidden_content: BTreeSet<String>,
    reported_content: BTreeSet<String>,
    reported_creators: BTreeSet<String>,
    settings: SafetySettings,
}

/// 需要持久化的字段
#[derive(Debug, Clone, Copy)]
enum Field {
    Blocked,
    Hidden,
    ReportedContent,
    ReportedCreators,
    Settings,
}

impl Field {
    fn key(self) -> &'static str {
        match self {
            Field::Blocked => BLOCKED_USERS_KEY,
            Field::Hidden => HIDDEN_CONTENT_KEY,
            Field::ReportedContent => REPORTED_CONTENT_KEY,
            Field::ReportedCreators => REPORTED_CREATORS_KEY,
            Field::Settings => SAFETY_SETTINGS_KEY,
        }
    }

    fn snapshot(self, state: &SafetyState) -> serde_json::Result<String> {
        match self {
            Field::Blocked => serde_json::to_string(&state.blocked_users),
            Field::Hidden => serde_json::to_string(&state.hidden_content),
            Field::ReportedContent => serde_json::to_string(&state.reported_content),
            Field::ReportedCreators => serde_json::to_string(&state.reported_creators),
            Field::Settings => serde_json::to_string(&state.settings),
        }
    }
}

/// 安全管理器（每个会话构造一次，以 `Arc` 注入到各个消费方）
pub struct SafetyManager {
    store: Arc<dyn KeyValueStore>,
    api: Arc<dyn ModerationApi>,
    listener: Arc<dyn SafetyListener>,
    state: RwLock<SafetyState>,
    /// 保证"修改 + 写入存储"按顺序进行，同一个键只有一个写入者
    write_gate: tokio::sync::Mutex<()>,
}

impl SafetyManager {
    /// 从本地存储加载安全数据（使用默认空监听器）
    pub async fn load(store: Arc<dyn KeyValueStore>, api: Arc<dyn ModerationApi>) -> Self {
        Self::with_listener(store, api, Arc::new(EmptySafetyListener)).await
    }

    /// 从本地存储加载安全数据（带自定义监听器）
    pub async fn with_listener(
        store: Arc<dyn KeyValueStore>,
        api: Arc<dyn ModerationApi>,
        listener: Arc<dyn SafetyListener>,
    ) -> Self {
        let state = SafetyState {
            blocked_users: load_json(store.as_ref(), BLOCKED_USERS_KEY)
                .await
                .unwrap_or_default(),
            hidden_content: load_json(store.as_ref(), HIDDEN_CONTENT_KEY)
                .await
                .unwrap_or_default(),
            reported_content: load_json(store.as_ref(), REPORTED_CONTENT_KEY)
                .await
                .unwrap_or_default(),
            reported_creators: load_json(store.as_ref(), REPORTED_CREATORS_KEY)
                .await
                .unwrap_or_default(),
            settings: load_json(store.as_ref(), SAFETY_SETTINGS_KEY)
                .await
                .unwrap_or_default(),
        };

        info!(
            "[SafetyManager] 已加载安全数据 - 屏蔽: {}, 隐藏: {}, 已举报内容: {}, 已举报创作者: {}",
            state.blocked_users.len(),
            state.hidden_content.len(),
            state.reported_content.len(),
            state.reported_creators.len()
        );

        Self {
            store,
            api,
            listener,
            state: RwLock::new(state),
            write_gate: tokio::sync::Mutex::new(()),
        }
    }

    fn read_state(&self) -> RwLockReadGuard<'_, SafetyState> {
        self.state.read().unwrap_or_else(PoisonError::into_inner)
    }

    fn write_state(&self) -> RwLockWriteGuard<'_, SafetyState> {
        self.state.write().unwrap_or_else(PoisonError::into_inner)
    }

    /// 修改内存状态并把涉及的字段写入存储
    async fn update<R>(&self, fields: &[Field], f: impl FnOnce(&mut SafetyState) -> R) -> R {
        let _gate = self.write_gate.lock().await;

        let (result, snapshots) = {
            let mut state = self.write_state();
            let result = f(&mut state);
            let snapshots: Vec<_> = fields
                .iter()
                .map(|field| (field.key(), field.snapshot(&state)))
                .collect();
            (result, snapshots)
        };

        for (key, snapshot) in snapshots {
            match snapshot {
                Ok(value) => self.persist(key, &value).await,
                Err(e) => {
                    error!("[SafetyManager] 序列化 {} 失败: {}", key, e);
                    self.listener
                        .on_persistence_failed(key.to_string(), e.to_string())
                        .await;
                }
            }
        }
        result
    }

    async fn persist(&self, key: &str, value: &str) {
        if let Err(e) = self.store.set(key, value).await {
            error!("[SafetyManager] 写入本地存储失败 {}: {:#}", key, e);
            self.listener
                .on_persistence_failed(key.to_string(), format!("{:#}", e))
                .await;
        }
    }

    /// 成功提示，受 show_safety_notifications 控制
    async fn acknowledge(&self, notification: SafetyNotification) {
        let show = self.read_state().settings.show_safety_notifications;
        if show {
            self.listener.on_notification(notification).await;
        } else {
            debug!("[SafetyManager] 提示已关闭，跳过: {}", notification.title);
        }
    }

    /// 失败提示总是发出
    async fn report_failure(&self, title: &str, err: &SdkError) {
        self.listener
            .on_notification(SafetyNotification::error(title, err.to_string()))
            .await;
    }

    async fn reject(&self, title: &str, err: SdkError) -> SdkError {
        warn!("[SafetyManager] {}: {}", title, err);
        self.report_failure(title, &err).await;
        err
    }

    // ========== 举报 ==========

    /// 举报内容
    ///
    /// 服务端确认后才记录到已举报集合；严重原因（critical/high）在开启
    /// auto_hide_on_report 时同时隐藏该内容。
    pub async fn report_content(
        &self,
        content_id: &str,
        reason_code: &str,
        details: Option<&str>,
    ) -> SdkResult<ReportReceipt> {
        if content_id.trim().is_empty() {
            return Err(self
                .reject("Report failed", SdkError::validation("缺少内容ID"))
                .await);
        }
        let reason = match validate_report_reason(reason_code, details) {
            Ok(reason) => reason,
            Err(e) => return Err(self.reject("Report failed", e).await),
        };

        info!(
            "[SafetyManager] 🚩 举报内容 {}，原因: {}（{:?}）",
            content_id, reason.code, reason.severity
        );

        let report_id = match self
            .api
            .report_content(content_id, reason.code, details)
            .await
        {
            Ok(id) => id,
            Err(e) => {
                error!("[SafetyManager] 举报内容 {} 失败: {}", content_id, e);
                self.report_failure("Report failed", &e).await;
                return Err(e);
            }
        };

        let hidden = self
            .update(&[Field::ReportedContent, Field::Hidden], |state| {
                state.reported_content.insert(content_id.to_string());
                if state.settings.auto_hide_on_report && should_auto_hide(reason) {
                    state.hidden_content.insert(content_id.to_string());
                    true
                } else {
                    false
                }
            })
            .await;

        let message = if hidden {
            "Thanks for your report. This content has been hidden while we review it."
        } else {
            "Thanks for your report. Our moderation team will review it."
        };
        self.acknowledge(SafetyNotification::success("Content reported", message))
            .await;

        info!(
            "[SafetyManager] ✅ 举报内容完成 {}，自动隐藏: {}",
            content_id, hidden
        );
        Ok(ReportReceipt {
            success: true,
            report_id,
        })
    }

    /// 举报用户（远端接口尚未提供，见 [`ModerationApi::report_user`]）
    pub async fn report_user(
        &self,
        user_id: &str,
        reason_code: &str,
        details: Option<&str>,
    ) -> SdkResult<ActionReceipt> {
        if user_id.trim().is_empty() {
            return Err(self
                .reject("Report failed", SdkError::validation("缺少用户ID"))
                .await);
        }
        let reason = match validate_report_reason(reason_code, details) {
            Ok(reason) => reason,
            Err(e) => return Err(self.reject("Report failed", e).await),
        };

        info!(
            "[SafetyManager] 🚩 举报用户 {}，原因: {}",
            user_id, reason.code
        );

        if let Err(e) = self.api.report_user(user_id, reason.code, details).await {
            error!("[SafetyManager] 举报用户 {} 失败: {}", user_id, e);
            self.report_failure("Report failed", &e).await;
            return Err(e);
        }

        self.update(&[Field::ReportedCreators], |state| {
            state.reported_creators.insert(user_id.to_string());
        })
        .await;

        self.acknowledge(SafetyNotification::success(
            "User reported",
            "Thanks for your report. Our moderation team will review this account.",
        ))
        .await;
        Ok(ActionReceipt::ok())
    }

    // ========== 屏蔽 ==========

    /// 屏蔽用户
    ///
    /// 原因可举报且不是低严重度时，屏蔽成功后顺带举报该用户；
    /// 自动举报失败不会回滚屏蔽。
    pub async fn block_user(
        &self,
        user_id: &str,
        reason_code: Option<&str>,
        details: Option<&str>,
    ) -> SdkResult<ActionReceipt> {
        if user_id.trim().is_empty() {
            return Err(self
                .reject("Block failed", SdkError::validation("缺少用户ID"))
                .await);
        }
        let reason = match reason_code {
            Some(code) => match lookup_reason(code) {
                Some(reason) => Some(reason),
                None => {
                    return Err(self
                        .reject(
                            "Block failed",
                            SdkError::validation(format!("未知的屏蔽原因: {}", code)),
                        )
                        .await)
                }
            },
            None => None,
        };

        info!(
            "[SafetyManager] 🚫 屏蔽用户 {}，原因: {:?}",
            user_id,
            reason.map(|r| r.code)
        );

        if let Err(e) = self.api.block_user(user_id, reason.map(|r| r.code)).await {
            error!("[SafetyManager] 屏蔽用户 {} 失败: {}", user_id, e);
            self.report_failure("Block failed", &e).await;
            return Err(e);
        }

        self.update(&[Field::Blocked], |state| {
            state.blocked_users.insert(user_id.to_string());
        })
        .await;

        self.acknowledge(SafetyNotification::success(
            "User blocked",
            "You won't see this user's profile or content anymore.",
        ))
        .await;

        if let Some(reason) = reason.filter(|r| should_auto_report(r)) {
            debug!(
                "[SafetyManager] 原因 {} 需要自动举报用户 {}",
                reason.code, user_id
            );
            if let Err(e) = self.report_user(user_id, reason.code, details).await {
                warn!(
                    "[SafetyManager] 自动举报用户 {} 失败，屏蔽保持有效: {}",
                    user_id, e
                );
            }
        }

        Ok(ActionReceipt::ok())
    }

    /// 解除屏蔽
    pub async fn unblock_user(&self, user_id: &str) -> SdkResult<ActionReceipt> {
        if user_id.trim().is_empty() {
            return Err(self
                .reject("Unblock failed", SdkError::validation("缺少用户ID"))
                .await);
        }

        info!("[SafetyManager] 解除屏蔽用户 {}", user_id);

        if let Err(e) = self.api.unblock_user(user_id).await {
            error!("[SafetyManager] 解除屏蔽 {} 失败: {}", user_id, e);
            self.report_failure("Unblock failed", &e).await;
            return Err(e);
        }

        self.update(&[Field::Blocked], |state| {
            state.blocked_users.remove(user_id);
        })
        .await;

        self.acknowledge(SafetyNotification::info(
            "User unblocked",
            "This user's profile and content can appear again.",
        ))
        .await;
        Ok(ActionReceipt::ok())
    }

    // ========== 隐藏（仅本地） ==========

    pub async fn hide_content(&self, content_id: &str, reason_tag: &str) -> SdkResult<ActionReceipt> {
        if content_id.trim().is_empty() {
            return Err(self
                .reject("Hide failed", SdkError::validation("缺少内容ID"))
                .await);
        }
        debug!(
            "[SafetyManager] 隐藏内容 {}，标签: {}",
            content_id, reason_tag
        );

        self.update(&[Field::Hidden], |state| {
            state.hidden_content.insert(content_id.to_string());
        })
        .await;

        self.acknowledge(SafetyNotification::info(
            "Content hidden",
            "You won't see this content again. You can undo this in safety settings.",
        ))
        .await;
        Ok(ActionReceipt::ok())
    }

    pub async fn unhide_content(&self, content_id: &str) -> SdkResult<ActionReceipt> {
        if content_id.trim().is_empty() {
            return Err(self
                .reject("Restore failed", SdkError::validation("缺少内容ID"))
                .await);
        }

        self.update(&[Field::Hidden], |state| {
            state.hidden_content.remove(content_id);
        })
        .await;

        self.acknowledge(SafetyNotification::info(
            "Content restored",
            "This content can appear in your feed again.",
        ))
        .await;
        Ok(ActionReceipt::ok())
    }

    // ========== 过滤判定 ==========

    /// 内容是否应被过滤（纯判定，无副作用）
    pub fn should_filter_content(&self, item: &ContentItem) -> bool {
        let state = self.read_state();

        if state.hidden_content.contains(&item.id) {
            return true;
        }
        if state.settings.hide_reported_content && state.reported_content.contains(&item.id) {
            return true;
        }
        if let Some(creator_id) = item.creator_id.as_deref() {
            if state.blocked_users.contains(creator_id)
                || state.reported_creators.contains(creator_id)
            {
                return true;
            }
        }
        if state.settings.filter_explicit && item.is_explicit {
            return true;
        }
        fails_creator_settings(&state.settings, item.creator_verified, item.creator_age)
    }

    /// 创作者（如发现页候选人）是否应被过滤
    pub fn should_filter_creator(
        &self,
        creator_id: &str,
        verified: bool,
        age: Option<u32>,
    ) -> bool {
        let state = self.read_state();
        state.blocked_users.contains(creator_id)
            || state.reported_creators.contains(creator_id)
            || fails_creator_settings(&state.settings, verified, age)
    }

    /// 过滤内容列表，只保留可以显示的条目
    pub fn filter_content(&self, items: Vec<ContentItem>) -> Vec<ContentItem> {
        items
            .into_iter()
            .filter(|item| !self.should_filter_content(item))
            .collect()
    }

    // ========== 设置 ==========

    pub fn safety_settings(&self) -> SafetySettings {
        self.read_state().settings.clone()
    }

    pub async fn update_safety_settings(&self, patch: SafetySettingsPatch) -> SafetySettings {
        let settings = self
            .update(&[Field::Settings], |state| {
                state.settings = state.settings.merged(&patch);
                state.settings.clone()
            })
            .await;
        info!("[SafetyManager] 安全设置已更新: {:?}", settings);

        self.acknowledge(SafetyNotification::success(
            "Safety settings updated",
            "Your preferences have been saved.",
        ))
        .await;
        settings
    }

    pub async fn reset_safety_settings(&self) -> SafetySettings {
        let settings = self
            .update(&[Field::Settings], |state| {
                state.settings = SafetySettings::default();
                state.settings.clone()
            })
            .await;
        info!("[SafetyManager] 安全设置已恢复默认");

        self.acknowledge(SafetyNotification::info(
            "Safety settings reset",
            "All safety preferences are back to their defaults.",
        ))
        .await;
        settings
    }

    // ========== 查询 ==========

    pub fn is_user_blocked(&self, user_id: &str) -> bool {
        self.read_state().blocked_users.contains(user_id)
    }

    pub fn is_content_hidden(&self, content_id: &str) -> bool {
        self.read_state().hidden_content.contains(content_id)
    }

    pub fn is_content_reported(&self, content_id: &str) -> bool {
        self.read_state().reported_content.contains(content_id)
    }

    pub fn is_creator_reported(&self, creator_id: &str) -> bool {
        self.read_state().reported_creators.contains(creator_id)
    }

    pub fn get_blocked_users(&self) -> Vec<String> {
        self.read_state().blocked_users.iter().cloned().collect()
    }

    pub fn get_hidden_content(&self) -> Vec<String> {
        self.read_state().hidden_content.iter().cloned().collect()
    }

    /// 导出全部安全数据（用于用户数据导出）
    pub fn export_safety_data(&self) -> SafetyExport {
        let state = self.read_state();
        SafetyExport {
            blocked_users: state.blocked_users.iter().cloned().collect(),
            hidden_content: state.hidden_content.iter().cloned().collect(),
            reported_content: state.reported_content.iter().cloned().collect(),
            reported_creators: state.reported_creators.iter().cloned().collect(),
            safety_settings: state.settings.clone(),
            exported_at: chrono::Utc::now(),
        }
    }
}

fn fails_creator_settings(settings: &SafetySettings, verified: bool, age: Option<u32>) -> bool {
    if settings.verified_only && !verified {
        return true;
    }
    matches!(age, Some(age) if age < settings.min_creator_age)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::social::safety::models::NotificationKind;
    use crate::social::storage::MemoryStore;
    use async_trait::async_trait;
    use std::sync::atomic::{AtomicBool, Ordering};
    use std::sync::Mutex;

    #[derive(Default)]
    struct FakeModerationApi {
        calls: Mutex<Vec<String>>,
        fail_remote: AtomicBool,
        fail_report_user: AtomicBool,
    }

    impl FakeModerationApi {
        fn calls(&self) -> Vec<String> {
            self.calls.lock().unwrap().clone()
        }

        fn record(&self, call: String) -> SdkResult<()> {
            self.calls.lock().unwrap().push(call);
            if self.fail_remote.load(Ordering::SeqCst) {
                return Err(SdkError::Remote {
                    status: Some(503),
                    message: "unavailable".to_string(),
                });
            }
            Ok(())
        }
    }

    #[async_trait]
    impl ModerationApi for FakeModerationApi {
        async fn report_content(
            &self,
            content_id: &str,
            reason: &str,
            _details: Option<&str>,
        ) -> SdkResult<Option<String>> {
            self.record(format!("report_content:{}:{}", content_id, reason))?;
            Ok(Some(format!("rpt-{}", content_id)))
        }

        async fn report_user(
            &self,
            user_id: &str,
            reason: &str,
            _details: Option<&str>,
        ) -> SdkResult<()> {
            self.record(format!("report_user:{}:{}", user_id, reason))?;
            if self.fail_report_user.load(Ordering::SeqCst) {
                return Err(SdkError::Remote {
                    status: Some(500),
                    message: "report failed".to_string(),
                });
            }
            Ok(())
        }

        async fn block_user(&self, user_id: &str, _reason: Option<&str>) -> SdkResult<()> {
            self.record(format!("block:{}", user_id))
        }

        async fn unblock_user(&self, user_id: &str) -> SdkResult<()> {
            self.record(format!("unblock:{}", user_id))
        }
    }

    #[derive(Default)]
    struct RecordingListener {
        notifications: Mutex<Vec<SafetyNotification>>,
        persistence_failures: Mutex<Vec<String>>,
    }

    #[async_trait]
    impl SafetyListener for RecordingListener {
        async fn on_notification(&self, notification: SafetyNotification) {
            self.notifications.lock().unwrap().push(notification);
        }

        async fn on_persistence_failed(&self, key: String, _error: String) {
            self.persistence_failures.lock().unwrap().push(key);
        }
    }

    struct BrokenStore;

    #[async_trait]
    impl KeyValueStore for BrokenStore {
        async fn get(&self, _key: &str) -> anyhow::Result<Option<String>> {
            Ok(None)
        }

        async fn set(&self, _key: &str, _value: &str) -> anyhow::Result<()> {
            Err(anyhow::anyhow!("disk full"))
        }
    }

    struct Harness {
        manager: SafetyManager,
        api: Arc<FakeModerationApi>,
        listener: Arc<RecordingListener>,
        store: Arc<MemoryStore>,
    }

    async fn harness() -> Harness {
        crate::social::init_test_logger();
        let store = Arc::new(MemoryStore::new());
        let api = Arc::new(FakeModerationApi::default());
        let listener = Arc::new(RecordingListener::default());
        let manager =
            SafetyManager::with_listener(store.clone(), api.clone(), listener.clone()).await;
        Harness {
            manager,
            api,
            listener,
            store,
        }
    }

    fn content(id: &str, creator: &str) -> ContentItem {
        ContentItem {
            id: id.to_string(),
            creator_id: Some(creator.to_string()),
            creator_verified: true,
            ..Default::default()
        }
    }

    #[tokio::test]
    async fn blocked_creator_content_is_filtered() -> SdkResult<()> {
        let h = harness().await;
        let item = content("post-1", "creator-9");
        assert!(!h.manager.should_filter_content(&item));

        h.manager.block_user("creator-9", None, None).await?;

        assert!(h.manager.should_filter_content(&item));
        assert!(h.manager.should_filter_creator("creator-9", true, None));
        Ok(())
    }

    #[tokio::test]
    async fn hidden_content_is_filtered_regardless_of_settings() -> SdkResult<()> {
        let h = harness().await;
        h.manager
            .update_safety_settings(SafetySettingsPatch {
                hide_reported_content: Some(false),
                verified_only: Some(false),
                filter_explicit: Some(false),
                min_creator_age: Some(0),
                ..Default::default()
            })
            .await;

        h.manager.hide_content("post-2", "not_for_me").await?;

        assert!(h.manager.should_filter_content(&content("post-2", "creator-1")));
        assert!(h.manager.is_content_hidden("post-2"));
        assert!(h.api.calls().is_empty());
        Ok(())
    }

    #[tokio::test]
    async fn severe_reports_also_hide_content() -> SdkResult<()> {
        let h = harness().await;

        let receipt = h.manager.report_content("c-crit", "underage", None).await?;
        assert!(receipt.success);
        assert_eq!(receipt.report_id.as_deref(), Some("rpt-c-crit"));
        h.manager.report_content("c-high", "harassment", None).await?;

        for id in ["c-crit", "c-high"] {
            assert!(h.manager.is_content_reported(id));
            assert!(h.manager.is_content_hidden(id));
        }
        Ok(())
    }

    #[tokio::test]
    async fn mild_reports_only_mark_reported() -> SdkResult<()> {
        let h = harness().await;

        h.manager
            .report_content("c-med", "inappropriate_content", None)
            .await?;
        h.manager.report_content("c-low", "spam", None).await?;

        for id in ["c-med", "c-low"] {
            assert!(h.manager.is_content_reported(id));
            assert!(!h.manager.is_content_hidden(id));
        }
        Ok(())
    }

    #[tokio::test]
    async fn reported_content_filtering_follows_setting() -> SdkResult<()> {
        let h = harness().await;
        h.manager.report_content("c-1", "spam", None).await?;
        let item = content("c-1", "creator-1");

        assert!(h.manager.should_filter_content(&item));

        h.manager
            .update_safety_settings(SafetySettingsPatch {
                hide_reported_content: Some(false),
                ..Default::default()
            })
            .await;
        assert!(!h.manager.should_filter_content(&item));
        Ok(())
    }

    #[tokio::test]
    async fn missing_required_details_never_reaches_the_api() {
        let h = harness().await;

        let res = h.manager.report_content("c-1", "copyright", None).await;

        assert!(matches!(res, Err(SdkError::Validation(_))));
        assert!(h.api.calls().is_empty());
        assert!(!h.manager.is_content_reported("c-1"));
        let notes = h.listener.notifications.lock().unwrap();
        assert_eq!(notes.last().map(|n| n.kind), Some(NotificationKind::Error));
    }

    #[tokio::test]
    async fn empty_hide_target_notifies_failure() {
        let h = harness().await;

        let hide = h.manager.hide_content("  ", "manual").await;
        let unhide = h.manager.unhide_content("").await;

        assert!(matches!(hide, Err(SdkError::Validation(_))));
        assert!(matches!(unhide, Err(SdkError::Validation(_))));
        assert!(h.manager.get_hidden_content().is_empty());
        let notes = h.listener.notifications.lock().unwrap();
        assert_eq!(notes.len(), 2);
        assert!(notes.iter().all(|n| n.kind == NotificationKind::Error));
    }

    #[tokio::test]
    async fn remote_failure_leaves_state_untouched() {
        let h = harness().await;
        h.api.fail_remote.store(true, Ordering::SeqCst);

        assert!(h.manager.report_content("c-1", "underage", None).await.is_err());
        assert!(h.manager.block_user("u-1", None, None).await.is_err());

        assert!(!h.manager.is_content_reported("c-1"));
        assert!(!h.manager.is_content_hidden("c-1"));
        assert!(!h.manager.is_user_blocked("u-1"));
        assert_eq!(h.store.get(BLOCKED_USERS_KEY).await.unwrap(), None);
    }

    #[tokio::test]
    async fn block_then_unblock_restores_state() -> SdkResult<()> {
        let h = harness().await;

        h.manager.block_user("u-1", None, None).await?;
        assert!(h.manager.is_user_blocked("u-1"));
        h.manager.unblock_user("u-1").await?;

        assert!(!h.manager.is_user_blocked("u-1"));
        assert!(h.manager.get_blocked_users().is_empty());
        assert_eq!(h.api.calls(), vec!["block:u-1", "unblock:u-1"]);
        Ok(())
    }

    #[tokio::test]
    async fn serious_block_reason_auto_reports_user() -> SdkResult<()> {
        let h = harness().await;

        h.manager.block_user("u-1", Some("harassment"), None).await?;
        h.manager.block_user("u-2", Some("spam"), None).await?;
        h.manager.block_user("u-3", Some("not_interested"), None).await?;

        assert_eq!(
            h.api.calls(),
            vec![
                "block:u-1",
                "report_user:u-1:harassment",
                "block:u-2",
                "block:u-3"
            ]
        );
        assert!(h.manager.is_creator_reported("u-1"));
        assert!(!h.manager.is_creator_reported("u-2"));
        Ok(())
    }

    #[tokio::test]
    async fn failed_auto_report_keeps_block() -> SdkResult<()> {
        let h = harness().await;
        h.api.fail_report_user.store(true, Ordering::SeqCst);

        let receipt = h.manager.block_user("u-1", Some("scam_fraud"), None).await?;

        assert!(receipt.success);
        assert!(h.manager.is_user_blocked("u-1"));
        assert!(!h.manager.is_creator_reported("u-1"));
        Ok(())
    }

    #[tokio::test]
    async fn unknown_block_reason_is_rejected_locally() {
        let h = harness().await;
        let res = h.manager.block_user("u-1", Some("because"), None).await;
        assert!(matches!(res, Err(SdkError::Validation(_))));
        assert!(h.api.calls().is_empty());
    }

    #[tokio::test]
    async fn settings_filters_apply_to_content() -> SdkResult<()> {
        let h = harness().await;
        h.manager
            .update_safety_settings(SafetySettingsPatch {
                filter_explicit: Some(true),
                verified_only: Some(true),
                min_creator_age: Some(21),
                ..Default::default()
            })
            .await;

        let explicit = ContentItem {
            is_explicit: true,
            ..content("c-1", "cr-1")
        };
        let unverified = ContentItem {
            creator_verified: false,
            ..content("c-2", "cr-2")
        };
        let young = ContentItem {
            creator_age: Some(19),
            ..content("c-3", "cr-3")
        };
        let fine = ContentItem {
            creator_age: Some(30),
            ..content("c-4", "cr-4")
        };

        let kept = h
            .manager
            .filter_content(vec![explicit, unverified, young, fine]);
        assert_eq!(kept.len(), 1);
        assert_eq!(kept[0].id, "c-4");

        let reset = h.manager.reset_safety_settings().await;
        assert_eq!(reset, SafetySettings::default());
        Ok(())
    }

    #[tokio::test]
    async fn export_matches_current_sets() -> SdkResult<()> {
        let h = harness().await;
        h.manager.block_user("u-2", None, None).await?;
        h.manager.block_user("u-1", None, None).await?;
        h.manager.hide_content("c-9", "manual").await?;
        h.manager.report_content("c-5", "spam", None).await?;

        let export = h.manager.export_safety_data();

        assert_eq!(export.blocked_users, vec!["u-1", "u-2"]);
        assert_eq!(export.hidden_content, vec!["c-9"]);
        assert_eq!(export.reported_content, vec!["c-5"]);
        assert_eq!(export.safety_settings, h.manager.safety_settings());

        let json = serde_json::to_value(&export).unwrap();
        let stamp = json["exportedAt"].as_str().unwrap();
        assert!(chrono::DateTime::parse_from_rfc3339(stamp).is_ok());
        Ok(())
    }

    #[tokio::test]
    async fn state_survives_reload_from_store() -> SdkResult<()> {
        let h = harness().await;
        h.manager.block_user("u-1", None, None).await?;
        h.manager.hide_content("c-1", "manual").await?;
        h.manager
            .update_safety_settings(SafetySettingsPatch {
                verified_only: Some(true),
                ..Default::default()
            })
            .await;

        let reloaded = SafetyManager::load(h.store.clone(), h.api.clone()).await;

        assert!(reloaded.is_user_blocked("u-1"));
        assert!(reloaded.is_content_hidden("c-1"));
        assert!(reloaded.safety_settings().verified_only);
        Ok(())
    }

    #[tokio::test]
    async fn corrupt_storage_loads_defaults() {
        let store = Arc::new(MemoryStore::new());
        store.set(BLOCKED_USERS_KEY, "{{{").await.unwrap();
        store.set(SAFETY_SETTINGS_KEY, "nope").await.unwrap();

        let manager = SafetyManager::load(store, Arc::new(FakeModerationApi::default())).await;

        assert!(manager.get_blocked_users().is_empty());
        assert_eq!(manager.safety_settings(), SafetySettings::default());
    }

    #[tokio::test]
    async fn storage_failures_are_swallowed_and_reported() -> SdkResult<()> {
        let listener = Arc::new(RecordingListener::default());
        let manager = SafetyManager::with_listener(
            Arc::new(BrokenStore),
            Arc::new(FakeModerationApi::default()),
            listener.clone(),
        )
        .await;

        manager.hide_content("c-1", "manual").await?;
        manager.block_user("u-1", None, None).await?;

        assert!(manager.is_content_hidden("c-1"));
        assert!(manager.is_user_blocked("u-1"));
        let failures = listener.persistence_failures.lock().unwrap().clone();
        assert_eq!(failures, vec![HIDDEN_CONTENT_KEY, BLOCKED_USERS_KEY]);
        Ok(())
    }

    #[tokio::test]
    async fn muted_notifications_still_apply_changes() -> SdkResult<()> {
        let h = harness().await;
        h.manager
            .update_safety_settings(SafetySettingsPatch {
                show_safety_notifications: Some(false),
                ..Default::default()
            })
            .await;
        let before = h.listener.notifications.lock().unwrap().len();

        h.manager.hide_content("c-1", "manual").await?;
        h.manager.block_user("u-1", None, None).await?;

        assert_eq!(h.listener.notifications.lock().unwrap().len(), before);
        assert!(h.manager.is_content_hidden("c-1"));
        assert!(h.manager.is_user_blocked("u-1"));
        Ok(())
    }
}
