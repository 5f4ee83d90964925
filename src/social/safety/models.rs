//! 安全模块本地模型定义

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// 安全设置（持久化为 JSON 对象，缺失字段使用默认值）
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct SafetySettings {
    /// 隐藏已举报的内容
    pub hide_reported_content: bool,
    /// 只显示已认证创作者
    pub verified_only: bool,
    /// 过滤露骨内容
    pub filter_explicit: bool,
    /// 创作者最低年龄
    pub min_creator_age: u32,
    /// 严重举报提交后自动隐藏
    pub auto_hide_on_report: bool,
    pub allow_direct_messages: bool,
    pub require_connection_for_messages: bool,
    /// 显示安全操作的提示通知
    pub show_safety_notifications: bool,
}

impl Default for SafetySettings {
    fn default() -> Self {
        Self {
            hide_reported_content: true,
            verified_only: false,
            filter_explicit: false,
            min_creator_age: 18,
            auto_hide_on_report: true,
            allow_direct_messages: true,
            require_connection_for_messages: false,
            show_safety_notifications: true,
        }
    }
}

/// 安全设置的部分更新
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SafetySettingsPatch {
    pub hide_reported_content: Option<bool>,
    pub verified_only: Option<bool>,
    pub filter_explicit: Option<bool>,
    pub min_creator_age: Option<u32>,
    pub auto_hide_on_report: Option<bool>,
    pub allow_direct_messages: Option<bool>,
    pub require_connection_for_messages: Option<bool>,
    pub show_safety_notifications: Option<bool>,
}

impl SafetySettings {
    /// 合并部分更新，未设置的字段保持原值
    pub fn merged(&self, patch: &SafetySettingsPatch) -> Self {
        Self {
            hide_reported_content: patch
                .hide_reported_content
                .unwrap_or(self.hide_reported_content),
            verified_only: patch.verified_only.unwrap_or(self.verified_only),
            filter_explicit: patch.filter_explicit.unwrap_or(self.filter_explicit),
            min_creator_age: patch.min_creator_age.unwrap_or(self.min_creator_age),
            auto_hide_on_report: patch.auto_hide_on_report.unwrap_or(self.auto_hide_on_report),
            allow_direct_messages: patch
                .allow_direct_messages
                .unwrap_or(self.allow_direct_messages),
            require_connection_for_messages: patch
                .require_connection_for_messages
                .unwrap_or(self.require_connection_for_messages),
            show_safety_notifications: patch
                .show_safety_notifications
                .unwrap_or(self.show_safety_notifications),
        }
    }
}

/// 待判定是否显示的内容
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ContentItem {
    pub id: String,
    #[serde(rename = "creatorID", default)]
    pub creator_id: Option<String>,
    #[serde(default)]
    pub is_explicit: bool,
    #[serde(default)]
    pub creator_verified: bool,
    #[serde(default)]
    pub creator_age: Option<u32>,
}

/// 举报提交结果
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ReportReceipt {
    pub success: bool,
    #[serde(rename = "reportID")]
    pub report_id: Option<String>,
}

/// 屏蔽/解除屏蔽/隐藏等操作结果
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct ActionReceipt {
    pub success: bool,
}

impl ActionReceipt {
    pub fn ok() -> Self {
        Self { success: true }
    }
}

/// 安全数据导出快照
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SafetyExport {
    pub blocked_users: Vec<String>,
    pub hidden_content: Vec<String>,
    pub reported_content: Vec<String>,
    pub reported_creators: Vec<String>,
    pub safety_settings: SafetySettings,
    pub exported_at: DateTime<Utc>,
}

/// 通知类别
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum NotificationKind {
    Success,
    Info,
    Error,
}

/// 安全操作后的提示通知
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SafetyNotification {
    pub kind: NotificationKind,
    pub title: String,
    pub message: String,
}

impl SafetyNotification {
    pub fn success(title: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            kind: NotificationKind::Success,
            title: title.into(),
            message: message.into(),
        }
    }

    pub fn info(title: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            kind: NotificationKind::Info,
            title: title.into(),
            message: message.into(),
        }
    }

    pub fn error(title: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            kind: NotificationKind::Error,
            title: title.into(),
            message: message.into(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn partial_settings_load_with_defaults() {
        let s: SafetySettings = serde_json::from_str(r#"{"verifiedOnly":true}"#).unwrap();
        assert!(s.verified_only);
        assert!(s.hide_reported_content);
        assert_eq!(s.min_creator_age, 18);
    }

    #[test]
    fn merge_only_touches_patched_fields() {
        let base = SafetySettings::default();
        let patch = SafetySettingsPatch {
            filter_explicit: Some(true),
            min_creator_age: Some(21),
            ..Default::default()
        };
        let merged = base.merged(&patch);
        assert!(merged.filter_explicit);
        assert_eq!(merged.min_creator_age, 21);
        assert_eq!(merged.verified_only, base.verified_only);
        assert_eq!(merged.show_safety_notifications, base.show_safety_notifications);
    }
}
