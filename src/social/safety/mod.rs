//! 安全/审核模块
//!
//! 屏蔽、隐藏、举报以及基于本地集合的内容过滤

pub mod api;
pub mod listener;
pub mod models;
pub mod reasons;
pub mod service;

// 重新导出主要类型
pub use api::{HttpModerationApi, ModerationApi};
pub use listener::{EmptySafetyListener, SafetyListener};
pub use models::{
    ActionReceipt, ContentItem, NotificationKind, ReportReceipt, SafetyExport,
    SafetyNotification, SafetySettings, SafetySettingsPatch,
};
pub use reasons::{lookup_reason, ReasonInfo, Severity, REASONS};
pub use service::SafetyManager;
