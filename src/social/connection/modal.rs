//! 配对弹窗状态
//!
//! 默认不自动关闭：弹窗保持打开直到用户关闭或点击按钮跳转。

use crate::social::connection::models::{
    ConnectionEvent, CtaAction, NavigationTarget, Presentation, UserRole,
};
use crate::social::connection::presentation::present;
use std::time::{Duration, Instant};
use tracing::{debug, info};

#[derive(Debug, Clone)]
struct OpenModal {
    event: ConnectionEvent,
    presentation: Presentation,
    opened_at: Instant,
}

#[derive(Debug, Clone, Default)]
pub struct ConnectionModal {
    open: Option<OpenModal>,
    auto_dismiss_after: Option<Duration>,
}

impl ConnectionModal {
    pub fn new() -> Self {
        Self::default()
    }

    /// 打开后超过 `after` 自动关闭（由 [`ConnectionModal::tick`] 驱动）
    pub fn with_auto_dismiss(after: Duration) -> Self {
        Self {
            open: None,
            auto_dismiss_after: Some(after),
        }
    }

    /// 展示一次配对；已有弹窗时以最新的配对替换
    pub fn open(&mut self, event: ConnectionEvent, role: UserRole) -> &Presentation {
        if let Some(prev) = &self.open {
            debug!(
                "[ConnectionModal] 替换未关闭的配对弹窗: {}",
                prev.event.partner_id()
            );
        }
        let presentation = present(&event.connection_type, &event.data, role);
        info!(
            "[ConnectionModal] 💞 展示配对弹窗: {} ({})",
            event.partner_id(),
            event.connection_type.as_tag()
        );
        let opened = self.open.insert(OpenModal {
            event,
            presentation,
            opened_at: Instant::now(),
        });
        &opened.presentation
    }

    pub fn is_visible(&self) -> bool {
        self.open.is_some()
    }

    pub fn event(&self) -> Option<&ConnectionEvent> {
        self.open.as_ref().map(|m| &m.event)
    }

    pub fn presentation(&self) -> Option<&Presentation> {
        self.open.as_ref().map(|m| &m.presentation)
    }

    /// 关闭弹窗，返回被关闭的配对
    pub fn dismiss(&mut self) -> Option<ConnectionEvent> {
        self.open.take().map(|m| m.event)
    }

    /// 点击主按钮：关闭弹窗并返回跳转目标
    pub fn primary_action(&mut self) -> Option<NavigationTarget> {
        let open = self.open.take()?;
        Some(navigate(open.presentation.primary_cta.action, &open.event))
    }

    /// 点击次按钮：关闭弹窗并返回跳转目标
    pub fn secondary_action(&mut self) -> Option<NavigationTarget> {
        let action = self.open.as_ref()?.presentation.secondary_cta.as_ref()?.action;
        let open = self.open.take()?;
        Some(navigate(action, &open.event))
    }

    /// 检查自动关闭，返回本次是否关闭了弹窗
    pub fn tick(&mut self, now: Instant) -> bool {
        let Some(after) = self.auto_dismiss_after else {
            return false;
        };
        let expired = self
            .open
            .as_ref()
            .is_some_and(|m| now.saturating_duration_since(m.opened_at) >= after);
        if expired {
            self.open = None;
        }
        expired
    }
}

fn navigate(action: CtaAction, event: &ConnectionEvent) -> NavigationTarget {
    let user_id = event.partner_id().to_string();
    match action {
        CtaAction::OpenChat => NavigationTarget::Chat { user_id },
        CtaAction::ViewProfile => NavigationTarget::Profile { user_id },
        CtaAction::KeepSwiping => NavigationTarget::Discovery,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::social::connection::models::{ConnectionData, ConnectionType};

    fn event(kind: ConnectionType) -> ConnectionEvent {
        ConnectionEvent::new(
            kind,
            "me",
            ConnectionData {
                partner_id: "creator-3".to_string(),
                partner_name: "Ava".to_string(),
                ..Default::default()
            },
        )
    }

    #[test]
    fn stays_open_without_auto_dismiss() {
        let mut modal = ConnectionModal::new();
        modal.open(event(ConnectionType::InstantConnection), UserRole::Member);

        assert!(!modal.tick(Instant::now() + Duration::from_secs(3600)));
        assert!(modal.is_visible());
    }

    #[test]
    fn auto_dismiss_closes_after_deadline() {
        let mut modal = ConnectionModal::with_auto_dismiss(Duration::from_secs(5));
        modal.open(event(ConnectionType::InstantConnection), UserRole::Member);

        assert!(!modal.tick(Instant::now()));
        assert!(modal.tick(Instant::now() + Duration::from_secs(6)));
        assert!(!modal.is_visible());
    }

    #[test]
    fn primary_cta_routes_to_chat_and_closes() {
        let mut modal = ConnectionModal::new();
        modal.open(event(ConnectionType::InstantConnection), UserRole::Member);

        assert_eq!(
            modal.primary_action(),
            Some(NavigationTarget::Chat {
                user_id: "creator-3".to_string()
            })
        );
        assert!(!modal.is_visible());
        assert_eq!(modal.primary_action(), None);
    }

    #[test]
    fn secondary_cta_routes_to_profile() {
        let mut modal = ConnectionModal::new();
        modal.open(event(ConnectionType::MutualInterest), UserRole::Member);

        assert_eq!(
            modal.secondary_action(),
            Some(NavigationTarget::Profile {
                user_id: "creator-3".to_string()
            })
        );
    }

    #[test]
    fn dismiss_returns_event() {
        let mut modal = ConnectionModal::new();
        modal.open(event(ConnectionType::SuperLikeMatch), UserRole::Member);
        let closed = modal.dismiss().unwrap();
        assert_eq!(closed.connection_type, ConnectionType::SuperLikeMatch);
        assert!(modal.dismiss().is_none());
    }
}
