//! 配对弹窗模块

pub mod modal;
pub mod models;
pub mod presentation;

pub use modal::ConnectionModal;
pub use models::{
    ConnectionData, ConnectionEvent, ConnectionType, Cta, CtaAction, NavigationTarget,
    Presentation, UserRole,
};
pub use presentation::present;
