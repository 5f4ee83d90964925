//! 发现页（滑卡）模块

pub mod api;
pub mod filters;
pub mod listener;
pub mod models;
pub mod service;
pub mod stack;

// 重新导出主要类型
pub use api::{DiscoveryApi, HttpDiscoveryApi};
pub use filters::{apply_filters, matches_filters};
pub use listener::{DiscoveryListener, EmptyDiscoveryListener};
pub use models::{
    AgeRange, DiscoveryFilters, EmptyReason, ExistingConnection, PendingSwipe, StackStatus,
    SwipeAction, SwipeCandidate, SwipeDirection, SwipeHistoryEntry, SwipeResponse,
};
pub use service::{DiscoveryConfig, DiscoveryController, SwipeReceipt};
pub use stack::{SwipeStack, VISIBLE_CARDS};
