pub mod social;

// 重新导出常用类型和函数，方便外部使用
pub use social::{
    client::{ApiClient, ClientConfig, SwipeHubClient},
    connection::{ConnectionEvent, ConnectionModal, ConnectionType, UserRole},
    discovery::{DiscoveryController, DiscoveryFilters, StackStatus, SwipeDirection},
    login_async,
    safety::{SafetyManager, SafetySettings},
    storage::{KeyValueStore, MemoryStore, SqliteStore},
    SdkError, SdkResult,
};
