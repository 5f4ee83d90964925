pub mod auth;
pub mod client;
pub mod connection;
pub mod discovery;
pub mod error;
pub mod safety;
pub mod storage;
pub mod types;

// 重新导出认证相关函数
pub use auth::login_async;

// 重新导出错误类型
pub use error::{SdkError, SdkResult};

/// 测试日志（只初始化一次，输出交给测试框架捕获）
#[cfg(test)]
pub(crate) fn init_test_logger() {
    use std::sync::Once;
    use tracing_subscriber::EnvFilter;

    static INIT: Once = Once::new();
    INIT.call_once(|| {
        let _ = tracing_subscriber::fmt()
            .with_env_filter(
                EnvFilter::try_from_default_env()
                    .unwrap_or_else(|_| EnvFilter::new("swipehub_sdk_core_rust=debug")),
            )
            .with_test_writer()
            .try_init();
    });
}
