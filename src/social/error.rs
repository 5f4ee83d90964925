//! SDK 统一错误类型
//!
//! 对应前端的四类错误：校验错误、未授权、远端失败，以及只记录日志的静默降级
//! （静默降级不会以错误形式返回给调用方，所以这里没有对应变体）。

use thiserror::Error;

#[derive(Error, Debug)]
pub enum SdkError {
    /// 本地校验失败（缺少举报原因、缺少必填说明等），不会发起网络请求
    #[error("校验失败: {0}")]
    Validation(String),

    /// 服务端返回 401，调用方应跳转登录
    #[error("未授权，请重新登录")]
    Unauthorized,

    /// 非 2xx 响应，或响应体中 success=false
    #[error("服务器错误 {status:?}: {message}")]
    Remote {
        status: Option<u16>,
        message: String,
    },

    #[error("请求失败: {0}")]
    Network(#[from] reqwest::Error),

    #[error("反序列化响应失败: {0}")]
    Decode(#[from] serde_json::Error),

    #[error("无效的请求地址: {0}")]
    InvalidUrl(String),

    /// 本地存储读写失败
    #[error("本地存储错误: {0}")]
    Storage(String),
}

impl SdkError {
    pub fn is_unauthorized(&self) -> bool {
        matches!(self, SdkError::Unauthorized)
    }

    pub(crate) fn validation(msg: impl Into<String>) -> Self {
        SdkError::Validation(msg.into())
    }
}

pub type SdkResult<T> = std::result::Result<T, SdkError>;
