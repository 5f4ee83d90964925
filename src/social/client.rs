//! SwipeHub 客户端核心实现模块
//!
//! 包含客户端配置、共享 HTTP 客户端，以及把存储、安全管理器和发现页控制器组装在一起的会话根对象。

use crate::social::connection::UserRole;
use crate::social::discovery::{
    DiscoveryApi, DiscoveryConfig, DiscoveryController, DiscoveryListener, EmptyDiscoveryListener,
    HttpDiscoveryApi,
};
use crate::social::error::{SdkError, SdkResult};
use crate::social::safety::{
    EmptySafetyListener, HttpModerationApi, ModerationApi, SafetyListener, SafetyManager,
};
use crate::social::storage::{KeyValueStore, SqliteStore};
use crate::social::types::handle_http_response;
use reqwest::header::{HeaderMap, HeaderValue, AUTHORIZATION};
use reqwest::{Method, Url};
use serde::de::DeserializeOwned;
use serde::Serialize;
use std::sync::Arc;
use std::time::Duration;
use tracing::{debug, info};
use uuid::Uuid;

/// 客户端配置
#[derive(Clone, Debug)]
pub struct ClientConfig {
    /// 用户 ID
    pub user_id: String,
    /// 认证 token（Bearer）
    pub token: String,
    pub role: UserRole,
    /// HTTP API 基础地址
    pub api_base_url: String,
    /// 本地 SQLite 数据库 URL
    ///
    /// 例如：`sqlite://swipehub.db?mode=rwc`
    pub db_url: String,
    /// 滑卡动画时长
    pub swipe_advance_delay: Duration,
    /// 可撤回步数
    pub max_rewind_depth: usize,
}

impl ClientConfig {
    /// 创建默认配置
    pub fn new(user_id: String, token: String, role: UserRole) -> Self {
        Self {
            user_id,
            token,
            role,
            api_base_url: "http://localhost:3000/api".to_string(),
            db_url: "sqlite://swipehub.db?mode=rwc".to_string(),
            swipe_advance_delay: Duration::from_millis(300),
            max_rewind_depth: 1,
        }
    }

    /// 用环境变量覆盖部署相关配置
    pub fn from_env(mut self) -> Self {
        if let Ok(url) = std::env::var("SWIPEHUB_API_BASE_URL") {
            if !url.trim().is_empty() {
                self.api_base_url = url;
            }
        }
        if let Ok(url) = std::env::var("SWIPEHUB_DB_URL") {
            if !url.trim().is_empty() {
                self.db_url = url;
            }
        }
        self
    }

    fn discovery_config(&self) -> DiscoveryConfig {
        DiscoveryConfig {
            user_id: self.user_id.clone(),
            role: self.role,
            advance_delay: self.swipe_advance_delay,
            max_rewind_depth: self.max_rewind_depth,
        }
    }
}

/// 共享 HTTP 客户端
///
/// token 通过 default_headers 自动添加，每个请求带独立的 operationID
pub struct ApiClient {
    http: reqwest::Client,
    base_url: Url,
}

impl ApiClient {
    pub fn new(api_base_url: &str, token: &str) -> SdkResult<Self> {
        let mut headers = HeaderMap::new();
        headers.insert(
            AUTHORIZATION,
            HeaderValue::from_str(&format!("Bearer {}", token))
                .map_err(|_| SdkError::validation("无效的 token"))?,
        );
        let http = reqwest::ClientBuilder::new()
            .default_headers(headers)
            .build()?;
        Self::from_parts(http, api_base_url)
    }

    /// 使用外部配置好的 reqwest 客户端
    pub fn from_parts(http: reqwest::Client, api_base_url: &str) -> SdkResult<Self> {
        let base_url = Url::parse(api_base_url)
            .map_err(|e| SdkError::InvalidUrl(format!("{}: {}", api_base_url, e)))?;
        if base_url.cannot_be_a_base() {
            return Err(SdkError::InvalidUrl(api_base_url.to_string()));
        }
        Ok(Self { http, base_url })
    }

    pub fn base_url(&self) -> &Url {
        &self.base_url
    }

    /// 拼接请求地址，每个片段单独做百分号编码
    pub fn endpoint(&self, segments: &[&str]) -> SdkResult<Url> {
        let mut url = self.base_url.clone();
        url.path_segments_mut()
            .map_err(|_| SdkError::InvalidUrl(self.base_url.to_string()))?
            .pop_if_empty()
            .extend(segments);
        Ok(url)
    }

    async fn send<B, T>(
        &self,
        method: Method,
        segments: &[&str],
        body: Option<&B>,
        operation_name: &str,
    ) -> SdkResult<Option<T>>
    where
        B: Serialize + ?Sized,
        T: DeserializeOwned,
    {
        let url = self.endpoint(segments)?;
        let operation_id = Uuid::new_v4().to_string();
        debug!("[HTTP] {} {} {}", operation_name, method, url);
        debug!("[HTTP]   操作ID: {}", operation_id);

        let mut request = self
            .http
            .request(method, url)
            .header("operationID", &operation_id);
        if let Some(body) = body {
            request = request.json(body);
        }
        let response = request.send().await?;
        let api_resp = handle_http_response::<T>(response, operation_name).await?;
        Ok(api_resp.data)
    }

    pub async fn get<T: DeserializeOwned>(
        &self,
        segments: &[&str],
        operation_name: &str,
    ) -> SdkResult<Option<T>> {
        self.send::<(), T>(Method::GET, segments, None, operation_name)
            .await
    }

    pub async fn post<B, T>(
        &self,
        segments: &[&str],
        body: &B,
        operation_name: &str,
    ) -> SdkResult<Option<T>>
    where
        B: Serialize + ?Sized,
        T: DeserializeOwned,
    {
        self.send(Method::POST, segments, Some(body), operation_name)
            .await
    }

    pub async fn put<B, T>(
        &self,
        segments: &[&str],
        body: &B,
        operation_name: &str,
    ) -> SdkResult<Option<T>>
    where
        B: Serialize + ?Sized,
        T: DeserializeOwned,
    {
        self.send(Method::PUT, segments, Some(body), operation_name)
            .await
    }

    pub async fn delete<T: DeserializeOwned>(
        &self,
        segments: &[&str],
        operation_name: &str,
    ) -> SdkResult<Option<T>> {
        self.send::<(), T>(Method::DELETE, segments, None, operation_name)
            .await
    }
}

/// SwipeHub 客户端
///
/// 每个登录会话一个实例，持有共享的存储、安全管理器和发现页控制器
#[derive(Clone)]
pub struct SwipeHubClient {
    config: ClientConfig,
    store: Arc<dyn KeyValueStore>,
    safety: Arc<SafetyManager>,
    discovery: Arc<DiscoveryController>,
}

impl SwipeHubClient {
    /// 连接本地 SQLite 并创建客户端
    pub async fn connect(config: ClientConfig) -> SdkResult<Self> {
        let store = SqliteStore::connect(&config.db_url)
            .await
            .map_err(|e| SdkError::Storage(format!("{:#}", e)))?;
        Self::with_store(config, Arc::new(store)).await
    }

    /// 使用指定存储创建客户端（REST 接口，默认空监听器）
    pub async fn with_store(config: ClientConfig, store: Arc<dyn KeyValueStore>) -> SdkResult<Self> {
        Self::with_listeners(
            config,
            store,
            Arc::new(EmptySafetyListener),
            Arc::new(EmptyDiscoveryListener),
        )
        .await
    }

    /// 使用指定存储和监听器创建客户端
    pub async fn with_listeners(
        config: ClientConfig,
        store: Arc<dyn KeyValueStore>,
        safety_listener: Arc<dyn SafetyListener>,
        discovery_listener: Arc<dyn DiscoveryListener>,
    ) -> SdkResult<Self> {
        let api_client = Arc::new(ApiClient::new(&config.api_base_url, &config.token)?);
        let moderation_api = Arc::new(HttpModerationApi::new(api_client.clone()));
        let discovery_api = Arc::new(HttpDiscoveryApi::new(api_client));
        Ok(Self::from_parts(
            config,
            store,
            moderation_api,
            discovery_api,
            safety_listener,
            discovery_listener,
        )
        .await)
    }

    /// 完全由调用方注入各组件
    pub async fn from_parts(
        config: ClientConfig,
        store: Arc<dyn KeyValueStore>,
        moderation_api: Arc<dyn ModerationApi>,
        discovery_api: Arc<dyn DiscoveryApi>,
        safety_listener: Arc<dyn SafetyListener>,
        discovery_listener: Arc<dyn DiscoveryListener>,
    ) -> Self {
        info!(
            "[Client] 创建 SwipeHub 客户端，用户ID: {}, 角色: {:?}",
            config.user_id, config.role
        );
        let safety = Arc::new(
            SafetyManager::with_listener(store.clone(), moderation_api, safety_listener).await,
        );
        let discovery = Arc::new(DiscoveryController::with_listener(
            config.discovery_config(),
            discovery_api,
            safety.clone(),
            store.clone(),
            discovery_listener,
        ));
        Self {
            config,
            store,
            safety,
            discovery,
        }
    }

    pub fn config(&self) -> &ClientConfig {
        &self.config
    }

    pub fn store(&self) -> Arc<dyn KeyValueStore> {
        self.store.clone()
    }

    pub fn safety(&self) -> Arc<SafetyManager> {
        self.safety.clone()
    }

    pub fn discovery(&self) -> Arc<DiscoveryController> {
        self.discovery.clone()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::social::storage::{MemoryStore, HIDDEN_CONTENT_KEY};

    fn api_client(base: &str) -> ApiClient {
        ApiClient::new(base, "test-token").unwrap()
    }

    #[test]
    fn config_defaults() {
        let config = ClientConfig::new("u1".to_string(), "t".to_string(), UserRole::Member);
        assert_eq!(config.api_base_url, "http://localhost:3000/api");
        assert_eq!(config.swipe_advance_delay, Duration::from_millis(300));
        assert_eq!(config.max_rewind_depth, 1);
    }

    #[test]
    fn endpoint_encodes_each_segment() {
        let client = api_client("http://localhost:3000/api");
        let url = client.endpoint(&["content", "a/b c", "report"]).unwrap();
        assert_eq!(url.as_str(), "http://localhost:3000/api/content/a%2Fb%20c/report");
    }

    #[test]
    fn endpoint_tolerates_trailing_slash() {
        let client = api_client("https://swipehub.example/api/");
        let url = client.endpoint(&["connections", "stack"]).unwrap();
        assert_eq!(url.as_str(), "https://swipehub.example/api/connections/stack");
    }

    #[test]
    fn rejects_bad_base_url() {
        assert!(matches!(
            ApiClient::new("not a url", "t"),
            Err(SdkError::InvalidUrl(_))
        ));
        assert!(matches!(
            ApiClient::new("mailto:someone@example.com", "t"),
            Err(SdkError::InvalidUrl(_))
        ));
    }

    #[test]
    fn rejects_token_with_newline() {
        assert!(matches!(
            ApiClient::new("http://localhost:3000/api", "bad\ntoken"),
            Err(SdkError::Validation(_))
        ));
    }

    #[tokio::test]
    async fn components_share_one_store() {
        let store = Arc::new(MemoryStore::new());
        let config = ClientConfig::new("u1".to_string(), "t".to_string(), UserRole::Creator);
        let client = SwipeHubClient::with_store(config, store.clone()).await.unwrap();

        client.safety().hide_content("post-1", "manual").await.unwrap();

        let raw = store.get(HIDDEN_CONTENT_KEY).await.unwrap().unwrap();
        assert_eq!(raw, r#"["post-1"]"#);
        assert_eq!(client.config().role, UserRole::Creator);
    }
}
