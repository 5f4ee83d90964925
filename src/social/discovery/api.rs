//! 发现页 HTTP API 客户端
//!
//! 负责候选人批量拉取、滑卡动作上报和已有配对列表

use crate::social::client::ApiClient;
use crate::social::discovery::models::{
    ExistingConnection, SwipeAction, SwipeCandidate, SwipeResponse,
};
use crate::social::error::SdkResult;
use crate::social::types::deserialize_vec_or_null;
use async_trait::async_trait;
use serde::Deserialize;
use std::sync::Arc;
use tracing::{debug, info, warn};

#[async_trait]
pub trait DiscoveryApi: Send + Sync {
    /// 拉取一批候选人
    async fn fetch_candidates(&self) -> SdkResult<Vec<SwipeCandidate>>;

    /// 上报一次滑卡动作
    async fn swipe_action(&self, creator_id: &str, action: SwipeAction) -> SdkResult<SwipeResponse>;

    /// 已有配对及未读消息提示
    async fn load_connections(&self) -> SdkResult<Vec<ExistingConnection>>;
}

/// data 可能直接是数组，也可能包在对象里
#[derive(Deserialize)]
#[serde(untagged)]
enum CandidateBatch {
    List(Vec<SwipeCandidate>),
    Wrapped(WrappedCandidates),
}

/// 不同接口用不同的键名包裹列表，可能同时出现，取第一个非空的
#[derive(Deserialize, Default)]
#[serde(default)]
struct WrappedCandidates {
    #[serde(deserialize_with = "deserialize_vec_or_null")]
    candidates: Vec<SwipeCandidate>,
    #[serde(deserialize_with = "deserialize_vec_or_null")]
    creators: Vec<SwipeCandidate>,
    #[serde(deserialize_with = "deserialize_vec_or_null")]
    profiles: Vec<SwipeCandidate>,
    #[serde(deserialize_with = "deserialize_vec_or_null")]
    stack: Vec<SwipeCandidate>,
}

impl CandidateBatch {
    fn into_vec(self) -> Vec<SwipeCandidate> {
        match self {
            CandidateBatch::List(list) => list,
            CandidateBatch::Wrapped(w) => [w.candidates, w.creators, w.profiles, w.stack]
                .into_iter()
                .find(|list| !list.is_empty())
                .unwrap_or_default(),
        }
    }
}

#[derive(Deserialize)]
#[serde(untagged)]
enum ConnectionList {
    List(Vec<ExistingConnection>),
    Wrapped {
        #[serde(default, deserialize_with = "deserialize_vec_or_null")]
        connections: Vec<ExistingConnection>,
    },
}

impl ConnectionList {
    fn into_vec(self) -> Vec<ExistingConnection> {
        match self {
            ConnectionList::List(list) => list,
            ConnectionList::Wrapped { connections } => connections,
        }
    }
}

/// 基于 REST 接口的发现页 API
pub struct HttpDiscoveryApi {
    client: Arc<ApiClient>,
}

impl HttpDiscoveryApi {
    pub fn new(client: Arc<ApiClient>) -> Self {
        Self { client }
    }

    async fn fetch_from(&self, segments: &[&str], operation: &str) -> SdkResult<Vec<SwipeCandidate>> {
        let batch: Option<CandidateBatch> = self.client.get(segments, operation).await?;
        Ok(batch.map(CandidateBatch::into_vec).unwrap_or_default())
    }
}

#[async_trait]
impl DiscoveryApi for HttpDiscoveryApi {
    async fn fetch_candidates(&self) -> SdkResult<Vec<SwipeCandidate>> {
        info!("[DiscoveryAPI] 📡 请求候选人列表");
        let candidates = match self.fetch_from(&["connections", "stack"], "候选人列表").await {
            Ok(list) => list,
            Err(e) if e.is_unauthorized() => return Err(e),
            Err(e) => {
                warn!(
                    "[DiscoveryAPI] 候选人接口失败，改用 /member/discover: {}",
                    e
                );
                self.fetch_from(&["member", "discover"], "发现页列表").await?
            }
        };
        info!("[DiscoveryAPI] ✅ 候选人列表响应，数量: {}", candidates.len());
        Ok(candidates)
    }

    async fn swipe_action(&self, creator_id: &str, action: SwipeAction) -> SdkResult<SwipeResponse> {
        debug!(
            "[DiscoveryAPI] 📡 上报滑卡: {} -> {}",
            creator_id,
            action.as_str()
        );
        let resp: Option<SwipeResponse> = self
            .client
            .post(
                &["connections", "swipe"],
                &serde_json::json!({
                    "creatorId": creator_id,
                    "action": action,
                }),
                "滑卡",
            )
            .await?;
        let resp = resp.unwrap_or_default();
        debug!(
            "[DiscoveryAPI] 滑卡响应: {} isConnected={}",
            creator_id, resp.is_connected
        );
        Ok(resp)
    }

    async fn load_connections(&self) -> SdkResult<Vec<ExistingConnection>> {
        let list: Option<ConnectionList> = self.client.get(&["connections"], "配对列表").await?;
        let list = list.map(ConnectionList::into_vec).unwrap_or_default();
        info!("[DiscoveryAPI] ✅ 配对列表响应，数量: {}", list.len());
        Ok(list)
    }
}
