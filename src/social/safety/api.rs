//! 举报/屏蔽 HTTP API 客户端

use crate::social::client::ApiClient;
use crate::social::error::SdkResult;
use async_trait::async_trait;
use serde::Deserialize;
use std::sync::Arc;
use tracing::{info, warn};

/// 审核相关的远端接口
#[async_trait]
pub trait ModerationApi: Send + Sync {
    /// 举报内容，返回服务端生成的举报 ID（如有）
    async fn report_content(
        &self,
        content_id: &str,
        reason: &str,
        details: Option<&str>,
    ) -> SdkResult<Option<String>>;

    /// 举报用户
    ///
    /// 后端尚未提供对应接口，HTTP 实现只记录日志。
    async fn report_user(&self, user_id: &str, reason: &str, details: Option<&str>)
        -> SdkResult<()>;

    async fn block_user(&self, user_id: &str, reason: Option<&str>) -> SdkResult<()>;

    async fn unblock_user(&self, user_id: &str) -> SdkResult<()>;
}

/// 基于 REST 接口的审核 API
pub struct HttpModerationApi {
    client: Arc<ApiClient>,
}

impl HttpModerationApi {
    pub fn new(client: Arc<ApiClient>) -> Self {
        Self { client }
    }
}

#[derive(Deserialize)]
struct ReportData {
    #[serde(rename = "reportId", default)]
    report_id: Option<String>,
    #[serde(rename = "reportID", default)]
    report_id_upper: Option<String>,
    #[serde(default)]
    id: Option<String>,
}

impl ReportData {
    fn into_report_id(self) -> Option<String> {
        self.report_id.or(self.report_id_upper).or(self.id)
    }
}

#[async_trait]
impl ModerationApi for HttpModerationApi {
    async fn report_content(
        &self,
        content_id: &str,
        reason: &str,
        details: Option<&str>,
    ) -> SdkResult<Option<String>> {
        info!("[ModerationAPI] 📡 举报内容: {}, 原因: {}", content_id, reason);
        let data: Option<ReportData> = self
            .client
            .post(
                &["content", content_id, "report"],
                &serde_json::json!({
                    "reason": reason,
                    "details": details.unwrap_or_default(),
                }),
                "举报内容",
            )
            .await?;
        let report_id = data.and_then(ReportData::into_report_id);
        info!("[ModerationAPI] ✅ 举报内容成功，举报ID: {:?}", report_id);
        Ok(report_id)
    }

    async fn report_user(
        &self,
        user_id: &str,
        reason: &str,
        _details: Option<&str>,
    ) -> SdkResult<()> {
        // TODO: 后端确定用户举报接口后改为真实请求
        warn!(
            "[ModerationAPI] 用户举报接口尚未对接，仅记录: 用户 {}, 原因 {}",
            user_id, reason
        );
        Ok(())
    }

    async fn block_user(&self, user_id: &str, reason: Option<&str>) -> SdkResult<()> {
        info!("[ModerationAPI] 📡 屏蔽用户: {}", user_id);
        let _: Option<serde_json::Value> = self
            .client
            .post(
                &["member", "creators", user_id, "block"],
                &serde_json::json!({ "reason": reason.unwrap_or_default() }),
                "屏蔽用户",
            )
            .await?;
        info!("[ModerationAPI] ✅ 屏蔽用户成功: {}", user_id);
        Ok(())
    }

    async fn unblock_user(&self, user_id: &str) -> SdkResult<()> {
        info!("[ModerationAPI] 📡 解除屏蔽: {}", user_id);
        let _: Option<serde_json::Value> = self
            .client
            .delete(&["member", "creators", user_id, "block"], "解除屏蔽")
            .await?;
        info!("[ModerationAPI] ✅ 解除屏蔽成功: {}", user_id);
        Ok(())
    }
}
