use crate::social::client::ApiClient;
use crate::social::connection::UserRole;
use crate::social::error::{SdkError, SdkResult};
use serde::{Deserialize, Serialize};
use tracing::{debug, info};

#[derive(Debug, Serialize)]
pub struct LoginRequest {
    pub email: String,
    pub password: String,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(try_from = "RawLoginUser")]
pub struct LoginUser {
    pub id: String,
    pub role: UserRole,
}

/// `id`、`_id`、`userId` 可能同时出现
#[derive(Deserialize)]
struct RawLoginUser {
    id: Option<String>,
    #[serde(rename = "_id")]
    mongo_id: Option<String>,
    #[serde(rename = "userId")]
    user_id: Option<String>,
    #[serde(default)]
    role: UserRole,
}

impl TryFrom<RawLoginUser> for LoginUser {
    type Error = String;

    fn try_from(raw: RawLoginUser) -> Result<Self, Self::Error> {
        let id = raw
            .id
            .or(raw.mongo_id)
            .or(raw.user_id)
            .ok_or_else(|| "登录响应中缺少用户ID".to_string())?;
        Ok(Self { id, role: raw.role })
    }
}

#[derive(Debug, Clone, Deserialize)]
pub struct LoginData {
    pub token: String,
    pub user: LoginUser,
}

pub async fn login_async(api_base_url: &str, email: &str, password: &str) -> SdkResult<LoginData> {
    // 登录前还没有 token，使用不带认证头的客户端
    let client = ApiClient::from_parts(reqwest::Client::new(), api_base_url)?;

    info!("🔐 正在登录...");
    debug!("   URL: {}", client.endpoint(&["auth", "login"])?);
    debug!("   邮箱: {}", email);

    let login_req = LoginRequest {
        email: email.to_string(),
        password: password.to_string(),
    };
    let data: Option<LoginData> = client.post(&["auth", "login"], &login_req, "登录").await?;
    let data = data.ok_or_else(|| SdkError::Remote {
        status: None,
        message: "登录响应中缺少 data 字段".to_string(),
    })?;

    info!("✅ 登录成功，用户ID: {}, 角色: {:?}", data.user.id, data.user.role);
    Ok(data)
}
