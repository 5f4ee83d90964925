use crate::social::error::{SdkError, SdkResult};
use reqwest::StatusCode;
use serde::{Deserialize, Deserializer};
use tracing::{debug, error, info};

fn default_success() -> bool {
    true
}

/// 统一的 API 响应包装结构体（包含 success、message、data）
/// data 字段可能为 null 或缺失，因此使用 Option<T>
/// 部分接口不返回 success 字段，缺失时视为成功
#[derive(Debug, Deserialize)]
pub struct ApiResponse<T> {
    #[serde(default = "default_success")]
    pub success: bool,
    #[serde(default)]
    pub message: String,
    pub data: Option<T>,
}

/// 反序列化数组字段，处理 null 值
pub(crate) fn deserialize_vec_or_null<'de, D, T>(deserializer: D) -> Result<Vec<T>, D::Error>
where
    D: Deserializer<'de>,
    T: Deserialize<'de>,
{
    let opt = Option::<Vec<T>>::deserialize(deserializer)?;
    Ok(opt.unwrap_or_default())
}

/// 通用 HTTP 响应处理函数：直接反序列化为统一的响应结构体
/// 所有 API 都共用此方法
pub async fn handle_http_response<T: serde::de::DeserializeOwned>(
    response: reqwest::Response,
    operation_name: &str,
) -> SdkResult<ApiResponse<T>> {
    let status = response.status();
    // 读取 body bytes（只能读取一次）
    let body_bytes = response.bytes().await?;
    decode_api_response(status, &body_bytes, operation_name)
}

/// 根据 HTTP 状态码和原始 body 解析响应
pub(crate) fn decode_api_response<T: serde::de::DeserializeOwned>(
    status: StatusCode,
    body_bytes: &[u8],
    operation_name: &str,
) -> SdkResult<ApiResponse<T>> {
    let body_str = String::from_utf8_lossy(body_bytes);
    info!("[HTTP] {}响应 Body: {}", operation_name, body_str);

    if status == StatusCode::UNAUTHORIZED {
        error!("[HTTP] {}未授权（401），需要重新登录", operation_name);
        return Err(SdkError::Unauthorized);
    }

    if !status.is_success() {
        error!(
            "[HTTP] {}请求失败，HTTP状态: {}, 响应: {}",
            operation_name, status, body_str
        );
        return Err(SdkError::Remote {
            status: Some(status.as_u16()),
            message: body_str.into_owned(),
        });
    }
    debug!("[HTTP] {}请求成功，HTTP状态: {}", operation_name, status);

    // 204 或空 body：没有 data 可解析
    if body_bytes.iter().all(|b| b.is_ascii_whitespace()) {
        return Ok(ApiResponse {
            success: true,
            message: String::new(),
            data: None,
        });
    }

    let api_resp: ApiResponse<T> = serde_json::from_slice(body_bytes).map_err(|e| {
        error!(
            "[HTTP] {}反序列化失败: {:?}\n原始响应: {}",
            operation_name, e, body_str
        );
        SdkError::Decode(e)
    })?;

    if !api_resp.success {
        error!(
            "[HTTP] {}服务器返回失败，错误信息: {}",
            operation_name, api_resp.message
        );
        return Err(SdkError::Remote {
            status: None,
            message: api_resp.message,
        });
    }

    Ok(api_resp)
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::Value;

    #[derive(Debug, Deserialize)]
    struct Wrapper {
        #[serde(deserialize_with = "deserialize_vec_or_null")]
        items: Vec<String>,
    }

    #[test]
    fn unauthorized_status_maps_to_unauthorized() {
        let res = decode_api_response::<Value>(StatusCode::UNAUTHORIZED, b"{}", "测试");
        assert!(matches!(res, Err(SdkError::Unauthorized)));
    }

    #[test]
    fn server_error_keeps_status_code() {
        let res = decode_api_response::<Value>(
            StatusCode::INTERNAL_SERVER_ERROR,
            b"oops",
            "测试",
        );
        match res {
            Err(SdkError::Remote { status, message }) => {
                assert_eq!(status, Some(500));
                assert_eq!(message, "oops");
            }
            other => panic!("unexpected: {:?}", other.map(|r| r.success)),
        }
    }

    #[test]
    fn success_false_is_remote_failure() {
        let body = br#"{"success":false,"message":"already blocked"}"#;
        let res = decode_api_response::<Value>(StatusCode::OK, body, "测试");
        match res {
            Err(SdkError::Remote { status, message }) => {
                assert_eq!(status, None);
                assert_eq!(message, "already blocked");
            }
            _ => panic!("expected remote failure"),
        }
    }

    #[test]
    fn missing_success_field_defaults_to_success() {
        let body = br#"{"data":{"isConnected":true}}"#;
        let resp = decode_api_response::<Value>(StatusCode::OK, body, "测试").unwrap();
        assert!(resp.success);
        assert_eq!(resp.data.unwrap()["isConnected"], Value::Bool(true));
    }

    #[test]
    fn empty_body_yields_no_data() {
        let resp = decode_api_response::<Value>(StatusCode::NO_CONTENT, b"", "测试").unwrap();
        assert!(resp.data.is_none());
    }

    #[test]
    fn malformed_json_is_decode_error() {
        let res = decode_api_response::<Value>(StatusCode::OK, b"{not json", "测试");
        assert!(matches!(res, Err(SdkError::Decode(_))));
    }

    #[test]
    fn null_arrays_decode_as_empty() {
        let w: Wrapper = serde_json::from_str(r#"{"items":null}"#).unwrap();
        assert!(w.items.is_empty());
    }
}
