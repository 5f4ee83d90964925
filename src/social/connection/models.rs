//! 配对（Connection）展示模型

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// 配对类型，服务端以 snake_case 字符串下发
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub enum ConnectionType {
    /// 右滑后立即配对
    InstantConnection,
    /// 双方互相喜欢
    MutualInterest,
    /// 超级喜欢促成的配对
    SuperLikeMatch,
    /// 高消费用户/头部创作者之间的配对
    HighValueConnection,
    /// 客户端不认识的类型，展示通用文案
    Other(String),
}

impl ConnectionType {
    pub fn as_tag(&self) -> &str {
        match self {
            ConnectionType::InstantConnection => "instant_connection",
            ConnectionType::MutualInterest => "mutual_interest",
            ConnectionType::SuperLikeMatch => "superlike_match",
            ConnectionType::HighValueConnection => "high_value_connection",
            ConnectionType::Other(tag) => tag,
        }
    }

    pub fn from_tag(tag: &str) -> Self {
        match tag {
            "instant_connection" => ConnectionType::InstantConnection,
            "mutual_interest" => ConnectionType::MutualInterest,
            "superlike_match" => ConnectionType::SuperLikeMatch,
            "high_value_connection" => ConnectionType::HighValueConnection,
            other => ConnectionType::Other(other.to_string()),
        }
    }
}

impl From<String> for ConnectionType {
    fn from(tag: String) -> Self {
        ConnectionType::from_tag(&tag)
    }
}

impl From<ConnectionType> for String {
    fn from(t: ConnectionType) -> Self {
        t.as_tag().to_string()
    }
}

/// 当前用户角色
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum UserRole {
    #[default]
    Member,
    Creator,
}

/// 弹窗文案所需的上下文
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ConnectionData {
    #[serde(rename = "partnerID")]
    pub partner_id: String,
    #[serde(default)]
    pub partner_name: String,
    #[serde(default)]
    pub partner_photo: Option<String>,
    /// 累计消费金额
    #[serde(default)]
    pub total_spent: Option<f64>,
    /// 本月消费金额
    #[serde(default)]
    pub monthly_spend: Option<f64>,
}

/// 一次配对弹窗的展示记录，弹窗关闭后丢弃
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ConnectionEvent {
    pub connection_type: ConnectionType,
    /// (当前用户, 对方)
    pub participants: (String, String),
    pub data: ConnectionData,
    pub created_at: DateTime<Utc>,
}

impl ConnectionEvent {
    pub fn new(connection_type: ConnectionType, self_id: &str, data: ConnectionData) -> Self {
        Self {
            connection_type,
            participants: (self_id.to_string(), data.partner_id.clone()),
            data,
            created_at: Utc::now(),
        }
    }

    pub fn partner_id(&self) -> &str {
        &self.participants.1
    }
}

/// 按钮动作
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum CtaAction {
    OpenChat,
    ViewProfile,
    KeepSwiping,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Cta {
    pub label: String,
    pub action: CtaAction,
}

/// 弹窗展示描述
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Presentation {
    pub title: String,
    pub subtitle: String,
    pub description: String,
    pub icon: String,
    pub primary_cta: Cta,
    pub secondary_cta: Option<Cta>,
}

/// 按钮点击后的跳转目标
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "screen", rename_all = "snake_case")]
pub enum NavigationTarget {
    Chat {
        #[serde(rename = "userID")]
        user_id: String,
    },
    Profile {
        #[serde(rename = "userID")]
        user_id: String,
    },
    Discovery,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn connection_type_tags_round_trip_and_keep_unknowns() {
        let known: ConnectionType = serde_json::from_str(r#""mutual_interest""#).unwrap();
        assert_eq!(known, ConnectionType::MutualInterest);

        let unknown: ConnectionType = serde_json::from_str(r#""birthday_match""#).unwrap();
        assert_eq!(unknown, ConnectionType::Other("birthday_match".to_string()));
        assert_eq!(
            serde_json::to_string(&unknown).unwrap(),
            r#""birthday_match""#
        );
    }

    #[test]
    fn event_records_both_participants() {
        let data = ConnectionData {
            partner_id: "creator-7".to_string(),
            ..Default::default()
        };
        let event = ConnectionEvent::new(ConnectionType::InstantConnection, "member-1", data);
        assert_eq!(event.participants.0, "member-1");
        assert_eq!(event.partner_id(), "creator-7");
    }
}
