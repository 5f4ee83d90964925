//! 发现页（滑卡）本地模型定义

use crate::social::types::deserialize_vec_or_null;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;

/// 滑卡候选人（创作者资料的精简投影）
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", from = "RawCandidate")]
pub struct SwipeCandidate {
    pub id: String,
    pub display_name: String,
    pub age: Option<u32>,
    pub location: Option<String>,
    pub body_type: Option<String>,
    pub photos: Vec<String>,
    pub is_online: bool,
    pub is_verified: bool,
    /// 注册时间（用于"新成员"筛选）
    pub created_at: Option<DateTime<Utc>>,
    pub last_active: Option<DateTime<Utc>>,
    /// 订阅价格
    pub subscription_price: Option<f64>,
    pub total_likes: Option<u64>,
    /// 服务端标记的新成员（没有 created_at 时使用）
    pub is_new: bool,
}

/// 服务端原始候选人数据
///
/// 同一字段可能同时以多个名字出现（如 `_id` 和 `id`），逐个读取后按优先级取值
#[derive(Deserialize, Default)]
#[serde(rename_all = "camelCase", default)]
struct RawCandidate {
    #[serde(rename = "_id")]
    mongo_id: Option<String>,
    id: Option<String>,
    display_name: Option<String>,
    name: Option<String>,
    username: Option<String>,
    age: Option<u32>,
    location: Option<String>,
    body_type: Option<String>,
    #[serde(deserialize_with = "deserialize_vec_or_null")]
    photos: Vec<String>,
    is_online: bool,
    is_verified: bool,
    created_at: Option<DateTime<Utc>>,
    last_active: Option<DateTime<Utc>>,
    subscription_price: Option<f64>,
    total_likes: Option<u64>,
    is_new: bool,
}

impl From<RawCandidate> for SwipeCandidate {
    fn from(raw: RawCandidate) -> Self {
        Self {
            id: raw.id.or(raw.mongo_id).unwrap_or_default(),
            display_name: raw
                .display_name
                .or(raw.name)
                .or(raw.username)
                .unwrap_or_default(),
            age: raw.age,
            location: raw.location,
            body_type: raw.body_type,
            photos: raw.photos,
            is_online: raw.is_online,
            is_verified: raw.is_verified,
            created_at: raw.created_at,
            last_active: raw.last_active,
            subscription_price: raw.subscription_price,
            total_likes: raw.total_likes,
            is_new: raw.is_new,
        }
    }
}

/// 手势方向
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SwipeDirection {
    Left,
    Right,
    Up,
}

impl SwipeDirection {
    pub fn action(self) -> SwipeAction {
        match self {
            SwipeDirection::Left => SwipeAction::Pass,
            SwipeDirection::Right => SwipeAction::Like,
            SwipeDirection::Up => SwipeAction::SuperLike,
        }
    }
}

/// 滑卡动作（发送给服务端的值）
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SwipeAction {
    Pass,
    Like,
    SuperLike,
}

impl SwipeAction {
    pub fn as_str(self) -> &'static str {
        match self {
            SwipeAction::Pass => "pass",
            SwipeAction::Like => "like",
            SwipeAction::SuperLike => "superlike",
        }
    }
}

impl std::str::FromStr for SwipeAction {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "pass" | "left" => Ok(SwipeAction::Pass),
            "like" | "right" => Ok(SwipeAction::Like),
            "superlike" | "super_like" | "up" => Ok(SwipeAction::SuperLike),
            other => Err(format!("未知的滑卡动作: {}", other)),
        }
    }
}

impl From<SwipeAction> for SwipeDirection {
    fn from(action: SwipeAction) -> Self {
        match action {
            SwipeAction::Pass => SwipeDirection::Left,
            SwipeAction::Like => SwipeDirection::Right,
            SwipeAction::SuperLike => SwipeDirection::Up,
        }
    }
}

/// 年龄区间（闭区间）
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct AgeRange {
    pub min: u32,
    pub max: u32,
}

/// 发现页筛选条件
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct DiscoveryFilters {
    pub age_range: Option<AgeRange>,
    /// 地点关键字（不区分大小写的子串匹配）
    pub location: Option<String>,
    /// 体型集合，空集合表示不限
    pub body_types: BTreeSet<String>,
    pub online_only: bool,
    pub verified_only: bool,
    /// 只看最近 N 天内加入的新成员
    pub new_members_days: Option<u32>,
}

impl DiscoveryFilters {
    pub fn is_empty(&self) -> bool {
        *self == DiscoveryFilters::default()
    }
}

/// 滑卡历史（用于撤回）
#[derive(Debug, Clone, PartialEq)]
pub struct SwipeHistoryEntry {
    pub candidate: SwipeCandidate,
    pub action: SwipeAction,
}

/// 正在执行动画的滑卡
#[derive(Debug, Clone, PartialEq)]
pub struct PendingSwipe {
    pub candidate: SwipeCandidate,
    pub action: SwipeAction,
}

/// 空列表原因
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EmptyReason {
    /// 服务端没有返回候选人
    NoCandidates,
    /// 有候选人，但全部被筛选条件排除
    FiltersTooStrict,
    /// 已经滑完最后一张
    Exhausted,
}

/// 发现页状态
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum StackStatus {
    Loading,
    Ready,
    Empty(EmptyReason),
    Error(String),
}

/// 已有的配对/消息提示
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", from = "RawConnection")]
pub struct ExistingConnection {
    pub partner_id: String,
    pub has_unread_messages: bool,
    pub connected_at: Option<DateTime<Utc>>,
}

#[derive(Deserialize, Default)]
#[serde(rename_all = "camelCase", default)]
struct RawConnection {
    partner_id: Option<String>,
    creator_id: Option<String>,
    user_id: Option<String>,
    id: Option<String>,
    has_unread_messages: bool,
    connected_at: Option<DateTime<Utc>>,
}

impl From<RawConnection> for ExistingConnection {
    fn from(raw: RawConnection) -> Self {
        Self {
            partner_id: raw
                .partner_id
                .or(raw.creator_id)
                .or(raw.user_id)
                .or(raw.id)
                .unwrap_or_default(),
            has_unread_messages: raw.has_unread_messages,
            connected_at: raw.connected_at,
        }
    }
}

/// 滑卡接口响应
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct SwipeResponse {
    pub is_connected: bool,
    pub connection_type: Option<String>,
    pub connection_id: Option<String>,
    pub total_spent: Option<f64>,
    pub monthly_spend: Option<f64>,
}
