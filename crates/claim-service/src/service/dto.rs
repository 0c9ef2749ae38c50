//! 服务层数据传输对象
//!
//! 定义领取请求和对外决策结果。决策结果是带标签的枚举，
//! 系统错误对外只暴露通用消息，细节保留在日志和审计记录中。

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::error::ClaimError;
use crate::models::{ClaimRecord, RewardSnapshot};

/// 系统错误对外的通用消息
const INTERNAL_ERROR_MESSAGE: &str = "An unexpected error occurred while processing the claim.";

/// 领取请求
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ClaimRequest {
    /// 领取用户 ID
    pub user_id: String,
    /// 事件 ID
    pub event_id: Uuid,
    /// 奖励 ID
    pub reward_id: Uuid,
}

/// 业务拒绝类别
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum RejectionKind {
    /// 事件或奖励不存在
    NotFound,
    /// 事件未激活或不在有效期内
    EventInactive,
    /// 已领取过
    AlreadyClaimed,
    /// 库存不足
    OutOfStock,
    /// 条件未满足
    ConditionsNotMet,
}

/// 领取决策结果
///
/// 成功携带记录 ID 和奖励快照；拒绝携带类别和可读消息；
/// 系统错误只携带通用消息
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "outcome", rename_all = "SCREAMING_SNAKE_CASE")]
#[serde(rename_all_fields = "camelCase")]
pub enum ClaimDecision {
    Success {
        claim_id: Uuid,
        reward_snapshot: RewardSnapshot,
        processed_at: DateTime<Utc>,
    },
    Rejected {
        kind: RejectionKind,
        message: String,
    },
    InternalError {
        message: String,
    },
}

impl ClaimError {
    /// 映射为对外拒绝类别
    ///
    /// 系统错误返回 None
    pub fn rejection_kind(&self) -> Option<RejectionKind> {
        match self {
            Self::EventNotFound(_) | Self::RewardNotFound { .. } => Some(RejectionKind::NotFound),
            Self::EventInactive(_) => Some(RejectionKind::EventInactive),
            Self::AlreadyClaimed { .. } => Some(RejectionKind::AlreadyClaimed),
            Self::OutOfStock(_) => Some(RejectionKind::OutOfStock),
            Self::ConditionNotMet(_) => Some(RejectionKind::ConditionsNotMet),
            Self::Database(_) | Self::Serialization(_) | Self::Internal(_) => None,
        }
    }
}

impl ClaimDecision {
    /// 从处理器结果构造决策
    ///
    /// 成功记录缺少快照或记录解析失败视为系统错误
    pub fn from_result(result: Result<ClaimRecord, ClaimError>) -> Self {
        match result {
            Ok(record) => Self::from_success_record(record),
            Err(err) => match err.rejection_kind() {
                Some(kind) => Self::Rejected {
                    kind,
                    message: err.to_string(),
                },
                None => Self::InternalError {
                    message: INTERNAL_ERROR_MESSAGE.to_string(),
                },
            },
        }
    }

    fn from_success_record(record: ClaimRecord) -> Self {
        let snapshot = match record.parse_reward_snapshot() {
            Ok(Some(snapshot)) => snapshot,
            _ => {
                return Self::InternalError {
                    message: INTERNAL_ERROR_MESSAGE.to_string(),
                };
            }
        };

        Self::Success {
            claim_id: record.id,
            reward_snapshot: snapshot,
            processed_at: record.processed_at.unwrap_or(record.created_at),
        }
    }

    /// 是否为成功决策
    pub fn is_success(&self) -> bool {
        matches!(self, Self::Success { .. })
    }
}
