//! 领取服务错误类型
//!
//! 定义服务层的业务错误和系统错误

use thiserror::Error;
use uuid::Uuid;

use crate::models::ClaimStatus;

/// 领取服务错误类型
#[derive(Debug, Error)]
pub enum ClaimError {
    // === 引用错误（请求本身不合法，不产生审计记录） ===
    #[error("事件不存在: {0}")]
    EventNotFound(Uuid),

    #[error("奖励不存在或不属于该事件: reward_id={reward_id}, event_id={event_id}")]
    RewardNotFound { reward_id: Uuid, event_id: Uuid },

    // === 业务拒绝（产生审计记录） ===
    #[error("事件未激活或不在有效期内: {0}")]
    EventInactive(Uuid),

    #[error("该奖励已领取过: user_id={user_id}, reward_id={reward_id}")]
    AlreadyClaimed { user_id: String, reward_id: Uuid },

    #[error("奖励库存不足: reward_id={0}")]
    OutOfStock(Uuid),

    #[error("领取条件未满足: event_id={0}")]
    ConditionNotMet(Uuid),

    // === 系统错误 ===
    #[error("数据库错误: {0}")]
    Database(#[from] sqlx::Error),

    #[error("JSON 序列化错误: {0}")]
    Serialization(#[from] serde_json::Error),

    #[error("内部错误: {0}")]
    Internal(String),
}

/// 领取服务 Result 类型别名
pub type Result<T> = std::result::Result<T, ClaimError>;

impl ClaimError {
    /// 检查是否为业务错误（非系统错误）
    pub fn is_business_error(&self) -> bool {
        !matches!(
            self,
            Self::Database(_) | Self::Serialization(_) | Self::Internal(_)
        )
    }

    /// 获取错误码（用于 API 响应）
    pub fn error_code(&self) -> &'static str {
        match self {
            Self::EventNotFound(_) => "EVENT_NOT_FOUND",
            Self::RewardNotFound { .. } => "REWARD_NOT_FOUND",
            Self::EventInactive(_) => "EVENT_INACTIVE",
            Self::AlreadyClaimed { .. } => "ALREADY_CLAIMED",
            Self::OutOfStock(_) => "OUT_OF_STOCK",
            Self::ConditionNotMet(_) => "CONDITIONS_NOT_MET",
            Self::Database(_) => "DATABASE_ERROR",
            Self::Serialization(_) => "SERIALIZATION_ERROR",
            Self::Internal(_) => "INTERNAL_ERROR",
        }
    }

    /// 业务拒绝对应的审计记录状态
    ///
    /// 引用错误和系统错误返回 None（引用错误不审计，系统错误由
    /// 处理器统一记为 FAILED_ERROR）
    pub fn claim_status(&self) -> Option<ClaimStatus> {
        match self {
            Self::EventInactive(_) => Some(ClaimStatus::FailedEventInactive),
            Self::AlreadyClaimed { .. } => Some(ClaimStatus::FailedAlreadyClaimed),
            Self::OutOfStock(_) => Some(ClaimStatus::FailedOutOfStock),
            Self::ConditionNotMet(_) => Some(ClaimStatus::FailedConditionNotMet),
            _ => None,
        }
    }
}
