//! 领取记录实体定义
//!
//! 每次领取尝试（无论成败）都产生一条不可变的审计记录。

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use uuid::Uuid;

use super::enums::ClaimStatus;
use super::reward::RewardSnapshot;

/// 领取记录
///
/// 创建后不可修改；状态在写入时即为终态
#[derive(Debug, Clone, Serialize, Deserialize, sqlx::FromRow)]
#[serde(rename_all = "camelCase")]
pub struct ClaimRecord {
    pub id: Uuid,
    /// 领取用户 ID（来自认证服务的不透明标识）
    pub user_id: String,
    /// 事件 ID
    pub event_id: Uuid,
    /// 奖励 ID
    pub reward_id: Uuid,
    /// 处理结果
    pub status: ClaimStatus,
    /// 失败原因
    #[sqlx(default)]
    pub failure_reason: Option<String>,
    /// 处理完成时刻（成功时写入）
    #[sqlx(default)]
    pub processed_at: Option<DateTime<Utc>>,
    /// 发放瞬间的奖励快照（仅成功记录携带）
    #[sqlx(default)]
    pub reward_snapshot: Option<Value>,
    /// 请求发起时刻
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl ClaimRecord {
    /// 解析奖励快照
    pub fn parse_reward_snapshot(&self) -> Result<Option<RewardSnapshot>, serde_json::Error> {
        match &self.reward_snapshot {
            Some(value) => serde_json::from_value(value.clone()).map(Some),
            None => Ok(None),
        }
    }
}

/// 新领取记录输入
///
/// 记录 ID 和时间戳由账本写入时分配
#[derive(Debug, Clone)]
pub struct NewClaimRecord {
    pub user_id: String,
    pub event_id: Uuid,
    pub reward_id: Uuid,
    pub status: ClaimStatus,
    pub failure_reason: Option<String>,
    pub processed_at: Option<DateTime<Utc>>,
    pub reward_snapshot: Option<Value>,
}

impl NewClaimRecord {
    /// 构造失败记录
    pub fn failure(
        user_id: impl Into<String>,
        event_id: Uuid,
        reward_id: Uuid,
        status: ClaimStatus,
        reason: impl Into<String>,
    ) -> Self {
        Self {
            user_id: user_id.into(),
            event_id,
            reward_id,
            status,
            failure_reason: Some(reason.into()),
            processed_at: None,
            reward_snapshot: None,
        }
    }

    /// 构造成功记录
    ///
    /// 携带奖励快照和处理时刻
    pub fn success(
        user_id: impl Into<String>,
        event_id: Uuid,
        reward_id: Uuid,
        snapshot: &RewardSnapshot,
        processed_at: DateTime<Utc>,
    ) -> Result<Self, serde_json::Error> {
        Ok(Self {
            user_id: user_id.into(),
            event_id,
            reward_id,
            status: ClaimStatus::Success,
            failure_reason: None,
            processed_at: Some(processed_at),
            reward_snapshot: Some(serde_json::to_value(snapshot)?),
        })
    }
}

/// 领取记录查询过滤条件
///
/// 供报表/管理端按用户查询历史记录使用
#[derive(Debug, Clone, Default)]
pub struct ClaimRecordFilter {
    pub event_id: Option<Uuid>,
    pub reward_id: Option<Uuid>,
    pub status: Option<ClaimStatus>,
    /// 创建时间下界（含）
    pub created_from: Option<DateTime<Utc>>,
    /// 创建时间上界（含）
    pub created_to: Option<DateTime<Utc>>,
}
