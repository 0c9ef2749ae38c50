//! 仓储 Trait 定义
//!
//! 定义仓储接口，便于服务层依赖抽象而非具体实现，支持 mock 测试

use async_trait::async_trait;
use uuid::Uuid;

use crate::error::Result;
use crate::models::{ClaimRecord, ClaimRecordFilter, Event, NewClaimRecord, Reward};

/// 原子预留结果
#[derive(Debug, Clone)]
pub enum ReserveOutcome {
    /// 预留成功，返回递增后的奖励快照
    Reserved(Reward),
    /// 库存已耗尽
    OutOfStock,
    /// 奖励不存在或不属于该事件
    NotFound,
}

/// 事件目录接口
///
/// 只读；事件的增删改由目录管理服务负责
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait EventRepositoryTrait: Send + Sync {
    async fn get_by_id(&self, event_id: Uuid) -> Result<Option<Event>>;
}

/// 奖励目录接口
///
/// `reserve_one` 是本引擎唯一的写操作入口
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait RewardRepositoryTrait: Send + Sync {
    async fn get_by_id(&self, reward_id: Uuid) -> Result<Option<Reward>>;
    async fn get_by_id_for_event(&self, reward_id: Uuid, event_id: Uuid)
    -> Result<Option<Reward>>;
    async fn list_by_event(&self, event_id: Uuid) -> Result<Vec<Reward>>;

    /// 原子预留一个库存单位
    ///
    /// 必须实现为单条条件更新：仅当 `quantity = 0 OR claimed_count < quantity`
    /// 时将 `claimed_count` 加一并返回更新后的行
    async fn reserve_one(&self, reward_id: Uuid, event_id: Uuid) -> Result<ReserveOutcome>;
}

/// 领取账本接口
///
/// 只追加；记录写入后不可修改
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait ClaimLedgerTrait: Send + Sync {
    async fn append(&self, record: NewClaimRecord) -> Result<ClaimRecord>;
    async fn has_successful_claim(
        &self,
        user_id: &str,
        event_id: Uuid,
        reward_id: Uuid,
    ) -> Result<bool>;
    async fn list_by_user(
        &self,
        user_id: &str,
        filter: ClaimRecordFilter,
        limit: i64,
    ) -> Result<Vec<ClaimRecord>>;
}
