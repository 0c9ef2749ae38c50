//! 奖励目录仓储
//!
//! 提供奖励的读访问和唯一的写操作：原子库存预留。

use async_trait::async_trait;
use sqlx::PgPool;
use tracing::instrument;
use uuid::Uuid;

use super::traits::{ReserveOutcome, RewardRepositoryTrait};
use crate::error::Result;
use crate::models::Reward;

/// 奖励目录仓储
///
/// `claimed_count` 只能通过 `reserve_one` 递增，保证限量奖励在任意
/// 并发下不超发
pub struct RewardRepository {
    pool: PgPool,
}

impl RewardRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    /// 获取单个奖励
    pub async fn get_by_id(&self, reward_id: Uuid) -> Result<Option<Reward>> {
        let reward = sqlx::query_as::<_, Reward>(
            r#"
            SELECT id, event_id, name, description, reward_type, details,
                   quantity, claimed_count, created_at, updated_at
            FROM rewards
            WHERE id = $1
            "#,
        )
        .bind(reward_id)
        .fetch_optional(&self.pool)
        .await?;

        Ok(reward)
    }

    /// 获取事件范围内的单个奖励
    ///
    /// 奖励归属事件不匹配时视同不存在
    pub async fn get_by_id_for_event(
        &self,
        reward_id: Uuid,
        event_id: Uuid,
    ) -> Result<Option<Reward>> {
        let reward = sqlx::query_as::<_, Reward>(
            r#"
            SELECT id, event_id, name, description, reward_type, details,
                   quantity, claimed_count, created_at, updated_at
            FROM rewards
            WHERE id = $1 AND event_id = $2
            "#,
        )
        .bind(reward_id)
        .bind(event_id)
        .fetch_optional(&self.pool)
        .await?;

        Ok(reward)
    }

    /// 列出事件下的所有奖励
    pub async fn list_by_event(&self, event_id: Uuid) -> Result<Vec<Reward>> {
        let rewards = sqlx::query_as::<_, Reward>(
            r#"
            SELECT id, event_id, name, description, reward_type, details,
                   quantity, claimed_count, created_at, updated_at
            FROM rewards
            WHERE event_id = $1
            ORDER BY created_at ASC
            "#,
        )
        .bind(event_id)
        .fetch_all(&self.pool)
        .await?;

        Ok(rewards)
    }

    /// 原子预留一个库存单位
    ///
    /// 单条条件更新：库存判定和递增在同一语句内完成，不存在
    /// 先读后写的丢失更新窗口。未命中时用存在性探测区分
    /// 「不存在」和「库存耗尽」。
    #[instrument(skip(self))]
    pub async fn reserve_one(&self, reward_id: Uuid, event_id: Uuid) -> Result<ReserveOutcome> {
        let reserved = sqlx::query_as::<_, Reward>(
            r#"
            UPDATE rewards
            SET claimed_count = claimed_count + 1, updated_at = NOW()
            WHERE id = $1 AND event_id = $2
              AND (quantity = 0 OR claimed_count < quantity)
            RETURNING id, event_id, name, description, reward_type, details,
                      quantity, claimed_count, created_at, updated_at
            "#,
        )
        .bind(reward_id)
        .bind(event_id)
        .fetch_optional(&self.pool)
        .await?;

        if let Some(reward) = reserved {
            return Ok(ReserveOutcome::Reserved(reward));
        }

        // 条件更新未命中：区分奖励不存在与库存耗尽
        let exists = sqlx::query_scalar::<_, bool>(
            r#"
            SELECT EXISTS(SELECT 1 FROM rewards WHERE id = $1 AND event_id = $2)
            "#,
        )
        .bind(reward_id)
        .bind(event_id)
        .fetch_one(&self.pool)
        .await?;

        if exists {
            Ok(ReserveOutcome::OutOfStock)
        } else {
            Ok(ReserveOutcome::NotFound)
        }
    }
}

#[async_trait]
impl RewardRepositoryTrait for RewardRepository {
    async fn get_by_id(&self, reward_id: Uuid) -> Result<Option<Reward>> {
        self.get_by_id(reward_id).await
    }

    async fn get_by_id_for_event(
        &self,
        reward_id: Uuid,
        event_id: Uuid,
    ) -> Result<Option<Reward>> {
        self.get_by_id_for_event(reward_id, event_id).await
    }

    async fn list_by_event(&self, event_id: Uuid) -> Result<Vec<Reward>> {
        self.list_by_event(event_id).await
    }

    async fn reserve_one(&self, reward_id: Uuid, event_id: Uuid) -> Result<ReserveOutcome> {
        self.reserve_one(reward_id, event_id).await
    }
}
