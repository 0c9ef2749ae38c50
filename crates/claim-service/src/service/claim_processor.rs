//! 领取处理器
//!
//! 处理奖励领取的核心业务逻辑，包括：
//! - 事件有效性检查（状态 + 时间窗口）
//! - 重复领取检查
//! - 库存预检与原子预留
//! - 领取条件评估
//! - 审计记录写入（每次调用恰好一条终态记录）
//!
//! ## 处理流程
//!
//! 1. 事件查找 -> 2. 奖励查找（事件范围内）-> 3. 事件有效性
//!    -> 4. 重复领取检查 -> 5. 库存预检 -> 6. 条件评估
//!    -> 7. 原子预留 -> 8. 写入成功记录
//!
//! 检查顺序是对外契约：事件无效先于重复领取，重复领取先于库存/条件。
//! 引用错误（事件/奖励不存在）不产生审计记录；其余失败路径各写一条
//! 对应状态的失败记录。

use std::sync::Arc;

use chrono::Utc;
use tracing::{error, info, instrument, warn};

use crate::condition::ConditionEvaluator;
use crate::error::{ClaimError, Result};
use crate::models::{ClaimRecord, ClaimRecordFilter, ClaimStatus, NewClaimRecord, Reward};
use crate::repository::{
    ClaimLedgerTrait, EventRepositoryTrait, ReserveOutcome, RewardRepositoryTrait,
};
use crate::service::dto::ClaimRequest;

/// 领取处理器
///
/// 对仓储抽象和条件评估接口泛型化，便于单元测试注入 mock。
/// 处理器本身无状态，可安全地在任务间共享。
pub struct ClaimProcessor<E, R, L>
where
    E: EventRepositoryTrait,
    R: RewardRepositoryTrait,
    L: ClaimLedgerTrait,
{
    event_repo: Arc<E>,
    reward_repo: Arc<R>,
    ledger: Arc<L>,
    condition_evaluator: Arc<dyn ConditionEvaluator>,
}

impl<E, R, L> ClaimProcessor<E, R, L>
where
    E: EventRepositoryTrait,
    R: RewardRepositoryTrait,
    L: ClaimLedgerTrait,
{
    pub fn new(
        event_repo: Arc<E>,
        reward_repo: Arc<R>,
        ledger: Arc<L>,
        condition_evaluator: Arc<dyn ConditionEvaluator>,
    ) -> Self {
        Self {
            event_repo,
            reward_repo,
            ledger,
            condition_evaluator,
        }
    }

    /// 处理一次领取请求
    ///
    /// 返回写入账本的记录。业务拒绝以错误形式返回，对应的失败记录
    /// 已写入账本；系统错误对外统一为 `Internal`，细节只出现在日志
    /// 和 FAILED_ERROR 审计记录中。
    #[instrument(
        skip(self, request),
        fields(
            user_id = %request.user_id,
            event_id = %request.event_id,
            reward_id = %request.reward_id,
        )
    )]
    pub async fn process(&self, request: ClaimRequest) -> Result<ClaimRecord> {
        match self.process_inner(&request).await {
            Ok(record) => {
                info!(claim_id = %record.id, "奖励领取成功");
                Ok(record)
            }
            Err(err) if err.is_business_error() => {
                // 引用错误不落账，业务拒绝各写一条对应状态的失败记录
                if let Some(status) = err.claim_status() {
                    warn!(code = err.error_code(), "领取被拒绝");
                    self.record_failure(&request, status, err.to_string()).await;
                }
                Err(err)
            }
            Err(err) => {
                error!(error = %err, "领取处理发生系统错误");
                self.record_failure(&request, ClaimStatus::FailedError, err.to_string())
                    .await;
                Err(ClaimError::Internal("领取处理失败".to_string()))
            }
        }
    }

    /// 按用户查询领取历史
    pub async fn list_user_claims(
        &self,
        user_id: &str,
        filter: ClaimRecordFilter,
        limit: i64,
    ) -> Result<Vec<ClaimRecord>> {
        self.ledger.list_by_user(user_id, filter, limit).await
    }

    /// 列出事件下的所有奖励
    ///
    /// 事件不存在时返回 `EventNotFound`
    pub async fn list_event_rewards(&self, event_id: uuid::Uuid) -> Result<Vec<Reward>> {
        if self.event_repo.get_by_id(event_id).await?.is_none() {
            return Err(ClaimError::EventNotFound(event_id));
        }
        self.reward_repo.list_by_event(event_id).await
    }

    async fn process_inner(&self, request: &ClaimRequest) -> Result<ClaimRecord> {
        // 1. 事件查找
        let event = self
            .event_repo
            .get_by_id(request.event_id)
            .await?
            .ok_or(ClaimError::EventNotFound(request.event_id))?;

        // 2. 奖励查找（限定在事件范围内，归属不匹配视同不存在）
        let reward = self
            .reward_repo
            .get_by_id_for_event(request.reward_id, request.event_id)
            .await?
            .ok_or(ClaimError::RewardNotFound {
                reward_id: request.reward_id,
                event_id: request.event_id,
            })?;

        // 3. 事件有效性：状态 ACTIVE 且当前时间落在窗口内
        if !event.is_claimable(Utc::now()) {
            return Err(ClaimError::EventInactive(event.id));
        }

        // 4. 重复领取检查（快速路径；权威防线是账本的部分唯一索引）
        if self
            .ledger
            .has_successful_claim(&request.user_id, request.event_id, request.reward_id)
            .await?
        {
            return Err(ClaimError::AlreadyClaimed {
                user_id: request.user_id.clone(),
                reward_id: request.reward_id,
            });
        }

        // 5. 库存预检：已耗尽时提前拒绝，不消耗条件评估
        if reward.is_exhausted() {
            return Err(ClaimError::OutOfStock(reward.id));
        }

        // 6. 条件评估
        if !self
            .condition_evaluator
            .evaluate(&request.user_id, &event)
            .await?
        {
            return Err(ClaimError::ConditionNotMet(event.id));
        }

        // 7. 原子预留：库存判定和递增在单条语句内完成
        let reserved = match self
            .reward_repo
            .reserve_one(request.reward_id, request.event_id)
            .await?
        {
            ReserveOutcome::Reserved(reward) => reward,
            ReserveOutcome::OutOfStock => return Err(ClaimError::OutOfStock(request.reward_id)),
            ReserveOutcome::NotFound => {
                return Err(ClaimError::RewardNotFound {
                    reward_id: request.reward_id,
                    event_id: request.event_id,
                });
            }
        };

        // 8. 写入成功记录（携带发放瞬间的奖励快照）
        //    并发重复领取在此处被部分唯一索引拦截，映射为 AlreadyClaimed
        //    后由外层改记 FAILED_ALREADY_CLAIMED
        let record = NewClaimRecord::success(
            request.user_id.clone(),
            request.event_id,
            request.reward_id,
            &reserved.snapshot(),
            Utc::now(),
        )?;
        self.ledger.append(record).await
    }

    /// 写入失败记录（尽力而为）
    ///
    /// 账本写入失败只记日志，不改变对外返回的错误
    async fn record_failure(&self, request: &ClaimRequest, status: ClaimStatus, reason: String) {
        let record = NewClaimRecord::failure(
            request.user_id.clone(),
            request.event_id,
            request.reward_id,
            status,
            reason,
        );
        if let Err(append_err) = self.ledger.append(record).await {
            error!(error = %append_err, ?status, "失败记录写入账本失败");
        }
    }
}
