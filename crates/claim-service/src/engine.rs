//! 引擎装配
//!
//! 把配置、数据库连接、仓储、条件评估器和处理器装配成可直接使用的
//! 入口。宿主进程（gRPC/HTTP 服务或队列消费者）只需要持有
//! `ClaimEngine` 并调用其方法。

use std::sync::Arc;

use tracing::info;
use uuid::Uuid;

use reward_shared::config::AppConfig;
use reward_shared::database::Database;

use crate::condition::{ConditionEvaluator, StrategyConditionEvaluator};
use crate::error::Result;
use crate::models::{ClaimRecord, ClaimRecordFilter, Event, Reward};
use crate::repository::{ClaimLedgerRepository, EventRepository, RewardRepository};
use crate::service::{ClaimProcessor, ClaimDecision, ClaimRequest};

/// 领取引擎
///
/// 持有数据库连接和装配好的处理器
pub struct ClaimEngine {
    db: Database,
    event_repo: Arc<EventRepository>,
    processor: ClaimProcessor<EventRepository, RewardRepository, ClaimLedgerRepository>,
}

impl ClaimEngine {
    /// 按配置连接数据库并装配引擎
    ///
    /// 使用默认的策略评估器；需要定制条件策略时用 `with_evaluator`
    pub async fn connect(config: &AppConfig) -> anyhow::Result<Self> {
        Self::with_evaluator(config, Arc::new(StrategyConditionEvaluator::new())).await
    }

    /// 按配置连接数据库，使用指定的条件评估器装配引擎
    pub async fn with_evaluator(
        config: &AppConfig,
        evaluator: Arc<dyn ConditionEvaluator>,
    ) -> anyhow::Result<Self> {
        let db = Database::connect(&config.database).await?;
        db.health_check().await?;
        info!("数据库连接就绪");

        Ok(Self::from_parts(db, evaluator))
    }

    /// 从已有连接装配引擎（测试和嵌入场景）
    pub fn from_parts(db: Database, evaluator: Arc<dyn ConditionEvaluator>) -> Self {
        let pool = db.pool().clone();
        let event_repo = Arc::new(EventRepository::new(pool.clone()));
        let processor = ClaimProcessor::new(
            event_repo.clone(),
            Arc::new(RewardRepository::new(pool.clone())),
            Arc::new(ClaimLedgerRepository::new(pool)),
            evaluator,
        );

        Self {
            db,
            event_repo,
            processor,
        }
    }

    /// 运行数据库迁移
    pub async fn run_migrations(&self) -> anyhow::Result<()> {
        self.db.run_migrations().await?;
        Ok(())
    }

    /// 处理一次领取请求，返回对外决策
    pub async fn claim(&self, request: ClaimRequest) -> ClaimDecision {
        ClaimDecision::from_result(self.processor.process(request).await)
    }

    /// 处理一次领取请求，返回账本记录（内部调用方使用）
    pub async fn process(&self, request: ClaimRequest) -> Result<ClaimRecord> {
        self.processor.process(request).await
    }

    /// 按用户查询领取历史
    pub async fn list_user_claims(
        &self,
        user_id: &str,
        filter: ClaimRecordFilter,
        limit: i64,
    ) -> Result<Vec<ClaimRecord>> {
        self.processor.list_user_claims(user_id, filter, limit).await
    }

    /// 列出事件下的所有奖励
    pub async fn list_event_rewards(&self, event_id: Uuid) -> Result<Vec<Reward>> {
        self.processor.list_event_rewards(event_id).await
    }

    /// 查询单个事件
    pub async fn get_event(&self, event_id: Uuid) -> Result<Option<Event>> {
        self.event_repo.get_by_id(event_id).await
    }

    /// 关闭数据库连接
    pub async fn shutdown(&self) {
        self.db.close().await;
        info!("领取引擎已关闭");
    }
}
