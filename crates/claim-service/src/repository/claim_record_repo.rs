//! 领取账本仓储
//!
//! 只追加的审计账本。每次领取尝试写入一条终态记录，写入后不再修改。
//! SUCCESS 记录受部分唯一索引保护，重复领取在数据库层被绝对拦截。

use async_trait::async_trait;
use sqlx::PgPool;
use tracing::instrument;
use uuid::Uuid;

use super::traits::ClaimLedgerTrait;
use crate::error::{ClaimError, Result};
use crate::models::{ClaimRecord, ClaimRecordFilter, ClaimStatus, NewClaimRecord};

/// PostgreSQL 唯一约束冲突
const SQLSTATE_UNIQUE_VIOLATION: &str = "23505";

/// 领取账本仓储
pub struct ClaimLedgerRepository {
    pool: PgPool,
}

impl ClaimLedgerRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    /// 追加一条领取记录
    ///
    /// SUCCESS 记录命中 (user_id, event_id, reward_id) 的部分唯一索引时
    /// 映射为 `AlreadyClaimed`，这是并发重复领取的最后防线
    #[instrument(skip(self, record), fields(user_id = %record.user_id, status = ?record.status))]
    pub async fn append(&self, record: NewClaimRecord) -> Result<ClaimRecord> {
        let inserted = sqlx::query_as::<_, ClaimRecord>(
            r#"
            INSERT INTO claim_records
                (user_id, event_id, reward_id, status, failure_reason,
                 processed_at, reward_snapshot)
            VALUES ($1, $2, $3, $4, $5, $6, $7)
            RETURNING id, user_id, event_id, reward_id, status, failure_reason,
                      processed_at, reward_snapshot, created_at, updated_at
            "#,
        )
        .bind(&record.user_id)
        .bind(record.event_id)
        .bind(record.reward_id)
        .bind(record.status)
        .bind(&record.failure_reason)
        .bind(record.processed_at)
        .bind(&record.reward_snapshot)
        .fetch_one(&self.pool)
        .await
        .map_err(|e| map_unique_violation(e, &record))?;

        Ok(inserted)
    }

    /// 检查用户是否已成功领取过该奖励
    pub async fn has_successful_claim(
        &self,
        user_id: &str,
        event_id: Uuid,
        reward_id: Uuid,
    ) -> Result<bool> {
        let exists = sqlx::query_scalar::<_, bool>(
            r#"
            SELECT EXISTS(
                SELECT 1 FROM claim_records
                WHERE user_id = $1 AND event_id = $2 AND reward_id = $3
                  AND status = 'SUCCESS'
            )
            "#,
        )
        .bind(user_id)
        .bind(event_id)
        .bind(reward_id)
        .fetch_one(&self.pool)
        .await?;

        Ok(exists)
    }

    /// 按用户查询领取历史
    ///
    /// 按创建时间倒序返回，供报表/管理端使用
    pub async fn list_by_user(
        &self,
        user_id: &str,
        filter: ClaimRecordFilter,
        limit: i64,
    ) -> Result<Vec<ClaimRecord>> {
        let records = sqlx::query_as::<_, ClaimRecord>(
            r#"
            SELECT id, user_id, event_id, reward_id, status, failure_reason,
                   processed_at, reward_snapshot, created_at, updated_at
            FROM claim_records
            WHERE user_id = $1
              AND ($2::uuid IS NULL OR event_id = $2)
              AND ($3::uuid IS NULL OR reward_id = $3)
              AND ($4::varchar IS NULL OR status = $4)
              AND ($5::timestamptz IS NULL OR created_at >= $5)
              AND ($6::timestamptz IS NULL OR created_at <= $6)
            ORDER BY created_at DESC
            LIMIT $7
            "#,
        )
        .bind(user_id)
        .bind(filter.event_id)
        .bind(filter.reward_id)
        .bind(filter.status)
        .bind(filter.created_from)
        .bind(filter.created_to)
        .bind(limit)
        .fetch_all(&self.pool)
        .await?;

        Ok(records)
    }
}

/// 唯一约束冲突映射为业务错误
///
/// 仅 SUCCESS 记录可能命中部分唯一索引
fn map_unique_violation(err: sqlx::Error, record: &NewClaimRecord) -> ClaimError {
    if record.status == ClaimStatus::Success {
        if let sqlx::Error::Database(ref db_err) = err {
            if db_err.code().as_deref() == Some(SQLSTATE_UNIQUE_VIOLATION) {
                return ClaimError::AlreadyClaimed {
                    user_id: record.user_id.clone(),
                    reward_id: record.reward_id,
                };
            }
        }
    }
    ClaimError::Database(err)
}

#[async_trait]
impl ClaimLedgerTrait for ClaimLedgerRepository {
    async fn append(&self, record: NewClaimRecord) -> Result<ClaimRecord> {
        self.append(record).await
    }

    async fn has_successful_claim(
        &self,
        user_id: &str,
        event_id: Uuid,
        reward_id: Uuid,
    ) -> Result<bool> {
        self.has_successful_claim(user_id, event_id, reward_id).await
    }

    async fn list_by_user(
        &self,
        user_id: &str,
        filter: ClaimRecordFilter,
        limit: i64,
    ) -> Result<Vec<ClaimRecord>> {
        self.list_by_user(user_id, filter, limit).await
    }
}
