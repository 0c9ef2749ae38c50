//! 事件目录仓储
//!
//! 提供事件的只读数据访问

use async_trait::async_trait;
use sqlx::PgPool;
use uuid::Uuid;

use super::traits::EventRepositoryTrait;
use crate::error::Result;
use crate::models::Event;

/// 事件目录仓储
pub struct EventRepository {
    pool: PgPool,
}

impl EventRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    /// 获取单个事件
    pub async fn get_by_id(&self, event_id: Uuid) -> Result<Option<Event>> {
        let event = sqlx::query_as::<_, Event>(
            r#"
            SELECT id, name, description, status, start_date, end_date,
                   conditions, created_by, created_at, updated_at
            FROM events
            WHERE id = $1
            "#,
        )
        .bind(event_id)
        .fetch_optional(&self.pool)
        .await?;

        Ok(event)
    }
}

#[async_trait]
impl EventRepositoryTrait for EventRepository {
    async fn get_by_id(&self, event_id: Uuid) -> Result<Option<Event>> {
        self.get_by_id(event_id).await
    }
}
