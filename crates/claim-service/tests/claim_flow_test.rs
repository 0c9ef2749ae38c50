//! 领取流程集成测试
//!
//! 使用真实 PostgreSQL 验证并发属性：限量奖励不超发、同一用户重复
//! 领取只成功一次。原子预留和部分唯一索引的行为无法通过纯 mock
//! 覆盖，因此需要集成测试。
//!
//! ## 运行方式
//!
//! ```bash
//! REWARD_TEST_DATABASE_URL=postgres://... \
//!   cargo test --test claim_flow_test -- --ignored
//! ```
//!
//! 测试前需要先在目标库上执行 migrations/ 下的迁移。

use std::sync::Arc;

use chrono::{Duration, Utc};
use sqlx::PgPool;
use uuid::Uuid;

use claim_service::condition::StrategyConditionEvaluator;
use claim_service::error::ClaimError;
use claim_service::models::{ClaimRecordFilter, ClaimStatus};
use claim_service::repository::{
    ClaimLedgerRepository, EventRepository, ReserveOutcome, RewardRepository,
};
use claim_service::service::{ClaimProcessor, ClaimRequest};

// ==================== 辅助函数 ====================

/// 从环境变量读取数据库 URL，未设置则 panic
fn database_url() -> String {
    std::env::var("REWARD_TEST_DATABASE_URL")
        .expect("REWARD_TEST_DATABASE_URL must be set for integration tests")
}

fn setup_processor(
    pool: &PgPool,
) -> ClaimProcessor<EventRepository, RewardRepository, ClaimLedgerRepository> {
    ClaimProcessor::new(
        Arc::new(EventRepository::new(pool.clone())),
        Arc::new(RewardRepository::new(pool.clone())),
        Arc::new(ClaimLedgerRepository::new(pool.clone())),
        Arc::new(StrategyConditionEvaluator::new()),
    )
}

/// 插入一个进行中的测试事件，返回事件 ID
async fn seed_active_event(pool: &PgPool) -> Uuid {
    let now = Utc::now();
    sqlx::query_scalar(
        r#"
        INSERT INTO events (name, status, start_date, end_date, created_by)
        VALUES ($1, 'ACTIVE', $2, $3, 'integ-test')
        RETURNING id
        "#,
    )
    .bind(format!("integ-event-{}", Uuid::new_v4()))
    .bind(now - Duration::hours(1))
    .bind(now + Duration::hours(1))
    .fetch_one(pool)
    .await
    .expect("插入测试事件失败")
}

/// 插入一个测试奖励，返回奖励 ID
async fn seed_reward(pool: &PgPool, event_id: Uuid, quantity: i64) -> Uuid {
    sqlx::query_scalar(
        r#"
        INSERT INTO rewards (event_id, name, reward_type, details, quantity, claimed_count)
        VALUES ($1, '1000 积分', 'POINTS', '{"amount": 1000}', $2, 0)
        RETURNING id
        "#,
    )
    .bind(event_id)
    .bind(quantity)
    .fetch_one(pool)
    .await
    .expect("插入测试奖励失败")
}

async fn claimed_count(pool: &PgPool, reward_id: Uuid) -> i64 {
    sqlx::query_scalar("SELECT claimed_count FROM rewards WHERE id = $1")
        .bind(reward_id)
        .fetch_one(pool)
        .await
        .expect("查询库存计数失败")
}

async fn count_records(pool: &PgPool, reward_id: Uuid, status: ClaimStatus) -> i64 {
    sqlx::query_scalar(
        "SELECT COUNT(*) FROM claim_records WHERE reward_id = $1 AND status = $2",
    )
    .bind(reward_id)
    .bind(status)
    .fetch_one(pool)
    .await
    .expect("查询领取记录失败")
}

fn request(user_id: &str, event_id: Uuid, reward_id: Uuid) -> ClaimRequest {
    ClaimRequest {
        user_id: user_id.to_string(),
        event_id,
        reward_id,
    }
}

// ==================== 测试用例 ====================

#[tokio::test]
#[ignore = "需要 PostgreSQL"]
async fn test_single_claim_success() {
    let pool = PgPool::connect(&database_url()).await.unwrap();
    let event_id = seed_active_event(&pool).await;
    let reward_id = seed_reward(&pool, event_id, 10).await;
    let processor = setup_processor(&pool);

    let record = processor
        .process(request("integ-u1", event_id, reward_id))
        .await
        .unwrap();

    assert_eq!(record.status, ClaimStatus::Success);
    let snapshot = record.parse_reward_snapshot().unwrap().unwrap();
    assert_eq!(snapshot.reward_type, "POINTS");
    assert_eq!(claimed_count(&pool, reward_id).await, 1);
}

#[tokio::test]
#[ignore = "需要 PostgreSQL"]
async fn test_retry_after_success_is_rejected() {
    let pool = PgPool::connect(&database_url()).await.unwrap();
    let event_id = seed_active_event(&pool).await;
    let reward_id = seed_reward(&pool, event_id, 10).await;
    let processor = setup_processor(&pool);

    processor
        .process(request("integ-u1", event_id, reward_id))
        .await
        .unwrap();
    let err = processor
        .process(request("integ-u1", event_id, reward_id))
        .await
        .unwrap_err();

    assert!(matches!(err, ClaimError::AlreadyClaimed { .. }));
    // 库存只被消耗一次，且重试留下了失败记录
    assert_eq!(claimed_count(&pool, reward_id).await, 1);
    assert_eq!(
        count_records(&pool, reward_id, ClaimStatus::FailedAlreadyClaimed).await,
        1
    );
}

#[tokio::test]
#[ignore = "需要 PostgreSQL"]
async fn test_concurrent_claims_never_oversell() {
    let pool = PgPool::connect(&database_url()).await.unwrap();
    let event_id = seed_active_event(&pool).await;
    let reward_id = seed_reward(&pool, event_id, 5).await;
    let processor = Arc::new(setup_processor(&pool));

    // 20 个不同用户并发抢 5 个库存
    let mut handles = Vec::new();
    for i in 0..20 {
        let processor = processor.clone();
        handles.push(tokio::spawn(async move {
            processor
                .process(request(&format!("integ-c{}", i), event_id, reward_id))
                .await
        }));
    }

    let mut successes = 0;
    let mut out_of_stock = 0;
    for joined in futures::future::join_all(handles).await {
        match joined.unwrap() {
            Ok(_) => successes += 1,
            Err(ClaimError::OutOfStock(_)) => out_of_stock += 1,
            Err(other) => panic!("unexpected error: {:?}", other),
        }
    }

    assert_eq!(successes, 5);
    assert_eq!(out_of_stock, 15);
    assert_eq!(claimed_count(&pool, reward_id).await, 5);
    assert_eq!(count_records(&pool, reward_id, ClaimStatus::Success).await, 5);
    assert_eq!(
        count_records(&pool, reward_id, ClaimStatus::FailedOutOfStock).await,
        15
    );
}

#[tokio::test]
#[ignore = "需要 PostgreSQL"]
async fn test_concurrent_duplicate_claims_succeed_once() {
    let pool = PgPool::connect(&database_url()).await.unwrap();
    let event_id = seed_active_event(&pool).await;
    let reward_id = seed_reward(&pool, event_id, 100).await;
    let processor = Arc::new(setup_processor(&pool));

    // 同一用户并发提交 10 次
    let mut handles = Vec::new();
    for _ in 0..10 {
        let processor = processor.clone();
        handles.push(tokio::spawn(async move {
            processor
                .process(request("integ-dup", event_id, reward_id))
                .await
        }));
    }

    let mut successes = 0;
    for joined in futures::future::join_all(handles).await {
        match joined.unwrap() {
            Ok(_) => successes += 1,
            Err(ClaimError::AlreadyClaimed { .. }) => {}
            Err(other) => panic!("unexpected error: {:?}", other),
        }
    }

    // 部分唯一索引保证恰好一次成功
    assert_eq!(successes, 1);
    assert_eq!(count_records(&pool, reward_id, ClaimStatus::Success).await, 1);
}

#[tokio::test]
#[ignore = "需要 PostgreSQL"]
async fn test_unlimited_reward_accepts_all() {
    let pool = PgPool::connect(&database_url()).await.unwrap();
    let event_id = seed_active_event(&pool).await;
    let reward_id = seed_reward(&pool, event_id, 0).await;
    let processor = Arc::new(setup_processor(&pool));

    let mut handles = Vec::new();
    for i in 0..8 {
        let processor = processor.clone();
        handles.push(tokio::spawn(async move {
            processor
                .process(request(&format!("integ-unl{}", i), event_id, reward_id))
                .await
        }));
    }

    for joined in futures::future::join_all(handles).await {
        joined.unwrap().unwrap();
    }

    assert_eq!(claimed_count(&pool, reward_id).await, 8);
}

#[tokio::test]
#[ignore = "需要 PostgreSQL"]
async fn test_inactive_event_rejected_before_stock() {
    let pool = PgPool::connect(&database_url()).await.unwrap();
    let event_id = seed_active_event(&pool).await;
    // 库存为 0 的限量奖励 + 事件下线：必须先报事件无效
    let reward_id = seed_reward(&pool, event_id, 1).await;
    sqlx::query("UPDATE rewards SET claimed_count = 1 WHERE id = $1")
        .bind(reward_id)
        .execute(&pool)
        .await
        .unwrap();
    sqlx::query("UPDATE events SET status = 'INACTIVE' WHERE id = $1")
        .bind(event_id)
        .execute(&pool)
        .await
        .unwrap();

    let processor = setup_processor(&pool);
    let err = processor
        .process(request("integ-u2", event_id, reward_id))
        .await
        .unwrap_err();

    assert!(matches!(err, ClaimError::EventInactive(_)));
    assert_eq!(
        count_records(&pool, reward_id, ClaimStatus::FailedEventInactive).await,
        1
    );
}

#[tokio::test]
#[ignore = "需要 PostgreSQL"]
async fn test_unknown_event_appends_no_record() {
    let pool = PgPool::connect(&database_url()).await.unwrap();
    let processor = setup_processor(&pool);
    let reward_id = Uuid::new_v4();

    let err = processor
        .process(request("integ-u3", Uuid::new_v4(), reward_id))
        .await
        .unwrap_err();

    assert!(matches!(err, ClaimError::EventNotFound(_)));
    let total: i64 =
        sqlx::query_scalar("SELECT COUNT(*) FROM claim_records WHERE reward_id = $1")
            .bind(reward_id)
            .fetch_one(&pool)
            .await
            .unwrap();
    assert_eq!(total, 0);
}

#[tokio::test]
#[ignore = "需要 PostgreSQL"]
async fn test_reserve_one_distinguishes_missing_from_exhausted() {
    let pool = PgPool::connect(&database_url()).await.unwrap();
    let event_id = seed_active_event(&pool).await;
    let reward_id = seed_reward(&pool, event_id, 1).await;
    let repo = RewardRepository::new(pool.clone());

    // 有库存：预留成功并返回递增后的计数
    match repo.reserve_one(reward_id, event_id).await.unwrap() {
        ReserveOutcome::Reserved(reward) => assert_eq!(reward.claimed_count, 1),
        other => panic!("expected Reserved, got {:?}", other),
    }

    // 库存耗尽
    assert!(matches!(
        repo.reserve_one(reward_id, event_id).await.unwrap(),
        ReserveOutcome::OutOfStock
    ));
    assert_eq!(claimed_count(&pool, reward_id).await, 1);

    // 奖励不存在
    assert!(matches!(
        repo.reserve_one(Uuid::new_v4(), event_id).await.unwrap(),
        ReserveOutcome::NotFound
    ));

    // 归属事件不匹配视同不存在
    let other_event = seed_active_event(&pool).await;
    assert!(matches!(
        repo.reserve_one(reward_id, other_event).await.unwrap(),
        ReserveOutcome::NotFound
    ));
}

#[tokio::test]
#[ignore = "需要 PostgreSQL"]
async fn test_list_user_claims_newest_first() {
    let pool = PgPool::connect(&database_url()).await.unwrap();
    let event_id = seed_active_event(&pool).await;
    let first = seed_reward(&pool, event_id, 10).await;
    let second = seed_reward(&pool, event_id, 10).await;
    let processor = setup_processor(&pool);
    let user_id = format!("integ-hist-{}", Uuid::new_v4());

    processor
        .process(request(&user_id, event_id, first))
        .await
        .unwrap();
    processor
        .process(request(&user_id, event_id, second))
        .await
        .unwrap();

    let records = processor
        .list_user_claims(&user_id, ClaimRecordFilter::default(), 10)
        .await
        .unwrap();

    assert_eq!(records.len(), 2);
    assert!(records[0].created_at >= records[1].created_at);

    // 按奖励过滤
    let filtered = processor
        .list_user_claims(
            &user_id,
            ClaimRecordFilter {
                reward_id: Some(first),
                ..Default::default()
            },
            10,
        )
        .await
        .unwrap();
    assert_eq!(filtered.len(), 1);
    assert_eq!(filtered[0].reward_id, first);
}
