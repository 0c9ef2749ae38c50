//! 奖励领取引擎
//!
//! 处理用户对事件奖励的领取请求，在并发场景下保证限量奖励不超发、
//! 单用户单奖励不重复领取，并为每次尝试留下不可变的审计记录。
//!
//! ## 核心功能
//!
//! - **领取处理**：事件有效性、重复领取、库存、条件的有序检查
//! - **原子预留**：库存判定和递增在单条条件更新内完成，杜绝超发
//! - **重复防线**：账本上的部分唯一索引绝对拦截并发重复领取
//! - **审计账本**：每次尝试恰好一条终态记录，成功记录携带奖励快照
//! - **条件评估**：按类型标签分发的策略注册表，未知类型不放行
//!
//! ## 模块结构
//!
//! - `models`: 领域模型定义
//! - `error`: 错误类型定义
//! - `repository`: 数据库仓储层
//! - `condition`: 领取条件评估
//! - `service`: 业务服务层
//! - `engine`: 引擎装配入口

pub mod condition;
pub mod engine;
pub mod error;
pub mod models;
pub mod repository;
pub mod service;

pub use condition::{
    ConditionEvaluator, ConditionStrategy, LoginHistoryProvider, LoginStreakStrategy,
    ManualApprovalStrategy, StrategyConditionEvaluator,
};
pub use engine::ClaimEngine;
pub use error::{ClaimError, Result};
pub use models::*;
pub use repository::{ClaimLedgerRepository, EventRepository, RewardRepository};
pub use service::{ClaimDecision, ClaimProcessor, ClaimRequest, RejectionKind, dto};
