//! 数据库仓储层
//!
//! 提供事件、奖励、领取记录三类实体的数据访问，封装 SQL 操作细节。
//!
//! ## 设计原则
//!
//! - 仓储只负责数据持久化，不包含业务逻辑
//! - 使用 SQLx 进行类型安全的数据库操作
//! - 定义 trait 接口以支持 mock 测试
//! - 库存递增只暴露原子预留一条路径

mod claim_record_repo;
mod event_repo;
mod reward_repo;
mod traits;

pub use claim_record_repo::ClaimLedgerRepository;
pub use event_repo::EventRepository;
pub use reward_repo::RewardRepository;
pub use traits::*;
