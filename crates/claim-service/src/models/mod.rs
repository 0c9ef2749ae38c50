//! 领域模型定义
//!
//! 包含事件、奖励、领取记录三类实体及其枚举类型

mod claim_record;
mod enums;
mod event;
mod reward;

pub use claim_record::{ClaimRecord, ClaimRecordFilter, NewClaimRecord};
pub use enums::{ClaimStatus, EventStatus, RewardType};
pub use event::{ConditionKind, Event, EventCondition};
pub use reward::{Reward, RewardPayload, RewardSnapshot};
