//! 领取服务枚举类型定义
//!
//! 所有枚举都支持数据库（sqlx）和 JSON（serde）序列化

use serde::{Deserialize, Serialize};

/// 事件状态
///
/// 控制事件是否可参与领取，状态与时间窗口共同决定领取资格
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize, sqlx::Type)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
#[sqlx(type_name = "varchar", rename_all = "SCREAMING_SNAKE_CASE")]
pub enum EventStatus {
    /// 预告中 - 尚未开始，不可领取
    #[default]
    Upcoming,
    /// 进行中 - 在时间窗口内可领取
    Active,
    /// 已停用 - 运营手动下线，不可领取
    Inactive,
    /// 已结束 - 期间届满
    Ended,
}

/// 奖励类型
///
/// 区分奖励的发放形态，参数结构由 `RewardPayload` 按类型解析
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, sqlx::Type)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
#[sqlx(type_name = "varchar", rename_all = "SCREAMING_SNAKE_CASE")]
pub enum RewardType {
    /// 积分
    Points,
    /// 道具
    Item,
    /// 优惠券
    Coupon,
    /// 虚拟货币
    VirtualCurrency,
}

/// 领取记录状态
///
/// 每次领取尝试产生一条不可变记录，状态在创建时即为终态
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, sqlx::Type)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
#[sqlx(type_name = "varchar", rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ClaimStatus {
    /// 发放成功
    Success,
    /// 条件未满足
    FailedConditionNotMet,
    /// 已领取过
    FailedAlreadyClaimed,
    /// 库存不足
    FailedOutOfStock,
    /// 事件未激活或不在期间内
    FailedEventInactive,
    /// 系统错误
    FailedError,
}

impl ClaimStatus {
    /// 是否为成功状态
    pub fn is_success(&self) -> bool {
        matches!(self, Self::Success)
    }
}
