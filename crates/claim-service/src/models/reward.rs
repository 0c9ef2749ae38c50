//! 奖励实体定义
//!
//! 奖励归属于唯一的事件，携带类型参数和库存计数。
//! `claimed_count` 只能由本引擎的原子预留操作递增。

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use uuid::Uuid;

use super::enums::RewardType;

/// 奖励
#[derive(Debug, Clone, Serialize, Deserialize, sqlx::FromRow)]
#[serde(rename_all = "camelCase")]
pub struct Reward {
    pub id: Uuid,
    /// 所属事件 ID
    pub event_id: Uuid,
    /// 奖励名称
    pub name: String,
    /// 奖励描述
    #[sqlx(default)]
    pub description: Option<String>,
    /// 奖励类型标签
    pub reward_type: String,
    /// 类型相关参数（JSON）
    /// 格式：{ "amount": 1000 } for POINTS, { "itemId": "...", "itemQuantity": 1 } for ITEM
    pub details: Value,
    /// 总库存，0 表示不限量
    pub quantity: i64,
    /// 已领取数量（单调不减）
    pub claimed_count: i64,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Reward {
    /// 是否不限量
    pub fn is_unlimited(&self) -> bool {
        self.quantity == 0
    }

    /// 库存是否已耗尽
    ///
    /// 仅作快速路径判断，权威判定由原子预留操作完成
    pub fn is_exhausted(&self) -> bool {
        !self.is_unlimited() && self.claimed_count >= self.quantity
    }

    /// 解析为已知奖励类型
    ///
    /// 类型标签以字符串存储以兼容未来扩展；未识别的标签返回 None
    pub fn known_type(&self) -> Option<RewardType> {
        serde_json::from_value(Value::String(self.reward_type.clone())).ok()
    }

    /// 解析为强类型奖励变体
    pub fn payload(&self) -> RewardPayload {
        RewardPayload::from_parts(&self.reward_type, &self.details)
    }

    /// 生成发放瞬间的奖励快照
    pub fn snapshot(&self) -> RewardSnapshot {
        RewardSnapshot {
            reward_id: self.id,
            name: self.name.clone(),
            reward_type: self.reward_type.clone(),
            details: self.details.clone(),
        }
    }
}

/// 强类型奖励变体
///
/// 已知类型的参数是结构化的；未知类型保留原始标签和参数包，
/// 保证新增奖励类型不会破坏既有流程
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum RewardPayload {
    /// 积分
    Points { amount: i64 },
    /// 道具
    Item { item_id: String, item_quantity: i64 },
    /// 优惠券
    Coupon { coupon_code: String },
    /// 虚拟货币
    VirtualCurrency { currency: String, amount: i64 },
    /// 未识别的扩展类型
    Unknown { reward_type: String, details: Value },
}

impl RewardPayload {
    /// 从类型标签和参数包解析
    pub fn from_parts(reward_type: &str, details: &Value) -> Self {
        let unknown = || Self::Unknown {
            reward_type: reward_type.to_string(),
            details: details.clone(),
        };

        match reward_type {
            "POINTS" => serde_json::from_value::<PointsParams>(details.clone())
                .map(|p| Self::Points { amount: p.amount })
                .unwrap_or_else(|_| unknown()),
            "ITEM" => serde_json::from_value::<ItemParams>(details.clone())
                .map(|p| Self::Item {
                    item_id: p.item_id,
                    item_quantity: p.item_quantity,
                })
                .unwrap_or_else(|_| unknown()),
            "COUPON" => serde_json::from_value::<CouponParams>(details.clone())
                .map(|p| Self::Coupon {
                    coupon_code: p.coupon_code,
                })
                .unwrap_or_else(|_| unknown()),
            "VIRTUAL_CURRENCY" => serde_json::from_value::<VirtualCurrencyParams>(details.clone())
                .map(|p| Self::VirtualCurrency {
                    currency: p.currency,
                    amount: p.amount,
                })
                .unwrap_or_else(|_| unknown()),
            _ => unknown(),
        }
    }
}

#[derive(Debug, Deserialize)]
struct PointsParams {
    amount: i64,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct ItemParams {
    item_id: String,
    #[serde(default = "default_item_quantity")]
    item_quantity: i64,
}

fn default_item_quantity() -> i64 {
    1
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct CouponParams {
    coupon_code: String,
}

#[derive(Debug, Deserialize)]
struct VirtualCurrencyParams {
    currency: String,
    amount: i64,
}

/// 奖励快照
///
/// 成功记录中保存的发放瞬间奖励信息，独立于奖励目录的后续变更
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RewardSnapshot {
    pub reward_id: Uuid,
    pub name: String,
    pub reward_type: String,
    pub details: Value,
}
