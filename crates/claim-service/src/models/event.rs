//! 事件实体定义
//!
//! 事件是奖励的归属单位，携带状态、时间窗口和可选的领取条件描述。
//! 事件的创建和修改由目录管理服务负责，本引擎只读。

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use uuid::Uuid;

use super::enums::EventStatus;

/// 事件
#[derive(Debug, Clone, Serialize, Deserialize, sqlx::FromRow)]
#[serde(rename_all = "camelCase")]
pub struct Event {
    pub id: Uuid,
    /// 事件名称
    pub name: String,
    /// 事件描述
    #[sqlx(default)]
    pub description: Option<String>,
    /// 事件状态
    pub status: EventStatus,
    /// 开始时间
    pub start_date: DateTime<Utc>,
    /// 结束时间
    pub end_date: DateTime<Utc>,
    /// 领取条件描述（JSON）
    /// 格式：{ "conditionType": "LOGIN_STREAK", "details": { "days": 3 }, "description": "..." }
    #[sqlx(default)]
    pub conditions: Option<Value>,
    /// 创建者 ID（运营/管理员，来自认证服务）
    pub created_by: String,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Event {
    /// 检查事件当前是否可领取
    ///
    /// 状态为 ACTIVE 且当前时间落在 [start_date, end_date] 区间内
    pub fn is_claimable(&self, now: DateTime<Utc>) -> bool {
        self.status == EventStatus::Active && now >= self.start_date && now <= self.end_date
    }

    /// 解析领取条件描述
    ///
    /// 事件未配置条件时返回 Ok(None)
    pub fn parse_conditions(&self) -> Result<Option<EventCondition>, serde_json::Error> {
        match &self.conditions {
            Some(value) => serde_json::from_value(value.clone()).map(Some),
            None => Ok(None),
        }
    }
}

/// 领取条件描述
///
/// 类型标签 + 自由参数包 + 可读说明。参数的具体含义由对应的
/// 条件策略解释，本结构只负责携带。
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct EventCondition {
    /// 条件类型标签
    pub condition_type: String,
    /// 条件参数（JSON，结构随类型不同）
    #[serde(default)]
    pub details: Value,
    /// 用户可读的条件说明
    #[serde(default)]
    pub description: Option<String>,
}

impl EventCondition {
    /// 解析为强类型条件变体
    ///
    /// 已知类型解析出结构化参数，未知类型保留原始标签和参数包
    pub fn kind(&self) -> ConditionKind {
        match self.condition_type.as_str() {
            "LOGIN_STREAK" => serde_json::from_value(self.details.clone())
                .map(|p: LoginStreakParams| ConditionKind::LoginStreak { days: p.days })
                .unwrap_or_else(|_| self.unknown()),
            "FRIEND_INVITE" => serde_json::from_value(self.details.clone())
                .map(|p: FriendInviteParams| ConditionKind::FriendInvite {
                    invitees: p.invitees,
                })
                .unwrap_or_else(|_| self.unknown()),
            "QUEST_CLEAR" => serde_json::from_value(self.details.clone())
                .map(|p: QuestClearParams| ConditionKind::QuestClear {
                    quest_id: p.quest_id,
                })
                .unwrap_or_else(|_| self.unknown()),
            "MANUAL" => ConditionKind::Manual,
            _ => self.unknown(),
        }
    }

    fn unknown(&self) -> ConditionKind {
        ConditionKind::Unknown {
            condition_type: self.condition_type.clone(),
            details: self.details.clone(),
        }
    }
}

#[derive(Debug, Deserialize)]
struct LoginStreakParams {
    days: i64,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct FriendInviteParams {
    invitees: i64,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct QuestClearParams {
    quest_id: String,
}

/// 强类型条件变体
///
/// 已知类型的参数是结构化的；未知类型保留原始负载以保证向前兼容
#[derive(Debug, Clone, PartialEq)]
pub enum ConditionKind {
    /// 连续登录 N 天
    LoginStreak { days: i64 },
    /// 邀请 N 位好友
    FriendInvite { invitees: i64 },
    /// 通关指定任务
    QuestClear { quest_id: String },
    /// 运营人工判定
    Manual,
    /// 未识别的扩展类型
    Unknown {
        condition_type: String,
        details: Value,
    },
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Duration;
    use serde_json::json;

    fn create_test_event() -> Event {
        let now = Utc::now();
        Event {
            id: Uuid::new_v4(),
            name: "夏季签到活动".to_string(),
            description: None,
            status: EventStatus::Active,
            start_date: now - Duration::days(1),
            end_date: now + Duration::days(1),
            conditions: None,
            created_by: "op-001".to_string(),
            created_at: now,
            updated_at: now,
        }
    }

    #[test]
    fn test_event_is_claimable() {
        let now = Utc::now();
        let mut event = create_test_event();

        assert!(event.is_claimable(now));

        // 状态非 ACTIVE
        event.status = EventStatus::Inactive;
        assert!(!event.is_claimable(now));

        // 状态 ACTIVE 但尚未开始
        event.status = EventStatus::Active;
        event.start_date = now + Duration::hours(1);
        assert!(!event.is_claimable(now));

        // 已过结束时间
        event.start_date = now - Duration::days(2);
        event.end_date = now - Duration::days(1);
        assert!(!event.is_claimable(now));
    }

    #[test]
    fn test_event_window_is_inclusive() {
        let now = Utc::now();
        let mut event = create_test_event();
        event.start_date = now;
        event.end_date = now;

        assert!(event.is_claimable(now));
    }

    #[test]
    fn test_parse_conditions_absent() {
        let event = create_test_event();
        assert!(event.parse_conditions().unwrap().is_none());
    }

    #[test]
    fn test_parse_conditions_login_streak() {
        let mut event = create_test_event();
        event.conditions = Some(json!({
            "conditionType": "LOGIN_STREAK",
            "details": { "days": 3 },
            "description": "连续登录 3 天"
        }));

        let condition = event.parse_conditions().unwrap().unwrap();
        assert_eq!(condition.condition_type, "LOGIN_STREAK");
        assert_eq!(condition.kind(), ConditionKind::LoginStreak { days: 3 });
        assert_eq!(condition.description.as_deref(), Some("连续登录 3 天"));
    }

    #[test]
    fn test_condition_kind_quest_clear() {
        let condition = EventCondition {
            condition_type: "QUEST_CLEAR".to_string(),
            details: json!({ "questId": "quest-42" }),
            description: None,
        };
        assert_eq!(
            condition.kind(),
            ConditionKind::QuestClear {
                quest_id: "quest-42".to_string()
            }
        );
    }

    #[test]
    fn test_condition_kind_unknown_tag() {
        let condition = EventCondition {
            condition_type: "GUILD_LEVEL".to_string(),
            details: json!({ "level": 10 }),
            description: None,
        };
        match condition.kind() {
            ConditionKind::Unknown {
                condition_type,
                details,
            } => {
                assert_eq!(condition_type, "GUILD_LEVEL");
                assert_eq!(details["level"], 10);
            }
            other => panic!("expected Unknown, got {:?}", other),
        }
    }

    #[test]
    fn test_condition_kind_malformed_params_fall_back_to_unknown() {
        // 已知标签但参数结构不符时不应 panic，按未知类型处理
        let condition = EventCondition {
            condition_type: "LOGIN_STREAK".to_string(),
            details: json!({ "daily": true }),
            description: None,
        };
        assert!(matches!(condition.kind(), ConditionKind::Unknown { .. }));
    }
}
