//! 条件策略实现
//!
//! 每个策略处理一种条件类型标签。策略只回答「用户是否满足条件」，
//! 不修改任何状态。

use async_trait::async_trait;
use serde::Deserialize;
use tracing::warn;

use crate::error::Result;
use crate::models::EventCondition;

/// 条件策略接口
///
/// 按 `condition_type` 标签注册到评估器，参数从条件的 details 中解析
#[async_trait]
pub trait ConditionStrategy: Send + Sync {
    /// 本策略处理的条件类型标签
    fn condition_type(&self) -> &'static str;

    /// 判断用户是否满足条件
    async fn is_satisfied(&self, user_id: &str, condition: &EventCondition) -> Result<bool>;
}

/// 登录历史查询能力
///
/// 由外部账户服务提供；本引擎只依赖只读接口
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait LoginHistoryProvider: Send + Sync {
    /// 查询用户当前连续登录天数
    async fn consecutive_login_days(&self, user_id: &str) -> Result<i64>;
}

/// 连续登录条件策略
///
/// 参数：{ "days": 7 }
pub struct LoginStreakStrategy<P: LoginHistoryProvider> {
    provider: P,
}

#[derive(Debug, Deserialize)]
struct LoginStreakParams {
    days: i64,
}

impl<P: LoginHistoryProvider> LoginStreakStrategy<P> {
    pub fn new(provider: P) -> Self {
        Self { provider }
    }
}

#[async_trait]
impl<P: LoginHistoryProvider> ConditionStrategy for LoginStreakStrategy<P> {
    fn condition_type(&self) -> &'static str {
        "LOGIN_STREAK"
    }

    async fn is_satisfied(&self, user_id: &str, condition: &EventCondition) -> Result<bool> {
        let params: LoginStreakParams = match serde_json::from_value(condition.details.clone()) {
            Ok(params) => params,
            Err(e) => {
                // 参数不合法时拒绝而非放行
                warn!(error = %e, "连续登录条件参数解析失败");
                return Ok(false);
            }
        };

        let days = self.provider.consecutive_login_days(user_id).await?;
        Ok(days >= params.days)
    }
}

/// 人工审核条件策略
///
/// 运营侧在条件参数中直接写入审核结果：{ "approved": true }
pub struct ManualApprovalStrategy;

#[derive(Debug, Deserialize)]
struct ManualApprovalParams {
    #[serde(default)]
    approved: bool,
}

#[async_trait]
impl ConditionStrategy for ManualApprovalStrategy {
    fn condition_type(&self) -> &'static str {
        "MANUAL"
    }

    async fn is_satisfied(&self, _user_id: &str, condition: &EventCondition) -> Result<bool> {
        let params: ManualApprovalParams =
            serde_json::from_value(condition.details.clone()).unwrap_or(ManualApprovalParams {
                approved: false,
            });
        Ok(params.approved)
    }
}
