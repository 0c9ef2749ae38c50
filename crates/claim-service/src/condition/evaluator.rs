//! 条件评估器
//!
//! 处理器依赖的评估接口及其策略注册表实现。

use std::collections::HashMap;
use std::sync::Arc;

use async_trait::async_trait;
use tracing::warn;

use super::strategies::ConditionStrategy;
use crate::error::Result;
use crate::models::Event;

/// 条件评估接口
///
/// 评估只读；失败不在此处记录，由处理器统一落账
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait ConditionEvaluator: Send + Sync {
    /// 判断用户是否满足事件的领取条件
    async fn evaluate(&self, user_id: &str, event: &Event) -> Result<bool>;
}

/// 基于策略注册表的条件评估器
///
/// 按条件类型标签分发到注册的策略：
/// - 事件未配置条件：满足
/// - 标签命中注册策略：由策略裁定
/// - 标签未注册：不满足（新条件类型在策略就绪前不放行）
pub struct StrategyConditionEvaluator {
    strategies: HashMap<&'static str, Arc<dyn ConditionStrategy>>,
}

impl StrategyConditionEvaluator {
    pub fn new() -> Self {
        Self {
            strategies: HashMap::new(),
        }
    }

    /// 注册一个条件策略
    pub fn register(mut self, strategy: Arc<dyn ConditionStrategy>) -> Self {
        self.strategies.insert(strategy.condition_type(), strategy);
        self
    }
}

impl Default for StrategyConditionEvaluator {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl ConditionEvaluator for StrategyConditionEvaluator {
    async fn evaluate(&self, user_id: &str, event: &Event) -> Result<bool> {
        let condition = match event.parse_conditions()? {
            Some(condition) => condition,
            None => return Ok(true),
        };

        match self.strategies.get(condition.condition_type.as_str()) {
            Some(strategy) => strategy.is_satisfied(user_id, &condition).await,
            None => {
                warn!(
                    event_id = %event.id,
                    condition_type = %condition.condition_type,
                    "条件类型未注册策略，按不满足处理"
                );
                Ok(false)
            }
        }
    }
}
