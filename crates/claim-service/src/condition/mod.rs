//! 领取条件评估
//!
//! 条件评估与领取流程解耦：处理器只依赖 `ConditionEvaluator` 接口，
//! 具体条件语义由策略注册表按类型标签分发。评估过程只读，不产生副作用。

mod evaluator;
mod strategies;

pub use evaluator::{ConditionEvaluator, StrategyConditionEvaluator};
pub use strategies::{ConditionStrategy, LoginHistoryProvider, LoginStreakStrategy, ManualApprovalStrategy};

#[cfg(test)]
pub use evaluator::MockConditionEvaluator;
