//! 服务层
//!
//! 实现领取业务逻辑，协调仓储层和条件评估。
//!
//! ## 模块结构
//!
//! - `dto`: 数据传输对象定义
//! - `claim_processor`: 领取处理器（核心流程）

pub mod claim_processor;
pub mod dto;

pub use claim_processor::ClaimProcessor;
pub use dto::*;
