//! 奖励平台共享基础设施
//!
//! 为各服务提供统一的配置加载、数据库连接池和可观测性初始化。
//!
//! ## 模块结构
//!
//! - `config`: 配置管理（文件 + 环境变量分层加载）
//! - `database`: PostgreSQL 连接池管理
//! - `observability`: 结构化日志初始化
//! - `error`: 共享错误类型

pub mod config;
pub mod database;
pub mod error;
pub mod observability;

pub use config::{AppConfig, DatabaseConfig, ObservabilityConfig, ServerConfig};
pub use database::Database;
pub use error::{Result, SharedError};
