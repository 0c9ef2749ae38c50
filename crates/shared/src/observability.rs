//! 可观测性模块
//!
//! 提供结构化日志的初始化。日志级别和格式来自 `ObservabilityConfig`，
//! 支持 RUST_LOG 环境变量覆盖。

use anyhow::Result;
use tracing_subscriber::{
    EnvFilter, Layer,
    fmt::{self, format::FmtSpan},
    layer::SubscriberExt,
    util::SubscriberInitExt,
};

use crate::config::ObservabilityConfig;

/// 初始化 tracing 日志
///
/// 返回 Err 表示全局 subscriber 已被设置（例如测试中重复初始化）。
pub fn init(config: &ObservabilityConfig) -> Result<()> {
    // 构建环境过滤器
    let env_filter = EnvFilter::try_from_default_env()
        .or_else(|_| EnvFilter::try_new(&config.log_level))
        .unwrap_or_else(|_| EnvFilter::new("info"));

    // 构建日志层
    let fmt_layer = if config.log_format == "json" {
        fmt::layer()
            .json()
            .with_span_events(FmtSpan::CLOSE)
            .with_target(true)
            .with_thread_ids(true)
            .boxed()
    } else {
        fmt::layer()
            .with_target(true)
            .with_thread_ids(false)
            .with_ansi(true)
            .boxed()
    };

    tracing_subscriber::registry()
        .with(env_filter)
        .with(fmt_layer)
        .try_init()?;

    Ok(())
}

/// 测试用初始化：重复调用不报错
pub fn init_for_tests() {
    let config = ObservabilityConfig {
        log_level: "debug".to_string(),
        log_format: "pretty".to_string(),
    };
    let _ = init(&config);
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_init_is_idempotent_for_tests() {
        init_for_tests();
        init_for_tests();
    }

    #[test]
    fn test_init_respects_config_level() {
        let config = ObservabilityConfig {
            log_level: "warn".to_string(),
            log_format: "json".to_string(),
        };
        // 第一次调用可能成功也可能因为其他测试已初始化而失败，均不应 panic
        let _ = init(&config);
    }
}
