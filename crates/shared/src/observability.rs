//! 可观测性初始化
//!
//! 统一初始化结构化日志（tracing）和 Prometheus 指标导出，
//! 所有二进制通过单一入口配置，保证一致的日志格式和指标命名。

use anyhow::Result;
use metrics_exporter_prometheus::PrometheusBuilder;
use std::net::{Ipv4Addr, SocketAddr};
use tracing::info;
use tracing_subscriber::{
    EnvFilter, Layer,
    fmt,
    layer::SubscriberExt,
    util::SubscriberInitExt,
};

use crate::config::ObservabilityConfig;

/// 初始化日志与指标
///
/// 日志级别优先级：RUST_LOG 环境变量 > 配置文件 log_level > "info"。
/// `log_format = "json"` 时输出结构化日志（生产），否则为人类可读格式（开发）。
/// `metrics_enabled` 时在 `metrics_port` 上启动 Prometheus 拉取端点。
pub fn init(config: &ObservabilityConfig) -> Result<()> {
    let env_filter = EnvFilter::try_from_default_env()
        .or_else(|_| EnvFilter::try_new(&config.log_level))
        .unwrap_or_else(|_| EnvFilter::new("info"));

    let fmt_layer = if config.log_format == "json" {
        fmt::layer().json().with_target(true).boxed()
    } else {
        fmt::layer().with_target(true).with_ansi(true).boxed()
    };

    tracing_subscriber::registry()
        .with(env_filter)
        .with(fmt_layer)
        .try_init()?;

    if config.metrics_enabled {
        let addr = SocketAddr::from((Ipv4Addr::UNSPECIFIED, config.metrics_port));
        PrometheusBuilder::new()
            .with_http_listener(addr)
            .install()?;
        info!(port = config.metrics_port, "Prometheus 指标端点已启动");
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_observability_config() {
        let config = ObservabilityConfig::default();
        assert_eq!(config.log_level, "info");
        assert_eq!(config.log_format, "pretty");
        assert_eq!(config.metrics_port, 9090);
    }
}
