//! 共享库
//!
//! 包含订单服务各二进制共用的配置、错误处理、数据库连接、Kafka 消费、
//! 熔断器和可观测性初始化等基础设施代码。

pub mod circuit_breaker;
pub mod config;
pub mod database;
pub mod error;
pub mod events;
pub mod kafka;
pub mod observability;
