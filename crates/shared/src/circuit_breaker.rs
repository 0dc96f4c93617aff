//! 熔断器 (Circuit Breaker) 模块
//!
//! 实现标准的三态熔断器状态机，用于保护对外部用户服务的调用。
//! 连续失败达到阈值时跳闸（Open），在恢复窗口结束后放行少量探测
//! 请求（Half-Open），探测全部成功则恢复（Closed），任一探测失败
//! 则重新跳闸。
//!
//! 状态转换涉及多个字段的一致性更新，统一由 Mutex 保护；
//! 锁内只做字段读写，不做 I/O，临界区极短。

use std::sync::Arc;
use std::time::{Duration, Instant};

use parking_lot::Mutex;
use tracing::{info, warn};

use crate::config::UserServiceConfig;

/// 熔断器状态
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CircuitState {
    /// 正常放行所有请求
    Closed,
    /// 已跳闸，请求被短路拒绝
    Open,
    /// 恢复窗口结束，放行有限的探测请求
    HalfOpen,
}

impl std::fmt::Display for CircuitState {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Closed => write!(f, "closed"),
            Self::Open => write!(f, "open"),
            Self::HalfOpen => write!(f, "half_open"),
        }
    }
}

/// 熔断器配置
#[derive(Debug, Clone)]
pub struct CircuitBreakerConfig {
    /// 熔断器名称，用于日志和指标区分不同的外部依赖
    pub name: String,
    /// 连续失败多少次后跳闸
    pub failure_threshold: u32,
    /// 跳闸后多久进入半开状态
    pub recovery_timeout: Duration,
    /// 半开状态允许通过的探测请求数
    pub half_open_permits: u32,
}

impl Default for CircuitBreakerConfig {
    fn default() -> Self {
        Self {
            name: "default".to_string(),
            failure_threshold: 5,
            recovery_timeout: Duration::from_secs(30),
            half_open_permits: 3,
        }
    }
}

impl CircuitBreakerConfig {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            ..Default::default()
        }
    }

    pub fn with_failure_threshold(mut self, threshold: u32) -> Self {
        self.failure_threshold = threshold;
        self
    }

    pub fn with_recovery_timeout(mut self, timeout: Duration) -> Self {
        self.recovery_timeout = timeout;
        self
    }

    pub fn with_half_open_permits(mut self, permits: u32) -> Self {
        self.half_open_permits = permits;
        self
    }

    /// 从用户服务配置构造熔断参数
    pub fn from_user_service(config: &UserServiceConfig) -> Self {
        Self {
            name: "user-service".to_string(),
            failure_threshold: config.failure_threshold,
            recovery_timeout: Duration::from_secs(config.recovery_timeout_seconds),
            half_open_permits: config.half_open_permits,
        }
    }
}

/// 熔断器内部状态，受 Mutex 保护
struct Inner {
    state: CircuitState,
    /// Closed -> Open 转换依据
    consecutive_failures: u32,
    /// Open -> HalfOpen 计时起点
    last_failure_at: Option<Instant>,
    /// HalfOpen 中已放行的探测请求数
    probes_issued: u32,
    /// HalfOpen 中已成功的探测请求数
    probes_succeeded: u32,
}

/// 熔断器
///
/// 线程安全，内部用 Arc 包装，clone 后共享同一状态机。
/// 典型用法：
/// ```ignore
/// match breaker.call(|| remote_lookup(id)).await {
///     Ok(v) => v,
///     Err(_) => fallback(id),
/// }
/// ```
#[derive(Clone)]
pub struct CircuitBreaker {
    config: Arc<CircuitBreakerConfig>,
    inner: Arc<Mutex<Inner>>,
}

impl CircuitBreaker {
    pub fn new(config: CircuitBreakerConfig) -> Self {
        info!(
            name = %config.name,
            failure_threshold = config.failure_threshold,
            recovery_timeout_ms = config.recovery_timeout.as_millis() as u64,
            half_open_permits = config.half_open_permits,
            "熔断器已创建"
        );

        Self {
            config: Arc::new(config),
            inner: Arc::new(Mutex::new(Inner {
                state: CircuitState::Closed,
                consecutive_failures: 0,
                last_failure_at: None,
                probes_issued: 0,
                probes_succeeded: 0,
            })),
        }
    }

    /// 获取当前状态（用于监控和测试）
    ///
    /// Open 状态下若恢复窗口已过，对外表现为 HalfOpen。
    pub fn state(&self) -> CircuitState {
        let inner = self.inner.lock();
        if inner.state == CircuitState::Open && self.recovery_elapsed(&inner) {
            return CircuitState::HalfOpen;
        }
        inner.state
    }

    /// 判断是否允许发起请求
    ///
    /// Closed：始终允许
    /// Open：恢复窗口未到则拒绝，到期则转为 HalfOpen 并放行第一个探测
    /// HalfOpen：在探测配额内允许
    pub fn allow_request(&self) -> bool {
        let mut inner = self.inner.lock();

        match inner.state {
            CircuitState::Closed => true,
            CircuitState::Open => {
                if self.recovery_elapsed(&inner) {
                    self.transition(&mut inner, CircuitState::HalfOpen);
                    inner.probes_issued = 1;
                    true
                } else {
                    false
                }
            }
            CircuitState::HalfOpen => {
                if inner.probes_issued < self.config.half_open_permits {
                    inner.probes_issued += 1;
                    true
                } else {
                    false
                }
            }
        }
    }

    /// 记录调用成功
    pub fn record_success(&self) {
        let mut inner = self.inner.lock();
        match inner.state {
            CircuitState::Closed => {
                inner.consecutive_failures = 0;
            }
            CircuitState::HalfOpen => {
                inner.probes_succeeded += 1;
                // 探测配额全部成功，恢复 Closed
                if inner.probes_succeeded >= self.config.half_open_permits {
                    self.transition(&mut inner, CircuitState::Closed);
                }
            }
            // Open 状态不放行请求，不应出现成功回报
            CircuitState::Open => {}
        }
    }

    /// 记录调用失败
    pub fn record_failure(&self) {
        let mut inner = self.inner.lock();
        inner.consecutive_failures += 1;
        inner.last_failure_at = Some(Instant::now());

        match inner.state {
            CircuitState::Closed => {
                if inner.consecutive_failures >= self.config.failure_threshold {
                    self.transition(&mut inner, CircuitState::Open);
                }
            }
            // 半开探测失败，立即重新跳闸
            CircuitState::HalfOpen => {
                self.transition(&mut inner, CircuitState::Open);
            }
            // 已跳闸，失败时间已更新，恢复窗口顺延
            CircuitState::Open => {}
        }
    }

    /// 执行受熔断器保护的异步调用
    ///
    /// 熔断器跳闸时直接返回 `Err(Open)` 而不触发远程调用，
    /// 否则执行 f 并根据结果更新状态机。
    pub async fn call<F, Fut, T, E>(&self, f: F) -> Result<T, CircuitBreakerError<E>>
    where
        F: FnOnce() -> Fut,
        Fut: std::future::Future<Output = Result<T, E>>,
    {
        if !self.allow_request() {
            metrics::counter!(
                "circuit_breaker_short_circuits_total",
                "name" => self.config.name.clone()
            )
            .increment(1);
            return Err(CircuitBreakerError::Open {
                name: self.config.name.clone(),
            });
        }

        match f().await {
            Ok(result) => {
                self.record_success();
                Ok(result)
            }
            Err(e) => {
                self.record_failure();
                Err(CircuitBreakerError::ServiceError(e))
            }
        }
    }

    fn recovery_elapsed(&self, inner: &Inner) -> bool {
        inner
            .last_failure_at
            .is_some_and(|t| t.elapsed() >= self.config.recovery_timeout)
    }

    /// 状态转换（在锁内调用）
    fn transition(&self, inner: &mut Inner, new_state: CircuitState) {
        let old_state = inner.state;
        inner.state = new_state;

        match new_state {
            CircuitState::HalfOpen => {
                inner.probes_issued = 0;
                inner.probes_succeeded = 0;
            }
            CircuitState::Closed => {
                inner.consecutive_failures = 0;
            }
            CircuitState::Open => {}
        }

        metrics::counter!(
            "circuit_breaker_transitions_total",
            "name" => self.config.name.clone(),
            "from" => old_state.to_string(),
            "to" => new_state.to_string()
        )
        .increment(1);

        match new_state {
            CircuitState::Open => {
                warn!(
                    name = %self.config.name,
                    from = %old_state,
                    "熔断器跳闸：连续失败达到阈值，恢复窗口内请求将被拒绝"
                );
            }
            CircuitState::HalfOpen => {
                info!(
                    name = %self.config.name,
                    permits = self.config.half_open_permits,
                    "熔断器进入半开状态：放行探测请求"
                );
            }
            CircuitState::Closed => {
                info!(name = %self.config.name, "熔断器恢复：依赖服务已恢复正常");
            }
        }
    }
}

/// 熔断器错误
#[derive(Debug)]
pub enum CircuitBreakerError<E> {
    /// 熔断器跳闸，请求被短路
    Open { name: String },
    /// 底层服务调用失败
    ServiceError(E),
}

impl<E: std::fmt::Display> std::fmt::Display for CircuitBreakerError<E> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Open { name } => write!(f, "熔断器 '{}' 处于跳闸状态，请求被拒绝", name),
            Self::ServiceError(e) => write!(f, "{}", e),
        }
    }
}

impl<E: std::fmt::Display + std::fmt::Debug> std::error::Error for CircuitBreakerError<E> {}
