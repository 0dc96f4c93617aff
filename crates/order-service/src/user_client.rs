//! 用户服务客户端
//!
//! 订单响应需要补全用户信息，用户信息由独立的用户服务提供。
//! 该依赖是「尽力而为」：调用经熔断器保护，失败或短路时
//! 退化为固定兜底值，订单主流程永不因用户服务不可用而失败。

use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use order_shared::circuit_breaker::{CircuitBreaker, CircuitBreakerConfig, CircuitBreakerError};
use order_shared::config::UserServiceConfig;
use order_shared::error::OrderError;
use tracing::warn;

use crate::dto::UserInfo;

/// 用户服务查询接口
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait UserDirectory: Send + Sync {
    /// 按 id 查询用户信息
    async fn get_by_id(&self, user_id: i64) -> Result<UserInfo, OrderError>;
}

/// 用户服务 HTTP 客户端
pub struct HttpUserClient {
    client: reqwest::Client,
    base_url: String,
}

impl HttpUserClient {
    pub fn new(config: &UserServiceConfig) -> Result<Self, OrderError> {
        let client = reqwest::Client::builder()
            .timeout(Duration::from_millis(config.timeout_ms))
            .build()
            .map_err(|e| OrderError::Config(format!("构建 HTTP 客户端失败: {e}")))?;

        Ok(Self {
            client,
            base_url: config.base_url.trim_end_matches('/').to_string(),
        })
    }
}

#[async_trait]
impl UserDirectory for HttpUserClient {
    async fn get_by_id(&self, user_id: i64) -> Result<UserInfo, OrderError> {
        let url = format!("{}/api/user/get/{}", self.base_url, user_id);

        let response = self.client.get(&url).send().await.map_err(|e| {
            if e.is_timeout() {
                OrderError::ExternalServiceTimeout {
                    service: "user-service".to_string(),
                }
            } else {
                OrderError::ExternalService {
                    service: "user-service".to_string(),
                    message: e.to_string(),
                }
            }
        })?;

        if !response.status().is_success() {
            return Err(OrderError::ExternalService {
                service: "user-service".to_string(),
                message: format!("HTTP {}", response.status()),
            });
        }

        response
            .json::<UserInfo>()
            .await
            .map_err(|e| OrderError::ExternalService {
                service: "user-service".to_string(),
                message: format!("响应解析失败: {e}"),
            })
    }
}

/// 用户信息网关：熔断保护 + 兜底降级
///
/// 对上层暴露的 `fetch` 永不失败：远程调用异常、超时、
/// 熔断器短路，统一降级为 `UserInfo::fallback`。
#[derive(Clone)]
pub struct UserInfoGateway {
    directory: Arc<dyn UserDirectory>,
    breaker: CircuitBreaker,
}

impl UserInfoGateway {
    pub fn new(directory: Arc<dyn UserDirectory>, config: &UserServiceConfig) -> Self {
        Self {
            directory,
            breaker: CircuitBreaker::new(CircuitBreakerConfig::from_user_service(config)),
        }
    }

    #[cfg(test)]
    pub fn with_breaker(directory: Arc<dyn UserDirectory>, breaker: CircuitBreaker) -> Self {
        Self { directory, breaker }
    }

    /// 查询用户信息，失败时降级为兜底值
    pub async fn fetch(&self, user_id: i64) -> UserInfo {
        let result = self
            .breaker
            .call(|| self.directory.get_by_id(user_id))
            .await;

        match result {
            Ok(user) => user,
            Err(CircuitBreakerError::Open { name }) => {
                warn!(user_id, breaker = %name, "用户服务熔断中，返回兜底用户信息");
                UserInfo::fallback(user_id)
            }
            Err(CircuitBreakerError::ServiceError(e)) => {
                warn!(user_id, error = %e, "用户服务调用失败，返回兜底用户信息");
                UserInfo::fallback(user_id)
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use order_shared::circuit_breaker::CircuitState;

    fn breaker(threshold: u32) -> CircuitBreaker {
        CircuitBreaker::new(
            CircuitBreakerConfig::new("user-service-test").with_failure_threshold(threshold),
        )
    }

    fn sample_user(id: i64) -> UserInfo {
        UserInfo {
            id,
            first_name: "Wang".to_string(),
            last_name: "Lei".to_string(),
            email: "wang.lei@example.com".to_string(),
        }
    }

    #[tokio::test]
    async fn test_fetch_returns_remote_user() {
        let mut mock = MockUserDirectory::new();
        mock.expect_get_by_id()
            .withf(|id| *id == 7)
            .returning(|id| Ok(sample_user(id)));

        let gateway = UserInfoGateway::with_breaker(Arc::new(mock), breaker(5));
        let user = gateway.fetch(7).await;

        assert_eq!(user.id, 7);
        assert_eq!(user.first_name, "Wang");
    }

    #[tokio::test]
    async fn test_fetch_falls_back_on_error() {
        let mut mock = MockUserDirectory::new();
        mock.expect_get_by_id().returning(|_| {
            Err(OrderError::ExternalService {
                service: "user-service".to_string(),
                message: "connection refused".to_string(),
            })
        });

        let gateway = UserInfoGateway::with_breaker(Arc::new(mock), breaker(5));
        let user = gateway.fetch(42).await;

        assert_eq!(user, UserInfo::fallback(42));
    }

    #[tokio::test]
    async fn test_repeated_failures_trip_breaker() {
        let mut mock = MockUserDirectory::new();
        // 阈值为 2：只有前 2 次失败会真正触达远程
        mock.expect_get_by_id().times(2).returning(|_| {
            Err(OrderError::ExternalServiceTimeout {
                service: "user-service".to_string(),
            })
        });

        let cb = breaker(2);
        let gateway = UserInfoGateway::with_breaker(Arc::new(mock), cb.clone());

        assert_eq!(gateway.fetch(1).await, UserInfo::fallback(1));
        assert_eq!(gateway.fetch(1).await, UserInfo::fallback(1));
        assert_eq!(cb.state(), CircuitState::Open);

        // 跳闸后短路，mock 不再被调用（times(2) 校验）
        assert_eq!(gateway.fetch(1).await, UserInfo::fallback(1));
    }
}
