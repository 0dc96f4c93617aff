//! 订单服务错误类型定义
//!
//! "not found" 类错误的 message 是 API 契约的一部分，
//! 下游测试依赖字面量 "Order not found" 和 "Item not found: {id}"。

use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use serde_json::json;

use order_shared::error::OrderError;

/// 订单服务错误类型
#[derive(Debug, thiserror::Error)]
pub enum ApiError {
    // 资源不存在
    #[error("Order not found")]
    OrderNotFound,
    #[error("Item not found: {0}")]
    ItemNotFound(i64),

    // 验证错误
    #[error("参数验证失败: {0}")]
    Validation(String),

    // 系统错误
    #[error("数据库错误: {0}")]
    Database(#[from] sqlx::Error),
    #[error(transparent)]
    Infra(#[from] OrderError),
    #[error("内部错误: {0}")]
    Internal(String),
}

impl ApiError {
    /// 返回对应的 HTTP 状态码
    pub fn status_code(&self) -> StatusCode {
        match self {
            Self::OrderNotFound | Self::ItemNotFound(_) => StatusCode::NOT_FOUND,
            Self::Validation(_) => StatusCode::BAD_REQUEST,
            Self::Database(_) | Self::Infra(_) | Self::Internal(_) => {
                StatusCode::INTERNAL_SERVER_ERROR
            }
        }
    }

    /// 返回错误码（用于 API 响应）
    pub fn error_code(&self) -> &'static str {
        match self {
            Self::OrderNotFound => "ORDER_NOT_FOUND",
            Self::ItemNotFound(_) => "ITEM_NOT_FOUND",
            Self::Validation(_) => "VALIDATION_ERROR",
            Self::Database(_) => "DATABASE_ERROR",
            Self::Infra(_) => "INFRA_ERROR",
            Self::Internal(_) => "INTERNAL_ERROR",
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = self.status_code();

        // 系统级错误只返回通用提示，详细信息仅记录日志，防止信息泄露
        let message = match &self {
            Self::Database(e) => {
                tracing::error!(error = %e, "数据库操作失败");
                "服务内部错误，请稍后重试".to_string()
            }
            Self::Infra(e) => {
                tracing::error!(error = %e, "基础设施错误");
                "服务内部错误，请稍后重试".to_string()
            }
            Self::Internal(e) => {
                tracing::error!(error = %e, "内部错误");
                "服务内部错误，请稍后重试".to_string()
            }
            other => other.to_string(),
        };

        let body = json!({
            "code": self.error_code(),
            "message": message,
        });

        (status, axum::Json(body)).into_response()
    }
}

/// 从 validator 错误转换
impl From<validator::ValidationErrors> for ApiError {
    fn from(errors: validator::ValidationErrors) -> Self {
        Self::Validation(errors.to_string())
    }
}

/// 服务层 Result 类型别名
pub type Result<T> = std::result::Result<T, ApiError>;

#[cfg(test)]
mod tests {
    use super::*;
    use axum::response::IntoResponse;

    #[test]
    fn test_not_found_messages_are_exact() {
        // message 是契约：下游测试按字面量断言
        assert_eq!(ApiError::OrderNotFound.to_string(), "Order not found");
        assert_eq!(
            ApiError::ItemNotFound(42).to_string(),
            "Item not found: 42"
        );
    }

    #[test]
    fn test_status_codes() {
        assert_eq!(ApiError::OrderNotFound.status_code(), StatusCode::NOT_FOUND);
        assert_eq!(
            ApiError::ItemNotFound(1).status_code(),
            StatusCode::NOT_FOUND
        );
        assert_eq!(
            ApiError::Validation("bad".into()).status_code(),
            StatusCode::BAD_REQUEST
        );
        assert_eq!(
            ApiError::Internal("boom".into()).status_code(),
            StatusCode::INTERNAL_SERVER_ERROR
        );
        assert_eq!(
            ApiError::Database(sqlx::Error::RowNotFound).status_code(),
            StatusCode::INTERNAL_SERVER_ERROR
        );
    }

    #[test]
    fn test_error_codes() {
        assert_eq!(ApiError::OrderNotFound.error_code(), "ORDER_NOT_FOUND");
        assert_eq!(ApiError::ItemNotFound(1).error_code(), "ITEM_NOT_FOUND");
        assert_eq!(
            ApiError::Validation("x".into()).error_code(),
            "VALIDATION_ERROR"
        );
    }

    #[tokio::test]
    async fn test_into_response_body_structure() {
        let response = ApiError::ItemNotFound(7).into_response();
        assert_eq!(response.status(), StatusCode::NOT_FOUND);

        let body_bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
            .await
            .expect("读取响应体失败");
        let body: serde_json::Value = serde_json::from_slice(&body_bytes).unwrap();

        assert_eq!(body["code"], "ITEM_NOT_FOUND");
        assert_eq!(body["message"], "Item not found: 7");
    }

    #[tokio::test]
    async fn test_system_errors_hide_internal_details() {
        let response =
            ApiError::Internal("stack overflow at module X".into()).into_response();
        let body_bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
            .await
            .unwrap();
        let body: serde_json::Value = serde_json::from_slice(&body_bytes).unwrap();
        let message = body["message"].as_str().unwrap();

        assert!(!message.contains("stack overflow"));
        assert!(message.contains("服务内部错误"));
    }

    #[test]
    fn test_from_validation_errors() {
        use validator::{ValidationError, ValidationErrors};

        let mut errors = ValidationErrors::new();
        let mut field_error = ValidationError::new("range");
        field_error.message = Some("quantity 必须为正数".into());
        errors.add("quantity", field_error);

        let api_error: ApiError = errors.into();
        match &api_error {
            ApiError::Validation(msg) => assert!(msg.contains("quantity")),
            other => panic!("期望 Validation 变体，实际: {:?}", other),
        }
        assert_eq!(api_error.status_code(), StatusCode::BAD_REQUEST);
    }
}
