//! 支付事件模型
//!
//! 定义支付服务发布到 Kafka 的事件结构。支付服务是 JVM 技术栈，
//! 消息体字段名为 camelCase，这里通过 serde 重命名保持线上格式兼容。

use serde::{Deserialize, Serialize};

/// 支付创建事件
///
/// `order_id` 允许为空：支付可以不关联订单（如充值），
/// 这类事件对订单服务没有意义，消费侧直接丢弃。
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PaymentCreatedEvent {
    #[serde(default)]
    pub payment_id: Option<String>,
    #[serde(default)]
    pub order_id: Option<String>,
    pub status: String,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_deserialize_camel_case() {
        let json = r#"{"paymentId":"pay-1","orderId":"42","status":"SUCCESS"}"#;
        let event: PaymentCreatedEvent = serde_json::from_str(json).unwrap();
        assert_eq!(event.payment_id.as_deref(), Some("pay-1"));
        assert_eq!(event.order_id.as_deref(), Some("42"));
        assert_eq!(event.status, "SUCCESS");
    }

    #[test]
    fn test_deserialize_null_order_id() {
        let json = r#"{"paymentId":"pay-2","orderId":null,"status":"FAILED"}"#;
        let event: PaymentCreatedEvent = serde_json::from_str(json).unwrap();
        assert!(event.order_id.is_none());
    }

    #[test]
    fn test_deserialize_missing_order_id() {
        let json = r#"{"paymentId":"pay-3","status":"SUCCESS"}"#;
        let event: PaymentCreatedEvent = serde_json::from_str(json).unwrap();
        assert!(event.order_id.is_none());
    }

    #[test]
    fn test_missing_status_is_an_error() {
        // status 缺失属于格式错误，应交由消息层的重投/死信策略处理
        let json = r#"{"paymentId":"pay-4","orderId":"1"}"#;
        assert!(serde_json::from_str::<PaymentCreatedEvent>(json).is_err());
    }

    #[test]
    fn test_serialize_round_trip_field_names() {
        let event = PaymentCreatedEvent {
            payment_id: Some("pay-5".to_string()),
            order_id: Some("7".to_string()),
            status: "FAILED".to_string(),
        };
        let json = serde_json::to_value(&event).unwrap();
        assert!(json.get("paymentId").is_some());
        assert!(json.get("orderId").is_some());
        assert!(json.get("payment_id").is_none());
    }
}
