//! 请求 DTO
//!
//! 字段名对外为 camelCase，与既有客户端的 JSON 契约保持一致。
//! 数量为正、行列表非空属于入参校验，在到达服务层之前以 400 拒绝。

use serde::{Deserialize, Serialize};
use validator::Validate;

/// 创建/更新订单请求（两个操作共用同一请求体形状）
///
/// Serialize 是 Validate 派生的前提：校验失败时字段值会被写入错误参数。
#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct OrderCreateRequest {
    pub user_id: i64,
    #[validate(length(min = 1, message = "items 不能为空"))]
    #[validate(nested)]
    pub items: Vec<OrderItemCreate>,
}

/// 订单行请求
#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct OrderItemCreate {
    pub item_id: i64,
    #[validate(range(min = 1, message = "quantity 必须为正数"))]
    pub quantity: i32,
}

#[cfg(test)]
mod tests {
    use super::*;

    fn request(items: Vec<OrderItemCreate>) -> OrderCreateRequest {
        OrderCreateRequest { user_id: 1, items }
    }

    #[test]
    fn test_deserialize_camel_case() {
        let json = r#"{"userId":1,"items":[{"itemId":5,"quantity":2}]}"#;
        let req: OrderCreateRequest = serde_json::from_str(json).unwrap();
        assert_eq!(req.user_id, 1);
        assert_eq!(req.items[0].item_id, 5);
        assert_eq!(req.items[0].quantity, 2);
    }

    #[test]
    fn test_empty_items_failure_carries_field_value() {
        // 校验错误参数会序列化字段值，请求类型必须可序列化
        let err = request(vec![]).validate().unwrap_err();
        let json = serde_json::to_value(&err).unwrap();
        assert!(json.get("items").is_some());
    }

    #[test]
    fn test_request_serializes_camel_case() {
        let req = request(vec![OrderItemCreate {
            item_id: 5,
            quantity: 2,
        }]);
        let json = serde_json::to_value(&req).unwrap();
        assert!(json.get("userId").is_some());
        assert!(json["items"][0].get("itemId").is_some());
    }

    #[test]
    fn test_valid_request_passes() {
        let req = request(vec![OrderItemCreate {
            item_id: 1,
            quantity: 1,
        }]);
        assert!(req.validate().is_ok());
    }

    #[test]
    fn test_empty_items_rejected() {
        let req = request(vec![]);
        assert!(req.validate().is_err());
    }

    #[test]
    fn test_non_positive_quantity_rejected() {
        for quantity in [0, -1] {
            let req = request(vec![OrderItemCreate {
                item_id: 1,
                quantity,
            }]);
            assert!(req.validate().is_err(), "quantity={quantity} 应被拒绝");
        }
    }
}
