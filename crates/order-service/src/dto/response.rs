//! 响应 DTO
//!
//! 订单响应为「实体映射 + 用户信息补全」两步组装：
//! 先由 `OrderResponse::from_order` 完成实体到 DTO 的映射，
//! 再把用户服务（或降级兜底）返回的 `UserInfo` 填入 `user` 字段。

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::models::{OrderItem, OrderStatus, OrderWithItems};

/// 用户信息
///
/// 由外部用户服务返回；用户服务不可用时退化为固定兜底值。
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UserInfo {
    pub id: i64,
    pub first_name: String,
    pub last_name: String,
    pub email: String,
}

impl UserInfo {
    /// 用户服务降级时的兜底值
    pub fn fallback(user_id: i64) -> Self {
        Self {
            id: user_id,
            first_name: "unknown".to_string(),
            last_name: "Unavailable".to_string(),
            email: String::new(),
        }
    }
}

/// 订单行响应
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct OrderItemResponse {
    pub id: i64,
    pub item_id: i64,
    pub item_name: String,
    pub item_price: i32,
    pub quantity: i32,
}

impl From<OrderItem> for OrderItemResponse {
    fn from(item: OrderItem) -> Self {
        Self {
            id: item.id,
            item_id: item.item_id,
            item_name: item.item_name,
            item_price: item.item_price,
            quantity: item.quantity,
        }
    }
}

/// 订单响应
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct OrderResponse {
    pub id: i64,
    pub user_id: i64,
    pub status: OrderStatus,
    pub total_price: i64,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
    pub items: Vec<OrderItemResponse>,
    pub user: UserInfo,
}

impl OrderResponse {
    /// 实体 -> DTO 映射 + 用户信息补全
    pub fn from_order(aggregate: OrderWithItems, user: UserInfo) -> Self {
        let OrderWithItems { order, items } = aggregate;
        Self {
            id: order.id,
            user_id: order.user_id,
            status: order.status,
            total_price: order.total_price,
            created_at: order.created_at,
            updated_at: order.updated_at,
            items: items.into_iter().map(OrderItemResponse::from).collect(),
            user,
        }
    }
}

/// 分页响应
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PageResponse<T> {
    pub content: Vec<T>,
    pub page: i64,
    pub size: i64,
    pub total_elements: i64,
    pub total_pages: i64,
}

impl<T> PageResponse<T> {
    pub fn new(content: Vec<T>, page: i64, size: i64, total_elements: i64) -> Self {
        // size = 0 在参数校验阶段已被拒绝，这里兜底避免除零
        let total_pages = if size > 0 {
            (total_elements + size - 1) / size
        } else {
            0
        };
        Self {
            content,
            page,
            size,
            total_elements,
            total_pages,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::Order;

    fn sample_aggregate() -> OrderWithItems {
        let now = Utc::now();
        OrderWithItems {
            order: Order {
                id: 10,
                user_id: 1,
                status: OrderStatus::Processing,
                total_price: 1398,
                deleted: false,
                created_at: now,
                updated_at: now,
            },
            items: vec![OrderItem {
                id: 100,
                order_id: 10,
                item_id: 1,
                item_name: "Phone".to_string(),
                item_price: 699,
                quantity: 2,
            }],
        }
    }

    #[test]
    fn test_fallback_user() {
        let user = UserInfo::fallback(42);
        assert_eq!(user.id, 42);
        assert_eq!(user.first_name, "unknown");
        assert_eq!(user.last_name, "Unavailable");
        assert_eq!(user.email, "");
    }

    #[test]
    fn test_from_order_maps_all_fields() {
        let dto = OrderResponse::from_order(sample_aggregate(), UserInfo::fallback(1));
        assert_eq!(dto.id, 10);
        assert_eq!(dto.total_price, 1398);
        assert_eq!(dto.items.len(), 1);
        assert_eq!(dto.items[0].item_name, "Phone");
        assert_eq!(dto.items[0].item_price, 699);
        assert_eq!(dto.items[0].quantity, 2);
        assert_eq!(dto.user.id, 1);
    }

    #[test]
    fn test_response_serializes_camel_case() {
        let dto = OrderResponse::from_order(sample_aggregate(), UserInfo::fallback(1));
        let json = serde_json::to_value(&dto).unwrap();

        assert!(json.get("userId").is_some());
        assert!(json.get("totalPrice").is_some());
        assert!(json.get("createdAt").is_some());
        assert_eq!(json["status"], "PROCESSING");
        assert!(json["items"][0].get("itemName").is_some());
        assert!(json["user"].get("firstName").is_some());
    }

    #[test]
    fn test_page_response_total_pages() {
        let page = PageResponse::<i32>::new(vec![], 0, 10, 0);
        assert_eq!(page.total_pages, 0);

        let page = PageResponse::<i32>::new(vec![], 0, 10, 25);
        assert_eq!(page.total_pages, 3);

        let page = PageResponse::<i32>::new(vec![], 0, 10, 30);
        assert_eq!(page.total_pages, 3);
    }
}
