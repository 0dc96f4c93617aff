//! 订单领域模型
//!
//! 定义订单、订单行和商品的数据库映射结构，以及订单状态枚举。

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// 订单状态
///
/// 订单创建后即为 Processing；Delivered / Canceled 为终态，仅由支付事件
/// 驱动到达；Pending 仅在支付状态无法识别时出现。
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, sqlx::Type)]
#[serde(rename_all = "UPPERCASE")]
#[sqlx(type_name = "varchar", rename_all = "UPPERCASE")]
pub enum OrderStatus {
    Pending,
    Processing,
    Delivered,
    Canceled,
}

impl OrderStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Pending => "PENDING",
            Self::Processing => "PROCESSING",
            Self::Delivered => "DELIVERED",
            Self::Canceled => "CANCELED",
        }
    }
}

impl std::fmt::Display for OrderStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// 严格解析：未知状态名是错误，绝不静默回退
impl std::str::FromStr for OrderStatus {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "PENDING" => Ok(Self::Pending),
            "PROCESSING" => Ok(Self::Processing),
            "DELIVERED" => Ok(Self::Delivered),
            "CANCELED" => Ok(Self::Canceled),
            other => Err(format!("未知的订单状态: {other}")),
        }
    }
}

/// 订单头
#[derive(Debug, Clone, sqlx::FromRow)]
pub struct Order {
    pub id: i64,
    pub user_id: i64,
    pub status: OrderStatus,
    pub total_price: i64,
    pub deleted: bool,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// 订单行
///
/// `item_name` / `item_price` 是下单时从商品表复制的快照，
/// 后续商品改价不影响已生成的订单。
#[derive(Debug, Clone, sqlx::FromRow)]
pub struct OrderItem {
    pub id: i64,
    pub order_id: i64,
    pub item_id: i64,
    pub item_name: String,
    pub item_price: i32,
    pub quantity: i32,
}

/// 商品目录条目（本服务只读）
#[derive(Debug, Clone, sqlx::FromRow)]
pub struct Item {
    pub id: i64,
    pub name: String,
    pub price: i32,
}

/// 订单头 + 订单行的聚合视图
#[derive(Debug, Clone)]
pub struct OrderWithItems {
    pub order: Order,
    pub items: Vec<OrderItem>,
}

/// 待持久化的订单行（尚未分配 id）
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewOrderItem {
    pub item_id: i64,
    pub item_name: String,
    pub item_price: i32,
    pub quantity: i32,
}

/// 待持久化的订单
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewOrder {
    pub user_id: i64,
    pub status: OrderStatus,
    pub total_price: i64,
    pub items: Vec<NewOrderItem>,
}
