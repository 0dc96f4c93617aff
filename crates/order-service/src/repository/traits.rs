//! 仓储 Trait 定义
//!
//! 定义仓储接口，便于服务层依赖抽象而非具体实现，支持 mock 测试

use async_trait::async_trait;

use crate::error::Result;
use crate::models::{Item, NewOrder, NewOrderItem, Order, OrderStatus, OrderWithItems};
use crate::query::{OrderFilter, PageRequest};

/// 一页查询结果
#[derive(Debug, Clone)]
pub struct OrderPage {
    pub orders: Vec<OrderWithItems>,
    pub total_elements: i64,
}

/// 订单仓储接口
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait OrderStore: Send + Sync {
    /// 持久化订单头和全部订单行（单事务）
    async fn insert(&self, order: NewOrder) -> Result<OrderWithItems>;

    /// 按 id 查询未删除的订单
    async fn find_active(&self, id: i64) -> Result<Option<OrderWithItems>>;

    /// 按 id 查询订单头，包含已软删除的（仅删除幂等检查使用）
    async fn find_any(&self, id: i64) -> Result<Option<Order>>;

    /// 查询某用户的全部未删除订单
    async fn find_by_user(&self, user_id: i64) -> Result<Vec<OrderWithItems>>;

    /// 按过滤条件分页查询
    async fn search(&self, filter: OrderFilter, page: PageRequest) -> Result<OrderPage>;

    /// 整体替换订单行并更新归属用户与总价（单事务）
    ///
    /// 订单不存在或已删除时返回 None，且不产生任何写入。
    async fn replace(
        &self,
        id: i64,
        user_id: i64,
        total_price: i64,
        items: Vec<NewOrderItem>,
    ) -> Result<Option<OrderWithItems>>;

    /// 标记软删除
    async fn mark_deleted(&self, id: i64) -> Result<()>;

    /// 仅更新状态（支付事件路径）；返回是否有行被更新
    async fn set_status(&self, id: i64, status: OrderStatus) -> Result<bool>;
}

/// 商品目录接口（本服务只读）
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait ItemStore: Send + Sync {
    async fn find_by_id(&self, id: i64) -> Result<Option<Item>>;
}
