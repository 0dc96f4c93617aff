//! 订单业务服务
//!
//! 承载全部业务规则：
//! - 创建/更新前先解析全部商品行，任一商品不存在则整单失败，不产生写入
//! - totalPrice 由服务端按商品快照价计算，不信任入参
//! - 删除是软删除，且幂等：已删除订单再次删除直接成功
//! - 读路径统一做用户信息补全，用户服务不可用时降级而不失败
//!
//! 服务只依赖仓储与网关的抽象接口，规则可在无数据库环境下单测。

use std::sync::Arc;

use tracing::{info, warn};

use crate::dto::{OrderCreateRequest, OrderResponse, PageResponse, UserInfo};
use crate::error::{ApiError, Result};
use crate::models::{NewOrder, NewOrderItem, OrderStatus, OrderWithItems};
use crate::query::{OrderFilter, PageRequest};
use crate::repository::{ItemStore, OrderStore};
use crate::user_client::UserInfoGateway;

/// 订单服务
pub struct OrderService {
    orders: Arc<dyn OrderStore>,
    items: Arc<dyn ItemStore>,
    users: UserInfoGateway,
}

impl OrderService {
    pub fn new(
        orders: Arc<dyn OrderStore>,
        items: Arc<dyn ItemStore>,
        users: UserInfoGateway,
    ) -> Self {
        Self {
            orders,
            items,
            users,
        }
    }

    /// 将请求行解析为带商品快照的订单行，并计算总价
    ///
    /// 全部商品解析成功才返回；任一商品缺失立即以 `ItemNotFound` 失败，
    /// 调用方此时尚未发起任何写入。
    async fn resolve_items(
        &self,
        request: &OrderCreateRequest,
    ) -> Result<(Vec<NewOrderItem>, i64)> {
        let mut resolved = Vec::with_capacity(request.items.len());
        let mut total_price: i64 = 0;

        for line in &request.items {
            let item = self
                .items
                .find_by_id(line.item_id)
                .await?
                .ok_or(ApiError::ItemNotFound(line.item_id))?;

            total_price += i64::from(item.price) * i64::from(line.quantity);
            resolved.push(NewOrderItem {
                item_id: item.id,
                item_name: item.name,
                item_price: item.price,
                quantity: line.quantity,
            });
        }

        Ok((resolved, total_price))
    }

    /// 用指定用户补全订单响应
    async fn enrich_with(&self, aggregate: OrderWithItems, user_id: i64) -> OrderResponse {
        let user = self.users.fetch(user_id).await;
        OrderResponse::from_order(aggregate, user)
    }

    /// 用订单自身归属的用户补全订单响应
    async fn enrich(&self, aggregate: OrderWithItems) -> OrderResponse {
        let user_id = aggregate.order.user_id;
        self.enrich_with(aggregate, user_id).await
    }

    /// 创建订单
    ///
    /// 新订单初始状态为 PROCESSING，后续由支付事件推进。
    pub async fn create_order(&self, request: OrderCreateRequest) -> Result<OrderResponse> {
        let (items, total_price) = self.resolve_items(&request).await?;

        let saved = self
            .orders
            .insert(NewOrder {
                user_id: request.user_id,
                status: OrderStatus::Processing,
                total_price,
                items,
            })
            .await?;

        info!(
            order_id = saved.order.id,
            user_id = saved.order.user_id,
            total_price,
            "订单已创建"
        );

        Ok(self.enrich(saved).await)
    }

    /// 按 id 查询订单（软删除的订单视同不存在）
    pub async fn get_order(&self, id: i64) -> Result<OrderResponse> {
        let aggregate = self
            .orders
            .find_active(id)
            .await?
            .ok_or(ApiError::OrderNotFound)?;

        Ok(self.enrich(aggregate).await)
    }

    /// 分页过滤查询订单
    pub async fn list_orders(
        &self,
        filter: OrderFilter,
        page: PageRequest,
    ) -> Result<PageResponse<OrderResponse>> {
        let result = self.orders.search(filter, page).await?;

        let mut content = Vec::with_capacity(result.orders.len());
        for aggregate in result.orders {
            content.push(self.enrich(aggregate).await);
        }

        Ok(PageResponse::new(
            content,
            page.page,
            page.size,
            result.total_elements,
        ))
    }

    /// 查询某用户的全部订单
    ///
    /// 用户信息只查一次，同一批订单共享同一份补全结果。
    pub async fn get_orders_by_user(&self, user_id: i64) -> Result<Vec<OrderResponse>> {
        let aggregates = self.orders.find_by_user(user_id).await?;
        let user = self.users.fetch(user_id).await;

        Ok(aggregates
            .into_iter()
            .map(|aggregate| OrderResponse::from_order(aggregate, user.clone()))
            .collect())
    }

    /// 更新订单：归属用户与订单行整体替换，总价重算
    pub async fn update_order(
        &self,
        id: i64,
        request: OrderCreateRequest,
    ) -> Result<OrderResponse> {
        let (items, total_price) = self.resolve_items(&request).await?;

        let updated = self
            .orders
            .replace(id, request.user_id, total_price, items)
            .await?
            .ok_or(ApiError::OrderNotFound)?;

        info!(order_id = id, total_price, "订单已更新");

        Ok(self.enrich(updated).await)
    }

    /// 软删除订单（幂等：重复删除同样成功）
    pub async fn delete_order(&self, id: i64) -> Result<()> {
        let order = self
            .orders
            .find_any(id)
            .await?
            .ok_or(ApiError::OrderNotFound)?;

        if order.deleted {
            // 幂等：已删除的订单重复删除视为成功
            return Ok(());
        }

        self.orders.mark_deleted(id).await?;
        info!(order_id = id, "订单已软删除");
        Ok(())
    }

    /// 按支付结果推进订单状态（支付事件消费路径）
    ///
    /// 未命中订单（不存在或已软删除）返回 `OrderNotFound`，
    /// 由调用方决定记录、重放还是丢弃。
    pub async fn update_order_status(&self, id: i64, status: OrderStatus) -> Result<()> {
        let updated = self.orders.set_status(id, status).await?;

        if !updated {
            warn!(order_id = id, status = %status, "状态更新未命中订单");
            return Err(ApiError::OrderNotFound);
        }

        info!(order_id = id, status = %status, "订单状态已更新");
        Ok(())
    }
}
