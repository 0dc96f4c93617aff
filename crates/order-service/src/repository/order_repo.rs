//! 订单仓储
//!
//! 提供订单头与订单行的数据访问。订单行跟随订单头的生命周期：
//! 创建/替换/删除都在同一事务内完成，不存在只提交一半的状态。

use std::collections::HashMap;

use async_trait::async_trait;
use sqlx::{PgPool, Postgres, QueryBuilder};

use super::traits::{OrderPage, OrderStore};
use crate::error::Result;
use crate::models::{NewOrder, NewOrderItem, Order, OrderItem, OrderStatus, OrderWithItems};
use crate::query::{OrderFilter, PageRequest};

const ORDER_COLUMNS: &str = "id, user_id, status, total_price, deleted, created_at, updated_at";

/// 订单仓储（PostgreSQL 实现）
pub struct PgOrderStore {
    pool: PgPool,
}

impl PgOrderStore {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    /// 批量加载多个订单的订单行，按 order_id 分组
    async fn load_items(&self, order_ids: &[i64]) -> Result<HashMap<i64, Vec<OrderItem>>> {
        if order_ids.is_empty() {
            return Ok(HashMap::new());
        }

        let rows = sqlx::query_as::<_, OrderItem>(
            r#"
            SELECT id, order_id, item_id, item_name, item_price, quantity
            FROM order_items
            WHERE order_id = ANY($1)
            ORDER BY id ASC
            "#,
        )
        .bind(order_ids)
        .fetch_all(&self.pool)
        .await?;

        let mut grouped: HashMap<i64, Vec<OrderItem>> = HashMap::new();
        for row in rows {
            grouped.entry(row.order_id).or_default().push(row);
        }
        Ok(grouped)
    }

    /// 将订单头列表与各自的订单行组装为聚合视图，保持头的排序
    async fn assemble(&self, headers: Vec<Order>) -> Result<Vec<OrderWithItems>> {
        let ids: Vec<i64> = headers.iter().map(|o| o.id).collect();
        let mut grouped = self.load_items(&ids).await?;

        Ok(headers
            .into_iter()
            .map(|order| {
                let items = grouped.remove(&order.id).unwrap_or_default();
                OrderWithItems { order, items }
            })
            .collect())
    }
}

/// 在事务内插入订单行并返回持久化后的行
async fn insert_items(
    tx: &mut sqlx::Transaction<'_, Postgres>,
    order_id: i64,
    items: Vec<NewOrderItem>,
) -> Result<Vec<OrderItem>> {
    let mut saved = Vec::with_capacity(items.len());
    for item in items {
        let row = sqlx::query_as::<_, OrderItem>(
            r#"
            INSERT INTO order_items (order_id, item_id, item_name, item_price, quantity)
            VALUES ($1, $2, $3, $4, $5)
            RETURNING id, order_id, item_id, item_name, item_price, quantity
            "#,
        )
        .bind(order_id)
        .bind(item.item_id)
        .bind(&item.item_name)
        .bind(item.item_price)
        .bind(item.quantity)
        .fetch_one(&mut **tx)
        .await?;
        saved.push(row);
    }
    Ok(saved)
}

#[async_trait]
impl OrderStore for PgOrderStore {
    async fn insert(&self, order: NewOrder) -> Result<OrderWithItems> {
        let mut tx = self.pool.begin().await?;

        let header = sqlx::query_as::<_, Order>(
            r#"
            INSERT INTO orders (user_id, status, total_price, deleted)
            VALUES ($1, $2, $3, FALSE)
            RETURNING id, user_id, status, total_price, deleted, created_at, updated_at
            "#,
        )
        .bind(order.user_id)
        .bind(order.status)
        .bind(order.total_price)
        .fetch_one(&mut *tx)
        .await?;

        let items = insert_items(&mut tx, header.id, order.items).await?;

        tx.commit().await?;

        Ok(OrderWithItems {
            order: header,
            items,
        })
    }

    async fn find_active(&self, id: i64) -> Result<Option<OrderWithItems>> {
        let header = sqlx::query_as::<_, Order>(
            r#"
            SELECT id, user_id, status, total_price, deleted, created_at, updated_at
            FROM orders
            WHERE id = $1 AND deleted = FALSE
            "#,
        )
        .bind(id)
        .fetch_optional(&self.pool)
        .await?;

        let Some(header) = header else {
            return Ok(None);
        };

        let mut grouped = self.load_items(&[header.id]).await?;
        let items = grouped.remove(&header.id).unwrap_or_default();

        Ok(Some(OrderWithItems {
            order: header,
            items,
        }))
    }

    async fn find_any(&self, id: i64) -> Result<Option<Order>> {
        let header = sqlx::query_as::<_, Order>(
            r#"
            SELECT id, user_id, status, total_price, deleted, created_at, updated_at
            FROM orders
            WHERE id = $1
            "#,
        )
        .bind(id)
        .fetch_optional(&self.pool)
        .await?;

        Ok(header)
    }

    async fn find_by_user(&self, user_id: i64) -> Result<Vec<OrderWithItems>> {
        let headers = sqlx::query_as::<_, Order>(
            r#"
            SELECT id, user_id, status, total_price, deleted, created_at, updated_at
            FROM orders
            WHERE user_id = $1 AND deleted = FALSE
            ORDER BY created_at ASC, id ASC
            "#,
        )
        .bind(user_id)
        .fetch_all(&self.pool)
        .await?;

        self.assemble(headers).await
    }

    async fn search(&self, filter: OrderFilter, page: PageRequest) -> Result<OrderPage> {
        let mut count_qb =
            QueryBuilder::<Postgres>::new("SELECT COUNT(*) FROM orders WHERE deleted = FALSE");
        filter.apply(&mut count_qb);
        let total_elements: i64 = count_qb
            .build_query_scalar()
            .fetch_one(&self.pool)
            .await?;

        // 排序必须稳定，否则翻页会出现重复/遗漏；createdAt 相同再按 id 决胜
        let mut qb = QueryBuilder::<Postgres>::new(format!(
            "SELECT {ORDER_COLUMNS} FROM orders WHERE deleted = FALSE"
        ));
        filter.apply(&mut qb);
        qb.push(" ORDER BY created_at ASC, id ASC LIMIT ")
            .push_bind(page.size)
            .push(" OFFSET ")
            .push_bind(page.offset());

        let headers: Vec<Order> = qb.build_query_as().fetch_all(&self.pool).await?;
        let orders = self.assemble(headers).await?;

        Ok(OrderPage {
            orders,
            total_elements,
        })
    }

    async fn replace(
        &self,
        id: i64,
        user_id: i64,
        total_price: i64,
        items: Vec<NewOrderItem>,
    ) -> Result<Option<OrderWithItems>> {
        let mut tx = self.pool.begin().await?;

        let header = sqlx::query_as::<_, Order>(
            r#"
            UPDATE orders
            SET user_id = $2, total_price = $3, updated_at = NOW()
            WHERE id = $1 AND deleted = FALSE
            RETURNING id, user_id, status, total_price, deleted, created_at, updated_at
            "#,
        )
        .bind(id)
        .bind(user_id)
        .bind(total_price)
        .fetch_optional(&mut *tx)
        .await?;

        let Some(header) = header else {
            tx.rollback().await?;
            return Ok(None);
        };

        // 整体替换：旧行全部删除，孤儿不保留
        sqlx::query("DELETE FROM order_items WHERE order_id = $1")
            .bind(id)
            .execute(&mut *tx)
            .await?;

        let items = insert_items(&mut tx, id, items).await?;

        tx.commit().await?;

        Ok(Some(OrderWithItems {
            order: header,
            items,
        }))
    }

    async fn mark_deleted(&self, id: i64) -> Result<()> {
        sqlx::query(
            r#"
            UPDATE orders
            SET deleted = TRUE, updated_at = NOW()
            WHERE id = $1
            "#,
        )
        .bind(id)
        .execute(&self.pool)
        .await?;

        Ok(())
    }

    async fn set_status(&self, id: i64, status: OrderStatus) -> Result<bool> {
        let result = sqlx::query(
            r#"
            UPDATE orders
            SET status = $2, updated_at = NOW()
            WHERE id = $1 AND deleted = FALSE
            "#,
        )
        .bind(id)
        .bind(status)
        .execute(&self.pool)
        .await?;

        Ok(result.rows_affected() > 0)
    }
}

#[cfg(test)]
mod tests {
    // 仓储的 SQL 行为需要真实数据库，集成测试配合测试库执行；
    // 过滤条件到 SQL 的翻译在 query 模块中独立单测。
}
