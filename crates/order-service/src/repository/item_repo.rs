//! 商品仓储
//!
//! 本服务对商品目录只读：创建/更新订单时按 id 查询商品快照。

use async_trait::async_trait;
use sqlx::PgPool;

use super::traits::ItemStore;
use crate::error::Result;
use crate::models::Item;

/// 商品仓储（PostgreSQL 实现）
pub struct PgItemStore {
    pool: PgPool,
}

impl PgItemStore {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl ItemStore for PgItemStore {
    async fn find_by_id(&self, id: i64) -> Result<Option<Item>> {
        let item = sqlx::query_as::<_, Item>(
            r#"
            SELECT id, name, price
            FROM items
            WHERE id = $1
            "#,
        )
        .bind(id)
        .fetch_optional(&self.pool)
        .await?;

        Ok(item)
    }
}
