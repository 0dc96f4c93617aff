//! 订单查询过滤引擎
//!
//! 将可选的时间区间、状态集合与「未删除」条件组合为单一查询谓词。
//! 组合规则本身是纯逻辑（`matches`），不依赖存储引擎即可单测；
//! `apply` 把同一套规则翻译为 SQL WHERE 条件，供仓储层使用。
//!
//! 组合规则：
//! - 无时间边界 -> 不产生时间谓词
//! - 仅 from -> created_at >= from
//! - 仅 to -> created_at <= to
//! - 两者都有 -> created_at ∈ [from, to]（闭区间）
//! - 状态集合缺失或为空 -> 不产生状态谓词
//! - 所有谓词与「deleted = false」做 AND 连接

use chrono::{DateTime, Utc};
use sqlx::{Postgres, QueryBuilder};

use crate::models::{Order, OrderStatus};

/// 订单过滤条件
#[derive(Debug, Clone, Default)]
pub struct OrderFilter {
    pub created_from: Option<DateTime<Utc>>,
    pub created_to: Option<DateTime<Utc>>,
    pub statuses: Option<Vec<OrderStatus>>,
}

impl OrderFilter {
    /// 逻辑求值：给定订单是否满足全部过滤条件
    ///
    /// 与 `apply` 生成的 SQL 语义完全一致，用于独立于数据库的单元测试。
    pub fn matches(&self, order: &Order) -> bool {
        if order.deleted {
            return false;
        }

        if let Some(from) = self.created_from
            && order.created_at < from
        {
            return false;
        }

        if let Some(to) = self.created_to
            && order.created_at > to
        {
            return false;
        }

        if let Some(statuses) = &self.statuses
            && !statuses.is_empty()
            && !statuses.contains(&order.status)
        {
            return false;
        }

        true
    }

    /// 将过滤条件翻译为 SQL WHERE 片段
    ///
    /// 调用方的基础查询必须已包含 `WHERE deleted = FALSE`，
    /// 这里只追加 `AND ...` 条件，保证与 `matches` 的规则一一对应。
    pub fn apply(&self, qb: &mut QueryBuilder<'_, Postgres>) {
        if let Some(from) = self.created_from {
            qb.push(" AND created_at >= ").push_bind(from);
        }

        if let Some(to) = self.created_to {
            qb.push(" AND created_at <= ").push_bind(to);
        }

        if let Some(statuses) = &self.statuses
            && !statuses.is_empty()
        {
            let names: Vec<String> = statuses.iter().map(|s| s.as_str().to_string()).collect();
            qb.push(" AND status = ANY(").push_bind(names).push(")");
        }
    }
}

/// 分页参数（page 从 0 开始）
#[derive(Debug, Clone, Copy)]
pub struct PageRequest {
    pub page: i64,
    pub size: i64,
}

impl PageRequest {
    pub fn new(page: i64, size: i64) -> Self {
        Self { page, size }
    }

    pub fn offset(&self) -> i64 {
        self.page * self.size
    }
}

impl Default for PageRequest {
    fn default() -> Self {
        Self { page: 0, size: 10 }
    }
}
