//! 订单 HTTP 处理器
//!
//! 处理器只做协议转换：入参校验、查询参数解析、状态码选择，
//! 业务规则全部在服务层。

use std::str::FromStr;

use axum::extract::{Path, Query, State};
use axum::http::StatusCode;
use axum::Json;
use chrono::{DateTime, TimeZone, Utc};
use serde::Deserialize;
use validator::Validate;

use crate::dto::{OrderCreateRequest, OrderResponse, PageResponse};
use crate::error::{ApiError, Result};
use crate::models::OrderStatus;
use crate::query::{OrderFilter, PageRequest};
use crate::state::AppState;

/// 订单列表查询参数
///
/// 时间参数为 epoch 毫秒；statuses 为逗号分隔的状态名，
/// 未知状态名是 400 而不是被静默忽略。
#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ListOrdersParams {
    pub from_epoch_millis: Option<i64>,
    pub to_epoch_millis: Option<i64>,
    pub statuses: Option<String>,
    pub page: Option<i64>,
    pub size: Option<i64>,
}

impl ListOrdersParams {
    fn parse_timestamp(millis: i64, field: &str) -> Result<DateTime<Utc>> {
        Utc.timestamp_millis_opt(millis)
            .single()
            .ok_or_else(|| ApiError::Validation(format!("{field} 不是合法的时间戳: {millis}")))
    }

    fn parse_statuses(raw: &str) -> Result<Vec<OrderStatus>> {
        raw.split(',')
            .map(str::trim)
            .filter(|s| !s.is_empty())
            .map(|s| {
                OrderStatus::from_str(s)
                    .map_err(|_| ApiError::Validation(format!("未知的订单状态: {s}")))
            })
            .collect()
    }

    /// 解析为过滤条件与分页参数
    pub fn into_query(self) -> Result<(OrderFilter, PageRequest)> {
        let created_from = self
            .from_epoch_millis
            .map(|ms| Self::parse_timestamp(ms, "fromEpochMillis"))
            .transpose()?;
        let created_to = self
            .to_epoch_millis
            .map(|ms| Self::parse_timestamp(ms, "toEpochMillis"))
            .transpose()?;

        let statuses = self
            .statuses
            .as_deref()
            .map(Self::parse_statuses)
            .transpose()?;

        let page = self.page.unwrap_or(0);
        let size = self.size.unwrap_or(10);
        if page < 0 {
            return Err(ApiError::Validation(format!("page 不能为负数: {page}")));
        }
        if size < 1 {
            return Err(ApiError::Validation(format!("size 必须为正数: {size}")));
        }

        Ok((
            OrderFilter {
                created_from,
                created_to,
                statuses,
            },
            PageRequest::new(page, size),
        ))
    }
}

/// POST /api/orders/create
pub async fn create_order(
    State(state): State<AppState>,
    Json(request): Json<OrderCreateRequest>,
) -> Result<(StatusCode, Json<OrderResponse>)> {
    request.validate()?;
    let response = state.service.create_order(request).await?;
    Ok((StatusCode::CREATED, Json(response)))
}

/// GET /api/orders/{id}
pub async fn get_order(
    State(state): State<AppState>,
    Path(id): Path<i64>,
) -> Result<Json<OrderResponse>> {
    let response = state.service.get_order(id).await?;
    Ok(Json(response))
}

/// GET /api/orders
pub async fn list_orders(
    State(state): State<AppState>,
    Query(params): Query<ListOrdersParams>,
) -> Result<Json<PageResponse<OrderResponse>>> {
    let (filter, page) = params.into_query()?;
    let response = state.service.list_orders(filter, page).await?;
    Ok(Json(response))
}

/// GET /api/orders/user/{user_id}
pub async fn get_orders_by_user(
    State(state): State<AppState>,
    Path(user_id): Path<i64>,
) -> Result<Json<Vec<OrderResponse>>> {
    let response = state.service.get_orders_by_user(user_id).await?;
    Ok(Json(response))
}

/// PATCH /api/orders/{id}
pub async fn update_order(
    State(state): State<AppState>,
    Path(id): Path<i64>,
    Json(request): Json<OrderCreateRequest>,
) -> Result<Json<OrderResponse>> {
    request.validate()?;
    let response = state.service.update_order(id, request).await?;
    Ok(Json(response))
}

/// DELETE /api/orders/{id}
pub async fn delete_order(
    State(state): State<AppState>,
    Path(id): Path<i64>,
) -> Result<StatusCode> {
    state.service.delete_order(id).await?;
    Ok(StatusCode::NO_CONTENT)
}
