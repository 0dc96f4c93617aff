//! 订单服务
//!
//! 提供订单的创建、查询、过滤、更新与软删除，并消费支付事件推进订单状态。
//! 订单响应中的用户信息来自外部用户服务，调用经熔断器保护并支持降级。

pub mod consumer;
pub mod dto;
pub mod error;
pub mod handlers;
pub mod models;
pub mod query;
pub mod repository;
pub mod routes;
pub mod service;
pub mod state;
pub mod user_client;
