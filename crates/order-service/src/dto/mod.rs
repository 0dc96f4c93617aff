//! 请求/响应 DTO 定义

pub mod request;
pub mod response;

pub use request::{OrderCreateRequest, OrderItemCreate};
pub use response::{OrderItemResponse, OrderResponse, PageResponse, UserInfo};
