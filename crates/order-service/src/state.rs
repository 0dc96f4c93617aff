//! 应用状态

use std::sync::Arc;

use order_shared::database::Database;

use crate::service::OrderService;

/// HTTP 层共享状态
#[derive(Clone)]
pub struct AppState {
    pub service: Arc<OrderService>,
    pub db: Database,
}

impl AppState {
    pub fn new(service: Arc<OrderService>, db: Database) -> Self {
        Self { service, db }
    }
}
