//! 健康检查处理器

use axum::extract::State;
use axum::http::StatusCode;
use axum::Json;
use serde_json::json;
use tracing::error;

use crate::state::AppState;

/// 存活探针：进程在即健康
pub async fn health() -> Json<serde_json::Value> {
    Json(json!({ "status": "UP" }))
}

/// 就绪探针：数据库可达才算就绪
pub async fn ready(State(state): State<AppState>) -> (StatusCode, Json<serde_json::Value>) {
    match state.db.health_check().await {
        Ok(()) => (StatusCode::OK, Json(json!({ "status": "READY" }))),
        Err(e) => {
            error!(error = %e, "就绪检查失败：数据库不可达");
            (
                StatusCode::SERVICE_UNAVAILABLE,
                Json(json!({ "status": "NOT_READY" })),
            )
        }
    }
}
