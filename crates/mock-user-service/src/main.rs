//! 模拟用户服务
//!
//! 本地开发与联调时替代真实用户服务：按 id 返回确定性的假用户数据，
//! 相同的 id 永远得到相同的用户，便于断言。

use axum::extract::{Path, Query};
use axum::http::StatusCode;
use axum::routing::get;
use axum::{Json, Router};
use serde::{Deserialize, Serialize};
use serde_json::json;
use tracing::info;

const FIRST_NAMES: &[&str] = &[
    "Alice", "Bob", "Carol", "David", "Eve", "Frank", "Grace", "Henry",
];
const LAST_NAMES: &[&str] = &[
    "Anderson", "Brown", "Chen", "Davis", "Evans", "Fischer", "Garcia", "Huang",
];

#[derive(Debug, Clone, Serialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
struct MockUser {
    id: i64,
    first_name: String,
    last_name: String,
    email: String,
}

/// 按 id 确定性地生成假用户
fn user_for_id(id: i64) -> MockUser {
    let index = id.unsigned_abs() as usize;
    let first_name = FIRST_NAMES[index % FIRST_NAMES.len()].to_string();
    let last_name = LAST_NAMES[index / FIRST_NAMES.len() % LAST_NAMES.len()].to_string();
    let email = format!(
        "{}.{}.{}@example.com",
        first_name.to_lowercase(),
        last_name.to_lowercase(),
        id
    );

    MockUser {
        id,
        first_name,
        last_name,
        email,
    }
}

async fn get_user(Path(id): Path<i64>) -> (StatusCode, Json<serde_json::Value>) {
    if id <= 0 {
        return (
            StatusCode::NOT_FOUND,
            Json(json!({ "code": "USER_NOT_FOUND", "message": "User not found" })),
        );
    }
    (StatusCode::OK, Json(serde_json::to_value(user_for_id(id)).unwrap_or_default()))
}

#[derive(Debug, Deserialize)]
struct ByEmailParams {
    email: String,
}

/// 按邮箱反查：邮箱尾部携带 id（user_for_id 生成的格式）
async fn get_user_by_email(
    Query(params): Query<ByEmailParams>,
) -> (StatusCode, Json<serde_json::Value>) {
    let id = params
        .email
        .split('@')
        .next()
        .and_then(|local| local.rsplit('.').next())
        .and_then(|raw| raw.parse::<i64>().ok());

    match id {
        Some(id) if id > 0 && user_for_id(id).email == params.email => (
            StatusCode::OK,
            Json(serde_json::to_value(user_for_id(id)).unwrap_or_default()),
        ),
        _ => (
            StatusCode::NOT_FOUND,
            Json(json!({ "code": "USER_NOT_FOUND", "message": "User not found" })),
        ),
    }
}

async fn health() -> Json<serde_json::Value> {
    Json(json!({ "status": "UP" }))
}

fn build_router() -> Router {
    Router::new()
        .route("/health", get(health))
        .route("/api/user/get/{id}", get(get_user))
        .route("/api/user/get/by-email", get(get_user_by_email))
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "info".into()),
        )
        .init();

    let port: u16 = std::env::var("MOCK_USER_PORT")
        .ok()
        .and_then(|p| p.parse().ok())
        .unwrap_or(8081);

    let listener = tokio::net::TcpListener::bind(("0.0.0.0", port)).await?;
    info!(port, "mock-user-service 已启动");

    axum::serve(listener, build_router()).await?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::body::Body;
    use axum::http::Request;
    use http_body_util::BodyExt;
    use tower::ServiceExt;

    async fn body_json(response: axum::response::Response) -> serde_json::Value {
        let bytes = response.into_body().collect().await.unwrap().to_bytes();
        serde_json::from_slice(&bytes).unwrap()
    }

    #[test]
    fn test_users_are_deterministic() {
        assert_eq!(user_for_id(7), user_for_id(7));
        assert_ne!(user_for_id(1).email, user_for_id(2).email);
    }

    #[tokio::test]
    async fn test_get_user_returns_camel_case_fields() {
        let response = build_router()
            .oneshot(Request::get("/api/user/get/3").body(Body::empty()).unwrap())
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::OK);
        let body = body_json(response).await;
        assert_eq!(body["id"], 3);
        assert!(body.get("firstName").is_some());
        assert!(body.get("lastName").is_some());
        assert!(body.get("email").is_some());
    }

    #[tokio::test]
    async fn test_non_positive_id_is_404() {
        let response = build_router()
            .oneshot(Request::get("/api/user/get/0").body(Body::empty()).unwrap())
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::NOT_FOUND);
    }

    #[tokio::test]
    async fn test_lookup_by_email_round_trips() {
        let user = user_for_id(5);
        let uri = format!("/api/user/get/by-email?email={}", user.email);
        let response = build_router()
            .oneshot(Request::get(&uri).body(Body::empty()).unwrap())
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::OK);
        assert_eq!(body_json(response).await["id"], 5);
    }

    #[tokio::test]
    async fn test_lookup_by_unknown_email_is_404() {
        let response = build_router()
            .oneshot(
                Request::get("/api/user/get/by-email?email=nobody@example.com")
                    .body(Body::empty())
                    .unwrap(),
            )
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::NOT_FOUND);
    }
}
