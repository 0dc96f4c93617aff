//! 订单服务入口
//!
//! 启动流程：加载配置 -> 初始化日志与指标 -> 连接数据库 -> 组装服务 ->
//! 启动支付事件消费者 -> 启动 HTTP 服务 -> 优雅关闭。

use std::sync::Arc;

use anyhow::Result;
use tokio::signal;
use tokio::sync::watch;
use tracing::{error, info, warn};

use order_shared::config::AppConfig;
use order_shared::database::Database;
use order_shared::observability;

use order_service::consumer;
use order_service::repository::{PgItemStore, PgOrderStore};
use order_service::routes::build_router;
use order_service::service::OrderService;
use order_service::state::AppState;
use order_service::user_client::{HttpUserClient, UserInfoGateway};

#[tokio::main]
async fn main() -> Result<()> {
    // 1. 加载配置
    let config = AppConfig::load("order-service").unwrap_or_else(|e| {
        eprintln!("配置加载失败，使用默认配置: {e}");
        AppConfig::default()
    });

    // 2. 初始化日志与指标
    observability::init(&config.observability)?;

    info!(
        environment = %config.environment,
        "order-service 启动中"
    );

    // 3. 连接数据库
    let db = Database::connect(&config.database).await?;
    db.run_migrations().await?;
    let pool = db.pool().clone();
    info!("数据库连接已建立");

    // 4. 组装仓储、用户服务网关与业务服务
    let order_store = Arc::new(PgOrderStore::new(pool.clone()));
    let item_store = Arc::new(PgItemStore::new(pool));

    let user_client = Arc::new(HttpUserClient::new(&config.user_service)?);
    let user_gateway = UserInfoGateway::new(user_client, &config.user_service);

    let service = Arc::new(OrderService::new(order_store, item_store, user_gateway));

    // 5. 启动支付事件消费者
    let (shutdown_tx, shutdown_rx) = watch::channel(false);
    let consumer_handle = tokio::spawn({
        let kafka_config = config.kafka.clone();
        let service = Arc::clone(&service);
        async move {
            if let Err(e) = consumer::run_payment_consumer(&kafka_config, service, shutdown_rx).await
            {
                error!(error = %e, "支付事件消费者异常退出");
            }
        }
    });

    // 6. 启动 HTTP 服务
    let state = AppState::new(service, db.clone());
    let router = build_router(state);

    let addr = config.server_addr();
    let listener = tokio::net::TcpListener::bind(&addr).await?;
    info!(addr = %addr, "HTTP 服务已启动");

    axum::serve(listener, router)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    // 7. 优雅关闭：先停消费者，再关连接池
    info!("HTTP 服务已停止，正在关闭后台任务");
    if shutdown_tx.send(true).is_err() {
        warn!("消费者已提前退出");
    }
    if let Err(e) = consumer_handle.await {
        warn!(error = %e, "等待消费者退出失败");
    }

    db.close().await;
    info!("order-service 已退出");
    Ok(())
}

/// 等待进程终止信号（Ctrl+C 或 SIGTERM）
async fn shutdown_signal() {
    let ctrl_c = async {
        signal::ctrl_c().await.expect("注册 Ctrl+C 信号处理失败");
    };

    #[cfg(unix)]
    let terminate = async {
        signal::unix::signal(signal::unix::SignalKind::terminate())
            .expect("注册 SIGTERM 信号处理失败")
            .recv()
            .await;
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => info!("收到 Ctrl+C，开始优雅关闭"),
        _ = terminate => info!("收到 SIGTERM，开始优雅关闭"),
    }
}
