//! 数据库连接管理模块
//!
//! 提供 PostgreSQL 连接池管理，支持健康检查和连接配置。

use crate::config::DatabaseConfig;
use crate::error::{OrderError, Result};
use sqlx::postgres::{PgPool, PgPoolOptions};
use std::time::Duration;
use tracing::{info, instrument};

/// 数据库连接池包装
#[derive(Clone)]
pub struct Database {
    pool: PgPool,
}

impl Database {
    /// 创建数据库连接池
    #[instrument(skip(config))]
    pub async fn connect(config: &DatabaseConfig) -> Result<Self> {
        info!("Connecting to database...");

        let pool = PgPoolOptions::new()
            .max_connections(config.max_connections)
            .min_connections(config.min_connections)
            .acquire_timeout(Duration::from_secs(config.connect_timeout_seconds))
            .idle_timeout(Duration::from_secs(config.idle_timeout_seconds))
            .connect(&config.url)
            .await?;

        info!("Database connection pool created");

        Ok(Self { pool })
    }

    /// 从现有连接池构造（服务内测试用 connect_lazy 构造的池）
    pub fn from_pool(pool: PgPool) -> Self {
        Self { pool }
    }

    /// 获取连接池引用
    pub fn pool(&self) -> &PgPool {
        &self.pool
    }

    /// 健康检查
    pub async fn health_check(&self) -> Result<()> {
        sqlx::query("SELECT 1")
            .execute(&self.pool)
            .await
            .map(|_| ())
            .map_err(OrderError::from)
    }

    /// 运行数据库迁移
    ///
    /// 迁移脚本在运行时从目录加载，路径可通过 MIGRATIONS_DIR 覆盖，
    /// 默认取进程工作目录下的 migrations/。
    #[instrument(skip(self))]
    pub async fn run_migrations(&self) -> Result<()> {
        let dir = std::env::var("MIGRATIONS_DIR").unwrap_or_else(|_| "migrations".to_string());

        let migrator = sqlx::migrate::Migrator::new(std::path::Path::new(&dir))
            .await
            .map_err(|e| OrderError::Config(format!("加载迁移脚本失败: {e}")))?;
        migrator
            .run(&self.pool)
            .await
            .map_err(|e| OrderError::Config(format!("执行迁移失败: {e}")))?;

        info!(dir = %dir, "数据库迁移完成");
        Ok(())
    }

    /// 关闭连接池
    pub async fn close(&self) {
        self.pool.close().await;
        info!("Database connection pool closed");
    }
}

impl std::ops::Deref for Database {
    type Target = PgPool;

    fn deref(&self) -> &Self::Target {
        &self.pool
    }
}
