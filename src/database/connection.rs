use std::time::Duration;

use sea_orm::{ConnectOptions, Database, DatabaseConnection};
use tracing::{debug, info, warn};

use super::retry::{RetryConfig, with_retry};
use crate::config::DatabaseConfig;
use crate::errors::{AssetDbError, Result};

/// 连接 MySQL 数据库
///
/// 每次任务只需要一个连接，连接池大小固定为 1。
pub async fn connect(config: &DatabaseConfig) -> Result<DatabaseConnection> {
    let url = config.connection_url()?;
    let timeout = Duration::from_secs(config.connect_timeout.max(1));

    let mut opt = ConnectOptions::new(url.to_string());
    opt.max_connections(1)
        .min_connections(1)
        .connect_timeout(timeout)
        .acquire_timeout(timeout)
        .sqlx_logging(false);

    debug!("Connecting to {}", config.redacted_url());

    let db = with_retry("connect", RetryConfig::from(config), || {
        Database::connect(opt.clone())
    })
    .await
    .map_err(|e| {
        AssetDbError::database_connection(format!(
            "Cannot connect to MySQL at {}: {}",
            config.redacted_url(),
            e
        ))
    })?;

    info!(
        "Connected to database '{}' on {}:{}",
        config.name, config.host, config.port
    );
    Ok(db)
}

/// 关闭连接
pub async fn close(db: DatabaseConnection) -> Result<()> {
    db.close().await.map_err(|e| {
        AssetDbError::database_connection(format!("Failed to close connection: {}", e))
    })?;
    debug!("Database connection closed");
    Ok(())
}

/// 建立连接、执行 `op`，无论成功与否都关闭连接
///
/// `op` 的错误优先于关闭连接时的错误返回。
pub async fn with_connection<T, F>(config: &DatabaseConfig, op: F) -> Result<T>
where
    F: AsyncFnOnce(&DatabaseConnection) -> Result<T>,
{
    let db = connect(config).await?;
    run_then_close(db, op, close).await
}

async fn run_then_close<C, T, F, Cl>(conn: C, op: F, close: Cl) -> Result<T>
where
    F: AsyncFnOnce(&C) -> Result<T>,
    Cl: AsyncFnOnce(C) -> Result<()>,
{
    let result = op(&conn).await;
    let closed = close(conn).await;

    match (result, closed) {
        (Ok(value), Ok(())) => Ok(value),
        (Ok(_), Err(close_err)) => Err(close_err),
        (Err(err), Ok(())) => Err(err),
        (Err(err), Err(close_err)) => {
            warn!("{}", close_err.format_simple());
            Err(err)
        }
    }
}
