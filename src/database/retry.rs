//! 数据库连接重试
//!
//! 建立连接时的瞬时错误（连接被拒绝、连接数已满、锁超时）使用指数退避重试。

use sea_orm::DbErr;
use sea_orm::error::RuntimeErr;
use std::future::Future;
use std::time::Duration;
use tokio::time::sleep;
use tracing::{debug, warn};

use crate::config::DatabaseConfig;
use crate::errors::mysql_error_number;

/// MySQL: 连接数已满、死锁、锁超时
const TRANSIENT_NUMBERS: [u16; 3] = [1040, 1213, 1205];
/// MySQL: 数据库访问被拒、用户认证失败、数据库不存在
const FATAL_CONNECT_NUMBERS: [u16; 3] = [1044, 1045, 1049];

/// 错误是否值得再试一次
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Transience {
    Transient,
    Permanent,
}

pub fn classify(err: &DbErr) -> Transience {
    if let Some(number) = mysql_error_number(err) {
        return if TRANSIENT_NUMBERS.contains(&number) {
            Transience::Transient
        } else if FATAL_CONNECT_NUMBERS.contains(&number) {
            Transience::Permanent
        } else {
            // 其他连接阶段的服务端错误按网络抖动处理
            transience_of(matches!(err, DbErr::Conn(_)))
        };
    }

    match err {
        DbErr::ConnectionAcquire(_) => Transience::Transient,
        DbErr::Conn(e) => transience_of(!is_fatal_message(&runtime_message(e))),
        DbErr::Exec(e) | DbErr::Query(e) => {
            transience_of(is_transient_message(&runtime_message(e)))
        }
        _ => Transience::Permanent,
    }
}

pub fn is_retryable_error(err: &DbErr) -> bool {
    classify(err) == Transience::Transient
}

fn transience_of(retry: bool) -> Transience {
    if retry {
        Transience::Transient
    } else {
        Transience::Permanent
    }
}

fn runtime_message(err: &RuntimeErr) -> String {
    err.to_string().to_lowercase()
}

fn is_transient_message(msg: &str) -> bool {
    msg.contains("deadlock")
        || msg.contains("lock wait timeout")
        || msg.contains("too many connections")
        || msg.contains("connection refused")
}

fn is_fatal_message(msg: &str) -> bool {
    msg.contains("access denied") || msg.contains("unknown database")
}

/// 重试配置
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RetryConfig {
    pub max_retries: u32,
    pub base_delay_ms: u64,
    pub max_delay_ms: u64,
}

impl Default for RetryConfig {
    fn default() -> Self {
        Self {
            max_retries: 3,
            base_delay_ms: 100,
            max_delay_ms: 2000,
        }
    }
}

impl From<&DatabaseConfig> for RetryConfig {
    fn from(config: &DatabaseConfig) -> Self {
        Self {
            max_retries: config.retry_count,
            base_delay_ms: config.retry_base_delay_ms,
            max_delay_ms: config.retry_max_delay_ms,
        }
    }
}

/// 指数退避重试执行器
///
/// 暂时性错误按指数退避加随机抖动重试，最多 `max_retries` 次；永久性错误立即返回。
pub async fn with_retry<T, F, Fut>(
    operation_name: &str,
    config: RetryConfig,
    mut operation: F,
) -> Result<T, DbErr>
where
    F: FnMut() -> Fut,
    Fut: Future<Output = Result<T, DbErr>>,
{
    let mut retries = 0;
    loop {
        let err = match operation().await {
            Ok(value) => {
                if retries > 0 {
                    debug!("'{}' succeeded after {} retries", operation_name, retries);
                }
                return Ok(value);
            }
            Err(err) => err,
        };

        if classify(&err) == Transience::Permanent {
            debug!("'{}' failed permanently: {}", operation_name, err);
            return Err(err);
        }
        if retries >= config.max_retries {
            warn!("'{}' gave up after {} retries: {}", operation_name, retries, err);
            return Err(err);
        }

        retries += 1;
        let delay = calculate_backoff(retries, config.base_delay_ms, config.max_delay_ms);
        warn!(
            "'{}' failed (retry {}/{}), next attempt in {} ms: {}",
            operation_name, retries, config.max_retries, delay, err
        );
        sleep(Duration::from_millis(delay)).await;
    }
}

/// 计算指数退避延迟（带 0-25% 抖动）
fn calculate_backoff(retry: u32, base_ms: u64, max_ms: u64) -> u64 {
    use rand::RngExt;
    let capped = base_ms
        .saturating_mul(2u64.saturating_pow(retry.saturating_sub(1)))
        .min(max_ms);
    capped.saturating_add(rand::rng().random_range(0..=capped / 4))
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicU32, Ordering};

    #[test]
    fn test_is_retryable_error_connection_acquire() {
        let err = DbErr::ConnectionAcquire(sea_orm::error::ConnAcquireErr::Timeout);
        assert!(is_retryable_error(&err));
    }

    #[test]
    fn test_is_retryable_error_conn() {
        let err = DbErr::Conn(sea_orm::error::RuntimeErr::Internal(
            "connection lost".to_string(),
        ));
        assert!(is_retryable_error(&err));
    }

    #[test]
    fn test_is_retryable_error_too_many_connections() {
        let err = DbErr::Exec(sea_orm::error::RuntimeErr::Internal(
            "Too many connections".to_string(),
        ));
        assert!(is_retryable_error(&err));
    }

    #[test]
    fn test_access_denied_is_permanent() {
        let err = DbErr::Conn(sea_orm::error::RuntimeErr::Internal(
            "error returned from database: 1045 (28000): Access denied for user 'rosyd'@'localhost'"
                .to_string(),
        ));
        assert_eq!(classify(&err), Transience::Permanent);
    }

    #[test]
    fn test_unknown_database_is_permanent() {
        let err = DbErr::Conn(sea_orm::error::RuntimeErr::Internal(
            "Unknown database 'reactappv3_db'".to_string(),
        ));
        assert!(!is_retryable_error(&err));
    }

    #[test]
    fn test_duplicate_column_is_not_retryable() {
        let err = DbErr::Exec(sea_orm::error::RuntimeErr::Internal(
            "Duplicate column name 'is_deleted'".to_string(),
        ));
        assert!(!is_retryable_error(&err));
    }

    #[test]
    fn test_retry_config_from_database_config() {
        let db = DatabaseConfig {
            retry_count: 5,
            retry_base_delay_ms: 50,
            retry_max_delay_ms: 800,
            ..Default::default()
        };
        assert_eq!(
            RetryConfig::from(&db),
            RetryConfig {
                max_retries: 5,
                base_delay_ms: 50,
                max_delay_ms: 800,
            }
        );
    }

    #[test]
    fn test_calculate_backoff_exponential() {
        let delay1 = calculate_backoff(1, 100, 2000);
        assert!((100..=125).contains(&delay1));

        let delay2 = calculate_backoff(2, 100, 2000);
        assert!((200..=250).contains(&delay2));

        let delay3 = calculate_backoff(3, 100, 2000);
        assert!((400..=500).contains(&delay3));
    }

    #[test]
    fn test_calculate_backoff_capped_at_max() {
        let delay = calculate_backoff(10, 100, 2000);
        assert!((2000..=2500).contains(&delay));
    }

    #[tokio::test]
    async fn test_with_retry_success_after_retries() {
        let config = RetryConfig {
            max_retries: 3,
            base_delay_ms: 10,
            max_delay_ms: 50,
        };
        let call_count = AtomicU32::new(0);

        let result = with_retry("connect", config, || {
            let count = call_count.fetch_add(1, Ordering::SeqCst);
            async move {
                if count < 2 {
                    Err(DbErr::ConnectionAcquire(
                        sea_orm::error::ConnAcquireErr::Timeout,
                    ))
                } else {
                    Ok(42)
                }
            }
        })
        .await;

        assert_eq!(result.unwrap(), 42);
        assert_eq!(call_count.load(Ordering::SeqCst), 3);
    }

    #[tokio::test]
    async fn test_with_retry_exhausted() {
        let config = RetryConfig {
            max_retries: 2,
            base_delay_ms: 10,
            max_delay_ms: 50,
        };
        let call_count = AtomicU32::new(0);

        let result = with_retry("connect", config, || {
            call_count.fetch_add(1, Ordering::SeqCst);
            async {
                Err::<i32, _>(DbErr::Conn(sea_orm::error::RuntimeErr::Internal(
                    "connection refused".to_string(),
                )))
            }
        })
        .await;

        assert!(result.is_err());
        assert_eq!(call_count.load(Ordering::SeqCst), 3);
    }

    #[tokio::test]
    async fn test_with_retry_non_retryable_error_no_retry() {
        let call_count = AtomicU32::new(0);

        let result = with_retry("connect", RetryConfig::default(), || {
            call_count.fetch_add(1, Ordering::SeqCst);
            async { Err::<i32, _>(DbErr::RecordNotFound("not found".to_string())) }
        })
        .await;

        assert!(result.is_err());
        assert_eq!(call_count.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn test_with_retry_does_not_retry_access_denied() {
        let call_count = AtomicU32::new(0);

        let result = with_retry("connect", RetryConfig::default(), || {
            call_count.fetch_add(1, Ordering::SeqCst);
            async {
                Err::<i32, _>(DbErr::Conn(sea_orm::error::RuntimeErr::Internal(
                    "Access denied for user 'rosyd'@'localhost' (using password: YES)"
                        .to_string(),
                )))
            }
        })
        .await;

        assert!(result.is_err());
        assert_eq!(call_count.load(Ordering::SeqCst), 1);
    }
}
