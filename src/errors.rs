use std::fmt;

use sea_orm::DbErr;
use sea_orm::error::RuntimeErr;
use sea_orm::sqlx::mysql::MySqlDatabaseError;

/// MySQL ER_DUP_FIELDNAME
pub const MYSQL_DUPLICATE_FIELD: u16 = 1060;
/// MySQL ER_DUP_KEYNAME
pub const MYSQL_DUPLICATE_KEY_NAME: u16 = 1061;
/// MySQL ER_FK_DUP_NAME
pub const MYSQL_DUPLICATE_FOREIGN_KEY: u16 = 1826;
/// ER_DUP_FIELDNAME 对应的 SQLSTATE；另外两个错误号的 SQLSTATE 是通用类别
const SQLSTATE_DUPLICATE_COLUMN: &str = "42S21";

#[derive(Debug, Clone)]
pub enum AssetDbError {
    DatabaseConfig(String),
    DatabaseConnection(String),
    DatabaseOperation(String),
    Migration(String),
    Validation(String),
    FileOperation(String),
    Serialization(String),
    Verification(String),
}

impl AssetDbError {
    /// 获取错误代码
    pub fn code(&self) -> &'static str {
        match self {
            AssetDbError::DatabaseConfig(_) => "E001",
            AssetDbError::DatabaseConnection(_) => "E002",
            AssetDbError::DatabaseOperation(_) => "E003",
            AssetDbError::Migration(_) => "E004",
            AssetDbError::Validation(_) => "E005",
            AssetDbError::FileOperation(_) => "E006",
            AssetDbError::Serialization(_) => "E007",
            AssetDbError::Verification(_) => "E008",
        }
    }

    /// 获取错误类型名称
    pub fn error_type(&self) -> &'static str {
        match self {
            AssetDbError::DatabaseConfig(_) => "Database Configuration Error",
            AssetDbError::DatabaseConnection(_) => "Database Connection Error",
            AssetDbError::DatabaseOperation(_) => "Database Operation Error",
            AssetDbError::Migration(_) => "Migration Error",
            AssetDbError::Validation(_) => "Validation Error",
            AssetDbError::FileOperation(_) => "File Operation Error",
            AssetDbError::Serialization(_) => "Serialization Error",
            AssetDbError::Verification(_) => "Verification Failed",
        }
    }

    /// 获取错误详情
    pub fn message(&self) -> &str {
        match self {
            AssetDbError::DatabaseConfig(msg)
            | AssetDbError::DatabaseConnection(msg)
            | AssetDbError::DatabaseOperation(msg)
            | AssetDbError::Migration(msg)
            | AssetDbError::Validation(msg)
            | AssetDbError::FileOperation(msg)
            | AssetDbError::Serialization(msg)
            | AssetDbError::Verification(msg) => msg,
        }
    }

    /// 格式化为彩色输出（终端）
    pub fn format_colored(&self) -> String {
        use colored::Colorize;
        format!(
            "{} {} {}\n  {}",
            "[ERROR]".red().bold(),
            self.code().yellow(),
            self.error_type().red(),
            self.message().white()
        )
    }

    /// 格式化为简洁输出（日志）
    pub fn format_simple(&self) -> String {
        format!("{}: {}", self.error_type(), self.message())
    }
}

impl fmt::Display for AssetDbError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.format_simple())
    }
}

impl std::error::Error for AssetDbError {}

// 便捷的构造函数
impl AssetDbError {
    pub fn database_config<T: Into<String>>(msg: T) -> Self {
        AssetDbError::DatabaseConfig(msg.into())
    }

    pub fn database_connection<T: Into<String>>(msg: T) -> Self {
        AssetDbError::DatabaseConnection(msg.into())
    }

    pub fn database_operation<T: Into<String>>(msg: T) -> Self {
        AssetDbError::DatabaseOperation(msg.into())
    }

    pub fn migration<T: Into<String>>(msg: T) -> Self {
        AssetDbError::Migration(msg.into())
    }

    pub fn validation<T: Into<String>>(msg: T) -> Self {
        AssetDbError::Validation(msg.into())
    }

    pub fn file_operation<T: Into<String>>(msg: T) -> Self {
        AssetDbError::FileOperation(msg.into())
    }

    pub fn serialization<T: Into<String>>(msg: T) -> Self {
        AssetDbError::Serialization(msg.into())
    }

    pub fn verification<T: Into<String>>(msg: T) -> Self {
        AssetDbError::Verification(msg.into())
    }
}

/// 判断数据库错误是否表示结构变更已经存在
///
/// 迁移本身通过 information_schema 预先检查；这里只用于把并发执行时
/// 另一进程抢先完成的变更归类为无害结果。
pub fn is_already_applied(err: &DbErr) -> bool {
    let runtime_err = match err {
        DbErr::Exec(e) | DbErr::Query(e) => e,
        _ => return false,
    };

    match runtime_err {
        RuntimeErr::SqlxError(sqlx_err) => {
            if let Some(db_err) = sqlx_err.as_database_error() {
                // code() 是 SQLSTATE，具体的错误号要从 MySQL 错误里取
                if let Some(mysql_err) = db_err.try_downcast_ref::<MySqlDatabaseError>()
                    && is_duplicate_number(mysql_err.number())
                {
                    return true;
                }
                if db_err.code().as_deref() == Some(SQLSTATE_DUPLICATE_COLUMN) {
                    return true;
                }
                if is_duplicate_message(db_err.message()) {
                    return true;
                }
            }
            is_duplicate_message(&sqlx_err.to_string())
        }
        RuntimeErr::Internal(msg) => is_duplicate_message(msg),
        #[allow(unreachable_patterns)]
        _ => false,
    }
}

/// 取出 MySQL 服务端错误号（连接、执行、查询错误均可）
pub fn mysql_error_number(err: &DbErr) -> Option<u16> {
    let runtime_err = match err {
        DbErr::Conn(e) | DbErr::Exec(e) | DbErr::Query(e) => e,
        _ => return None,
    };
    match runtime_err {
        RuntimeErr::SqlxError(sqlx_err) => sqlx_err
            .as_database_error()?
            .try_downcast_ref::<MySqlDatabaseError>()
            .map(|e| e.number()),
        _ => None,
    }
}

fn is_duplicate_number(number: u16) -> bool {
    matches!(
        number,
        MYSQL_DUPLICATE_FIELD | MYSQL_DUPLICATE_KEY_NAME | MYSQL_DUPLICATE_FOREIGN_KEY
    )
}

fn is_duplicate_message(msg: &str) -> bool {
    let msg = msg.to_lowercase();
    msg.contains("duplicate column name")
        || msg.contains("duplicate key name")
        || msg.contains("duplicate foreign key constraint name")
}

// 为常见的错误类型实现 From trait
impl From<DbErr> for AssetDbError {
    fn from(err: DbErr) -> Self {
        AssetDbError::DatabaseOperation(err.to_string())
    }
}

impl From<std::io::Error> for AssetDbError {
    fn from(err: std::io::Error) -> Self {
        AssetDbError::FileOperation(err.to_string())
    }
}

impl From<serde_json::Error> for AssetDbError {
    fn from(err: serde_json::Error) -> Self {
        AssetDbError::Serialization(err.to_string())
    }
}

impl From<toml::ser::Error> for AssetDbError {
    fn from(err: toml::ser::Error) -> Self {
        AssetDbError::Serialization(err.to_string())
    }
}

impl From<config::ConfigError> for AssetDbError {
    fn from(err: config::ConfigError) -> Self {
        AssetDbError::DatabaseConfig(err.to_string())
    }
}

impl From<url::ParseError> for AssetDbError {
    fn from(err: url::ParseError) -> Self {
        AssetDbError::DatabaseConfig(format!("Invalid database URL: {}", err))
    }
}

pub type Result<T> = std::result::Result<T, AssetDbError>;

#[cfg(test)]
mod tests {
    use super::*;
    use sea_orm::sqlx;
    use sea_orm::sqlx::error::{DatabaseError, ErrorKind};
    use std::borrow::Cow;
    use std::sync::Arc;

    /// 只带 SQLSTATE 与消息的驱动错误
    #[derive(Debug)]
    struct StateOnlyError {
        state: &'static str,
        message: &'static str,
    }

    impl fmt::Display for StateOnlyError {
        fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
            write!(f, "{}: {}", self.state, self.message)
        }
    }

    impl std::error::Error for StateOnlyError {}

    impl DatabaseError for StateOnlyError {
        fn message(&self) -> &str {
            self.message
        }

        fn code(&self) -> Option<Cow<'_, str>> {
            Some(Cow::Borrowed(self.state))
        }

        fn as_error(&self) -> &(dyn std::error::Error + Send + Sync + 'static) {
            self
        }

        fn as_error_mut(&mut self) -> &mut (dyn std::error::Error + Send + Sync + 'static) {
            self
        }

        fn into_error(self: Box<Self>) -> Box<dyn std::error::Error + Send + Sync + 'static> {
            self
        }

        fn kind(&self) -> ErrorKind {
            ErrorKind::Other
        }
    }

    fn driver_error(state: &'static str, message: &'static str) -> DbErr {
        let err = sqlx::Error::Database(Box::new(StateOnlyError { state, message }));
        DbErr::Exec(RuntimeErr::SqlxError(Arc::new(err)))
    }

    #[test]
    fn test_codes_are_unique() {
        let errors = [
            AssetDbError::database_config("x"),
            AssetDbError::database_connection("x"),
            AssetDbError::database_operation("x"),
            AssetDbError::migration("x"),
            AssetDbError::validation("x"),
            AssetDbError::file_operation("x"),
            AssetDbError::serialization("x"),
            AssetDbError::verification("x"),
        ];
        let mut codes: Vec<&str> = errors.iter().map(|e| e.code()).collect();
        codes.sort();
        codes.dedup();
        assert_eq!(codes.len(), errors.len());
    }

    #[test]
    fn test_duplicate_column_message_is_already_applied() {
        let err = DbErr::Exec(RuntimeErr::Internal(
            "Duplicate column name 'is_deleted'".to_string(),
        ));
        assert!(is_already_applied(&err));
    }

    #[test]
    fn test_duplicate_foreign_key_message_is_already_applied() {
        let err = DbErr::Exec(RuntimeErr::Internal(
            "Duplicate foreign key constraint name 'fk_asset_items_assigned_location'"
                .to_string(),
        ));
        assert!(is_already_applied(&err));
    }

    #[test]
    fn test_other_errors_are_not_already_applied() {
        let err = DbErr::Exec(RuntimeErr::Internal(
            "Table 'reactappv3_db.asset_items' doesn't exist".to_string(),
        ));
        assert!(!is_already_applied(&err));
        assert!(!is_already_applied(&DbErr::RecordNotFound("x".into())));
    }

    #[test]
    fn test_duplicate_numbers() {
        assert!(is_duplicate_number(1060));
        assert!(is_duplicate_number(1061));
        assert!(is_duplicate_number(1826));
        assert!(!is_duplicate_number(1213));
    }

    #[test]
    fn test_duplicate_column_sqlstate_is_already_applied() {
        let err = driver_error("42S21", "Duplicate column name 'is_deleted'");
        assert!(is_already_applied(&err));
    }

    #[test]
    fn test_duplicate_key_name_under_generic_sqlstate() {
        let err = driver_error("42000", "Duplicate key name 'fk_asset_items_assigned_location'");
        assert!(is_already_applied(&err));
    }

    #[test]
    fn test_driver_error_with_other_state_is_not_already_applied() {
        let err = driver_error("42S02", "Table 'reactappv3_db.asset_items' doesn't exist");
        assert!(!is_already_applied(&err));
    }

    #[test]
    fn test_mysql_error_number_absent_for_other_drivers() {
        assert_eq!(mysql_error_number(&driver_error("42S21", "x")), None);
        assert_eq!(
            mysql_error_number(&DbErr::Conn(RuntimeErr::Internal("x".into()))),
            None
        );
    }
}
