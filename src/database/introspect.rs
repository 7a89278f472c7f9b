//! 只读的结构探测
//!
//! 所有查询都只读 information_schema，范围限定为 DATABASE()，
//! 表名作为参数绑定而不是拼接进 SQL。

use async_trait::async_trait;
use sea_orm::{DatabaseConnection, DbBackend, FromQueryResult, Statement};
use serde::Serialize;

use crate::errors::{AssetDbError, Result};

/// 一行 DESCRIBE / SHOW COLUMNS 结果
#[derive(Debug, Clone, PartialEq, Eq, Serialize, FromQueryResult)]
pub struct ColumnInfo {
    pub field: String,
    pub column_type: String,
    /// "YES" / "NO"
    pub nullable: String,
    /// "PRI" / "MUL" / "UNI" / ""
    pub column_key: String,
    pub column_default: Option<String>,
    pub extra: String,
}

impl ColumnInfo {
    pub fn is_nullable(&self) -> bool {
        self.nullable.eq_ignore_ascii_case("YES")
    }
}

/// 一行 SHOW TRIGGERS 结果
#[derive(Debug, Clone, PartialEq, Eq, Serialize, FromQueryResult)]
pub struct TriggerInfo {
    pub name: String,
    /// INSERT / UPDATE / DELETE
    pub event: String,
    /// BEFORE / AFTER
    pub timing: String,
    pub statement: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, FromQueryResult)]
pub struct ForeignKeyInfo {
    pub name: String,
    pub column_name: String,
    pub referenced_table: String,
    pub referenced_column: String,
    pub on_delete: String,
}

#[derive(Debug, FromQueryResult)]
struct Total {
    total: i64,
}

#[async_trait]
pub trait SchemaInspector: Send + Sync {
    async fn table_exists(&self, table: &str) -> Result<bool>;
    async fn columns(&self, table: &str) -> Result<Vec<ColumnInfo>>;
    async fn triggers(&self, table: &str) -> Result<Vec<TriggerInfo>>;
    async fn foreign_keys(&self, table: &str) -> Result<Vec<ForeignKeyInfo>>;
}

/// MySQL 表名规则：字母、数字、下划线、$，最长 64
pub fn validate_table_name(table: &str) -> Result<()> {
    let valid = !table.is_empty()
        && table.len() <= 64
        && table
            .chars()
            .all(|c| c.is_ascii_alphanumeric() || c == '_' || c == '$');
    if valid {
        Ok(())
    } else {
        Err(AssetDbError::validation(format!(
            "Invalid table name: '{}'",
            table
        )))
    }
}

const TABLE_EXISTS_SQL: &str = "SELECT COUNT(*) AS total \
     FROM information_schema.TABLES \
     WHERE TABLE_SCHEMA = DATABASE() AND TABLE_NAME = ?";

const COLUMNS_SQL: &str = "SELECT \
       CAST(COLUMN_NAME AS CHAR) AS field, \
       CAST(COLUMN_TYPE AS CHAR) AS column_type, \
       CAST(IS_NULLABLE AS CHAR) AS nullable, \
       CAST(COLUMN_KEY AS CHAR) AS column_key, \
       CAST(COLUMN_DEFAULT AS CHAR) AS column_default, \
       CAST(EXTRA AS CHAR) AS extra \
     FROM information_schema.COLUMNS \
     WHERE TABLE_SCHEMA = DATABASE() AND TABLE_NAME = ? \
     ORDER BY ORDINAL_POSITION";

const TRIGGERS_SQL: &str = "SELECT \
       CAST(TRIGGER_NAME AS CHAR) AS name, \
       CAST(EVENT_MANIPULATION AS CHAR) AS event, \
       CAST(ACTION_TIMING AS CHAR) AS timing, \
       CAST(ACTION_STATEMENT AS CHAR) AS statement \
     FROM information_schema.TRIGGERS \
     WHERE EVENT_OBJECT_SCHEMA = DATABASE() AND EVENT_OBJECT_TABLE = ? \
     ORDER BY ACTION_TIMING, EVENT_MANIPULATION, ACTION_ORDER";

const FOREIGN_KEYS_SQL: &str = "SELECT \
       CAST(k.CONSTRAINT_NAME AS CHAR) AS name, \
       CAST(k.COLUMN_NAME AS CHAR) AS column_name, \
       CAST(k.REFERENCED_TABLE_NAME AS CHAR) AS referenced_table, \
       CAST(k.REFERENCED_COLUMN_NAME AS CHAR) AS referenced_column, \
       CAST(r.DELETE_RULE AS CHAR) AS on_delete \
     FROM information_schema.KEY_COLUMN_USAGE k \
     JOIN information_schema.REFERENTIAL_CONSTRAINTS r \
       ON r.CONSTRAINT_SCHEMA = k.CONSTRAINT_SCHEMA \
      AND r.CONSTRAINT_NAME = k.CONSTRAINT_NAME \
     WHERE k.TABLE_SCHEMA = DATABASE() AND k.TABLE_NAME = ? \
       AND k.REFERENCED_TABLE_NAME IS NOT NULL \
     ORDER BY k.CONSTRAINT_NAME, k.ORDINAL_POSITION";

/// 基于 MySQL information_schema 的实现
pub struct MySqlInspector<'a> {
    db: &'a DatabaseConnection,
}

impl<'a> MySqlInspector<'a> {
    pub fn new(db: &'a DatabaseConnection) -> Self {
        Self { db }
    }

    fn statement(sql: &str, table: &str) -> Result<Statement> {
        validate_table_name(table)?;
        Ok(Statement::from_sql_and_values(
            DbBackend::MySql,
            sql,
            [table.into()],
        ))
    }
}

#[async_trait]
impl SchemaInspector for MySqlInspector<'_> {
    async fn table_exists(&self, table: &str) -> Result<bool> {
        let row = Total::find_by_statement(Self::statement(TABLE_EXISTS_SQL, table)?)
            .one(self.db)
            .await?;
        Ok(row.is_some_and(|r| r.total > 0))
    }

    async fn columns(&self, table: &str) -> Result<Vec<ColumnInfo>> {
        Ok(
            ColumnInfo::find_by_statement(Self::statement(COLUMNS_SQL, table)?)
                .all(self.db)
                .await?,
        )
    }

    async fn triggers(&self, table: &str) -> Result<Vec<TriggerInfo>> {
        Ok(
            TriggerInfo::find_by_statement(Self::statement(TRIGGERS_SQL, table)?)
                .all(self.db)
                .await?,
        )
    }

    async fn foreign_keys(&self, table: &str) -> Result<Vec<ForeignKeyInfo>> {
        Ok(
            ForeignKeyInfo::find_by_statement(Self::statement(FOREIGN_KEYS_SQL, table)?)
                .all(self.db)
                .await?,
        )
    }
}
