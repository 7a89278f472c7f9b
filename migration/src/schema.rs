//! 迁移共用的结构探测
//!
//! 所有 ALTER TABLE 之前都先查询 information_schema，
//! 已存在的列或外键直接跳过，保证迁移可以重复执行。

use sea_orm::{DbBackend, FromQueryResult, Statement};
use sea_orm_migration::prelude::*;

#[derive(Debug, FromQueryResult)]
struct Total {
    total: i64,
}

/// 检查列是否存在（当前数据库）
pub async fn column_exists(
    manager: &SchemaManager<'_>,
    table: &str,
    column: &str,
) -> Result<bool, DbErr> {
    manager.has_column(table, column).await
}

/// 检查外键约束是否存在（当前数据库）
pub async fn foreign_key_exists(
    manager: &SchemaManager<'_>,
    table: &str,
    constraint: &str,
) -> Result<bool, DbErr> {
    let backend = manager.get_database_backend();
    if backend != DbBackend::MySql {
        return Err(DbErr::Custom(format!(
            "foreign key introspection is only supported on MySQL, got {:?}",
            backend
        )));
    }

    let stmt = Statement::from_sql_and_values(
        backend,
        FOREIGN_KEY_EXISTS_SQL,
        [table.into(), constraint.into()],
    );

    let row = Total::find_by_statement(stmt)
        .one(manager.get_connection())
        .await?;

    Ok(row.is_some_and(|r| r.total > 0))
}

const FOREIGN_KEY_EXISTS_SQL: &str = "SELECT COUNT(*) AS total \
     FROM information_schema.TABLE_CONSTRAINTS \
     WHERE CONSTRAINT_SCHEMA = DATABASE() \
       AND TABLE_NAME = ? \
       AND CONSTRAINT_NAME = ? \
       AND CONSTRAINT_TYPE = 'FOREIGN KEY'";
