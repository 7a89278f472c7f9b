//! asset_credentials 软删除字段
//!
//! 添加 is_deleted 列（可空布尔值，默认 false）。
//! 列已存在时跳过，兼容手工执行过旧脚本的数据库。

use sea_orm_migration::prelude::*;
use tracing::info;

use crate::schema::column_exists;

pub const TABLE: &str = "asset_credentials";
pub const COLUMN: &str = "is_deleted";

#[derive(DeriveMigrationName)]
pub struct Migration;

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        if column_exists(manager, TABLE, COLUMN).await? {
            info!("{}.{} already present, skipping", TABLE, COLUMN);
            return Ok(());
        }

        manager.alter_table(add_is_deleted()).await?;
        info!("Added {}.{}", TABLE, COLUMN);
        Ok(())
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        if !column_exists(manager, TABLE, COLUMN).await? {
            return Ok(());
        }

        manager
            .alter_table(
                Table::alter()
                    .table(AssetCredentials::Table)
                    .drop_column(AssetCredentials::IsDeleted)
                    .to_owned(),
            )
            .await
    }
}

pub(crate) fn add_is_deleted() -> TableAlterStatement {
    Table::alter()
        .table(AssetCredentials::Table)
        .add_column(
            ColumnDef::new(AssetCredentials::IsDeleted)
                .boolean()
                .null()
                .default(false),
        )
        .to_owned()
}

#[derive(DeriveIden)]
enum AssetCredentials {
    #[sea_orm(iden = "asset_credentials")]
    Table,
    IsDeleted,
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::schema::fixtures::{ddl_ok, has_column, is_ddl, issued_sql};
    use sea_orm::sea_query::{MysqlQueryBuilder, SchemaStatementBuilder};
    use sea_orm::{DbBackend, MockDatabase};

    #[tokio::test]
    async fn test_up_twice_alters_once() {
        let db = MockDatabase::new(DbBackend::MySql)
            .append_query_results([has_column(false), has_column(true)])
            .append_exec_results([ddl_ok()])
            .into_connection();
        let manager = SchemaManager::new(&db);

        Migration.up(&manager).await.unwrap();
        Migration.up(&manager).await.unwrap();

        let sql = issued_sql(db);
        assert_eq!(sql.len(), 3);
        let ddl: Vec<&String> = sql.iter().filter(|s| is_ddl(s)).collect();
        assert_eq!(ddl.len(), 1);
        assert!(ddl[0].contains("ADD COLUMN `is_deleted`"));
        // 第二次只做了探测
        assert!(!is_ddl(&sql[2]));
    }

    #[tokio::test]
    async fn test_down_without_column_is_noop() {
        let db = MockDatabase::new(DbBackend::MySql)
            .append_query_results([has_column(false)])
            .into_connection();
        let manager = SchemaManager::new(&db);

        Migration.down(&manager).await.unwrap();

        assert!(issued_sql(db).iter().all(|s| !is_ddl(s)));
    }

    #[test]
    fn test_add_is_deleted_sql() {
        let sql = add_is_deleted().to_string(MysqlQueryBuilder);

        assert!(sql.starts_with("ALTER TABLE `asset_credentials`"));
        assert!(sql.contains("ADD COLUMN `is_deleted`"));
        assert!(sql.contains("NULL"));
        assert!(sql.contains("DEFAULT"));
    }

    #[test]
    fn test_migration_name_is_stable() {
        assert_eq!(
            Migration.name(),
            "m20250301_000001_credentials_soft_delete"
        );
    }
}
