//! asset_items 分配位置字段
//!
//! 添加 assigned_location_id 列，并建立指向 asset_locations.id 的外键，
//! 位置被删除时置空。列和外键分别检查，部分执行过的数据库也能补齐。

use sea_orm_migration::prelude::*;
use tracing::info;

use crate::schema::{column_exists, foreign_key_exists};

pub const TABLE: &str = "asset_items";
pub const COLUMN: &str = "assigned_location_id";
pub const FOREIGN_KEY: &str = "fk_asset_items_assigned_location";

#[derive(DeriveMigrationName)]
pub struct Migration;

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        // 1. 添加列
        if column_exists(manager, TABLE, COLUMN).await? {
            info!("{}.{} already present, skipping", TABLE, COLUMN);
        } else {
            manager.alter_table(add_assigned_location()).await?;
            info!("Added {}.{}", TABLE, COLUMN);
        }

        // 2. 添加外键
        if foreign_key_exists(manager, TABLE, FOREIGN_KEY).await? {
            info!("Foreign key {} already present, skipping", FOREIGN_KEY);
        } else {
            manager
                .create_foreign_key(assigned_location_foreign_key())
                .await?;
            info!("Added foreign key {}", FOREIGN_KEY);
        }

        Ok(())
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        // 外键必须先于列删除
        if foreign_key_exists(manager, TABLE, FOREIGN_KEY).await? {
            manager
                .drop_foreign_key(
                    ForeignKey::drop()
                        .name(FOREIGN_KEY)
                        .table(AssetItems::Table)
                        .to_owned(),
                )
                .await?;
        }

        if column_exists(manager, TABLE, COLUMN).await? {
            manager
                .alter_table(
                    Table::alter()
                        .table(AssetItems::Table)
                        .drop_column(AssetItems::AssignedLocationId)
                        .to_owned(),
                )
                .await?;
        }

        Ok(())
    }
}

pub(crate) fn add_assigned_location() -> TableAlterStatement {
    Table::alter()
        .table(AssetItems::Table)
        .add_column(
            ColumnDef::new(AssetItems::AssignedLocationId)
                .integer()
                .null(),
        )
        .to_owned()
}

pub(crate) fn assigned_location_foreign_key() -> ForeignKeyCreateStatement {
    ForeignKey::create()
        .name(FOREIGN_KEY)
        .from(AssetItems::Table, AssetItems::AssignedLocationId)
        .to(AssetLocations::Table, AssetLocations::Id)
        .on_delete(ForeignKeyAction::SetNull)
        .on_update(ForeignKeyAction::NoAction)
        .to_owned()
}

#[derive(DeriveIden)]
enum AssetItems {
    #[sea_orm(iden = "asset_items")]
    Table,
    AssignedLocationId,
}

#[derive(DeriveIden)]
enum AssetLocations {
    #[sea_orm(iden = "asset_locations")]
    Table,
    Id,
}
