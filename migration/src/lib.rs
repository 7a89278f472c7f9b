pub use sea_orm_migration::MigrationStatus;
pub use sea_orm_migration::prelude::*;

mod m20250301_000001_credentials_soft_delete;
mod m20250301_000002_items_assigned_location;
pub mod schema;

/// 迁移涉及的表、列和约束名
pub mod targets {
    pub use crate::m20250301_000001_credentials_soft_delete::{
        COLUMN as CREDENTIALS_SOFT_DELETE_COLUMN, TABLE as CREDENTIALS_TABLE,
    };
    pub use crate::m20250301_000002_items_assigned_location::{
        COLUMN as ITEMS_LOCATION_COLUMN, FOREIGN_KEY as ITEMS_LOCATION_FOREIGN_KEY,
        TABLE as ITEMS_TABLE,
    };

    pub const LOCATIONS_TABLE: &str = "asset_locations";
    pub const HISTORY_TABLE: &str = "asset_history";
}

pub struct Migrator;

#[async_trait::async_trait]
impl MigratorTrait for Migrator {
    fn migrations() -> Vec<Box<dyn MigrationTrait>> {
        vec![
            Box::new(m20250301_000001_credentials_soft_delete::Migration),
            Box::new(m20250301_000002_items_assigned_location::Migration),
        ]
    }
}
