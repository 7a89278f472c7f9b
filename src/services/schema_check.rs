//! 结构校验
//!
//! 只读地检查迁移结果：软删除列、分配位置列及其外键、
//! 以及被探测的 asset_locations / asset_history 表。

use serde::Serialize;
use tracing::debug;

use crate::database::{ColumnInfo, SchemaInspector};
use crate::errors::Result;
use migration::targets::{
    CREDENTIALS_SOFT_DELETE_COLUMN, CREDENTIALS_TABLE, HISTORY_TABLE, ITEMS_LOCATION_COLUMN,
    ITEMS_LOCATION_FOREIGN_KEY, ITEMS_TABLE, LOCATIONS_TABLE,
};

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct CheckResult {
    pub name: String,
    pub passed: bool,
    pub detail: String,
}

impl CheckResult {
    fn pass(name: impl Into<String>, detail: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            passed: true,
            detail: detail.into(),
        }
    }

    fn fail(name: impl Into<String>, detail: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            passed: false,
            detail: detail.into(),
        }
    }
}

#[derive(Debug, Clone, Default, Serialize)]
pub struct VerificationReport {
    pub checks: Vec<CheckResult>,
}

impl VerificationReport {
    pub fn is_ok(&self) -> bool {
        self.checks.iter().all(|c| c.passed)
    }

    pub fn failures(&self) -> impl Iterator<Item = &CheckResult> {
        self.checks.iter().filter(|c| !c.passed)
    }
}

/// 执行全部校验
pub async fn verify_schema(inspector: &dyn SchemaInspector) -> Result<VerificationReport> {
    let mut report = VerificationReport::default();

    report.checks.push(check_soft_delete(inspector).await?);
    report.checks.push(check_assigned_location(inspector).await?);
    report.checks.push(check_location_foreign_key(inspector).await?);
    report.checks.push(check_table(inspector, LOCATIONS_TABLE).await?);
    report.checks.push(check_history_triggers(inspector).await?);

    debug!(
        "Schema verification finished: {}/{} checks passed",
        report.checks.iter().filter(|c| c.passed).count(),
        report.checks.len()
    );
    Ok(report)
}

async fn find_column(
    inspector: &dyn SchemaInspector,
    table: &str,
    column: &str,
) -> Result<Option<ColumnInfo>> {
    Ok(inspector
        .columns(table)
        .await?
        .into_iter()
        .find(|c| c.field == column))
}

async fn check_soft_delete(inspector: &dyn SchemaInspector) -> Result<CheckResult> {
    let name = format!("{}.{}", CREDENTIALS_TABLE, CREDENTIALS_SOFT_DELETE_COLUMN);

    let Some(col) = find_column(inspector, CREDENTIALS_TABLE, CREDENTIALS_SOFT_DELETE_COLUMN).await?
    else {
        return Ok(CheckResult::fail(name, "column missing"));
    };

    let ty = col.column_type.to_ascii_lowercase();
    if !(ty.starts_with("tinyint") || ty.starts_with("bool")) {
        return Ok(CheckResult::fail(
            name,
            format!("expected boolean, found {}", col.column_type),
        ));
    }
    if !col.is_nullable() {
        return Ok(CheckResult::fail(name, "expected nullable column"));
    }

    Ok(CheckResult::pass(
        name,
        format!(
            "{} NULL DEFAULT {}",
            col.column_type,
            col.column_default.as_deref().unwrap_or("NULL")
        ),
    ))
}

async fn check_assigned_location(inspector: &dyn SchemaInspector) -> Result<CheckResult> {
    let name = format!("{}.{}", ITEMS_TABLE, ITEMS_LOCATION_COLUMN);

    let Some(col) = find_column(inspector, ITEMS_TABLE, ITEMS_LOCATION_COLUMN).await? else {
        return Ok(CheckResult::fail(name, "column missing"));
    };

    if !col.column_type.to_ascii_lowercase().starts_with("int") {
        return Ok(CheckResult::fail(
            name,
            format!("expected int, found {}", col.column_type),
        ));
    }
    if !col.is_nullable() {
        return Ok(CheckResult::fail(name, "expected nullable column"));
    }

    Ok(CheckResult::pass(name, format!("{} NULL", col.column_type)))
}

async fn check_location_foreign_key(inspector: &dyn SchemaInspector) -> Result<CheckResult> {
    let name = ITEMS_LOCATION_FOREIGN_KEY.to_string();

    let fk = inspector
        .foreign_keys(ITEMS_TABLE)
        .await?
        .into_iter()
        .find(|fk| fk.column_name == ITEMS_LOCATION_COLUMN);

    let Some(fk) = fk else {
        return Ok(CheckResult::fail(
            name,
            format!("no foreign key on {}.{}", ITEMS_TABLE, ITEMS_LOCATION_COLUMN),
        ));
    };

    if fk.referenced_table != LOCATIONS_TABLE || fk.referenced_column != "id" {
        return Ok(CheckResult::fail(
            name,
            format!(
                "{} references {}.{}, expected {}.id",
                fk.name, fk.referenced_table, fk.referenced_column, LOCATIONS_TABLE
            ),
        ));
    }
    if !fk.on_delete.eq_ignore_ascii_case("SET NULL") {
        return Ok(CheckResult::fail(
            name,
            format!("ON DELETE {}, expected SET NULL", fk.on_delete),
        ));
    }

    Ok(CheckResult::pass(
        name,
        format!(
            "{} -> {}.{} ON DELETE SET NULL",
            fk.name, fk.referenced_table, fk.referenced_column
        ),
    ))
}

async fn check_table(inspector: &dyn SchemaInspector, table: &str) -> Result<CheckResult> {
    if !inspector.table_exists(table).await? {
        return Ok(CheckResult::fail(table, "table missing"));
    }
    let columns = inspector.columns(table).await?;
    Ok(CheckResult::pass(table, format!("{} columns", columns.len())))
}

async fn check_history_triggers(inspector: &dyn SchemaInspector) -> Result<CheckResult> {
    if !inspector.table_exists(HISTORY_TABLE).await? {
        return Ok(CheckResult::fail(HISTORY_TABLE, "table missing"));
    }
    let triggers = inspector.triggers(HISTORY_TABLE).await?;
    let names: Vec<&str> = triggers.iter().map(|t| t.name.as_str()).collect();
    let detail = if names.is_empty() {
        "no triggers".to_string()
    } else {
        format!("{} triggers: {}", names.len(), names.join(", "))
    };
    Ok(CheckResult::pass(HISTORY_TABLE, detail))
}
