//! Inspect commands (read-only)

use colored::Colorize;

use crate::database::{ColumnInfo, SchemaInspector, TriggerInfo};
use crate::errors::{AssetDbError, Result};

/// 打印表结构（DESCRIBE）
pub async fn inspect_columns(inspector: &dyn SchemaInspector, table: &str, json: bool) -> Result<()> {
    if !inspector.table_exists(table).await? {
        return Err(AssetDbError::validation(format!(
            "Table '{}' does not exist",
            table
        )));
    }

    let columns = inspector.columns(table).await?;
    if json {
        println!("{}", serde_json::to_string_pretty(&columns)?);
    } else {
        print!("{}", render_columns(table, &columns));
    }
    Ok(())
}

/// 打印表上的触发器（SHOW TRIGGERS）
pub async fn inspect_triggers(
    inspector: &dyn SchemaInspector,
    table: &str,
    json: bool,
) -> Result<()> {
    if !inspector.table_exists(table).await? {
        return Err(AssetDbError::validation(format!(
            "Table '{}' does not exist",
            table
        )));
    }

    let triggers = inspector.triggers(table).await?;
    if json {
        println!("{}", serde_json::to_string_pretty(&triggers)?);
    } else {
        print!("{}", render_triggers(table, &triggers));
    }
    Ok(())
}

fn render_columns(table: &str, columns: &[ColumnInfo]) -> String {
    let mut out = format!("{} {}\n\n", "Structure of".bold().green(), table.cyan());

    let field_w = width(columns.iter().map(|c| c.field.as_str()), "Field");
    let type_w = width(columns.iter().map(|c| c.column_type.as_str()), "Type");
    out.push_str(&format!(
        "  {:<field_w$}  {:<type_w$}  {:<4}  {:<3}  {:<10}  {}\n",
        "Field", "Type", "Null", "Key", "Default", "Extra"
    ));

    for c in columns {
        out.push_str(&format!(
            "  {:<field_w$}  {:<type_w$}  {:<4}  {:<3}  {:<10}  {}\n",
            c.field,
            c.column_type,
            c.nullable,
            c.column_key,
            c.column_default.as_deref().unwrap_or("NULL"),
            c.extra
        ));
    }

    out.push_str(&format!(
        "\n{} {} columns\n",
        "ℹ".bold().blue(),
        columns.len()
    ));
    out
}

fn render_triggers(table: &str, triggers: &[TriggerInfo]) -> String {
    if triggers.is_empty() {
        return format!("{} No triggers on {}\n", "ℹ".bold().blue(), table.cyan());
    }

    let mut out = format!("{} {}\n\n", "Triggers on".bold().green(), table.cyan());
    for t in triggers {
        out.push_str(&format!(
            "  {} {} {}\n",
            t.name.cyan(),
            t.timing.yellow(),
            t.event.yellow()
        ));
        for line in t.statement.lines() {
            out.push_str(&format!("    {}\n", line.dimmed()));
        }
    }
    out.push_str(&format!(
        "\n{} {} triggers\n",
        "ℹ".bold().blue(),
        triggers.len()
    ));
    out
}

fn width<'a>(values: impl Iterator<Item = &'a str>, header: &str) -> usize {
    values.map(str::len).chain([header.len()]).max().unwrap_or(0)
}
