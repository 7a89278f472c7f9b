//! Migrate commands

use colored::Colorize;
use sea_orm::DatabaseConnection;
use tracing::{info, warn};

use crate::errors::{AssetDbError, Result, is_already_applied};
use migration::{MigrationStatus, Migrator, MigratorTrait};

/// 应用待执行的迁移
///
/// 重复执行是安全的：已记录的迁移不会再运行，未记录但结构已存在的变更会被跳过。
pub async fn migrate_up(db: &DatabaseConnection, steps: Option<u32>) -> Result<()> {
    let before = pending_count(db).await?;
    if before == 0 {
        println!("{} Schema is up to date", "ℹ".bold().blue());
        return Ok(());
    }

    if let Err(e) = Migrator::up(db, steps).await {
        if !is_already_applied(&e) {
            return Err(AssetDbError::migration(format!("Migration failed: {}", e)));
        }
        // 并发执行时另一进程已经完成了同一变更；Migrator 停在这一条，
        // 再跑一次让前置检查跳过它并补上记录和后续迁移
        warn!("Schema change already applied by another run: {}", e);
        let done = before.saturating_sub(pending_count(db).await?);
        let remaining = remaining_steps(steps, done);
        if remaining != Some(0) {
            Migrator::up(db, remaining)
                .await
                .map_err(|e| AssetDbError::migration(format!("Migration failed: {}", e)))?;
        }
    }

    let after = pending_count(db).await?;
    let applied = before.saturating_sub(after);
    info!("Applied {} migration(s), {} pending", applied, after);
    println!(
        "{} Applied {} migration(s)",
        "✓".bold().green(),
        applied.to_string().green()
    );
    if after > 0 {
        println!("{} {} migration(s) still pending", "ℹ".bold().blue(), after);
    }
    Ok(())
}

async fn pending_count(db: &DatabaseConnection) -> Result<usize> {
    Migrator::get_pending_migrations(db)
        .await
        .map(|p| p.len())
        .map_err(|e| AssetDbError::migration(format!("Failed to read migration state: {}", e)))
}

/// 已完成 `done` 条之后，`--steps` 还剩多少
fn remaining_steps(steps: Option<u32>, done: usize) -> Option<u32> {
    steps.map(|n| n.saturating_sub(u32::try_from(done).unwrap_or(u32::MAX)))
}

/// 回滚最近的迁移
pub async fn migrate_down(db: &DatabaseConnection, steps: u32) -> Result<()> {
    if steps == 0 {
        return Err(AssetDbError::validation("--steps must be at least 1"));
    }

    Migrator::down(db, Some(steps))
        .await
        .map_err(|e| AssetDbError::migration(format!("Rollback failed: {}", e)))?;

    info!("Rolled back up to {} migration(s)", steps);
    println!(
        "{} Rolled back up to {} migration(s)",
        "✓".bold().green(),
        steps.to_string().green()
    );
    Ok(())
}

/// 列出迁移状态
pub async fn migrate_status(db: &DatabaseConnection) -> Result<()> {
    let migrations = Migrator::get_migration_with_status(db)
        .await
        .map_err(|e| AssetDbError::migration(format!("Failed to read migration state: {}", e)))?;

    println!("{}", "Migrations:".bold().green());
    for m in &migrations {
        let status = match m.status() {
            MigrationStatus::Applied => "applied".green(),
            MigrationStatus::Pending => "pending".yellow(),
        };
        println!("  {:<10} {}", status, m.name().cyan());
    }

    let pending = migrations
        .iter()
        .filter(|m| m.status() == MigrationStatus::Pending)
        .count();
    println!();
    println!(
        "{} {} total, {} pending",
        "ℹ".bold().blue(),
        migrations.len(),
        pending.to_string().yellow()
    );
    Ok(())
}
