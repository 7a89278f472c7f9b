//! CLI interface module
//!
//! Every database-backed command runs inside `with_connection`, so the
//! connection is released on success and on failure alike.

pub mod commands;

use crate::cli::{Commands, ConfigCommands, InspectCommands, MigrateCommands};
use crate::config::StaticConfig;
use crate::database::{MySqlInspector, validate_table_name, with_connection};
use crate::errors::Result;

/// Run a CLI command from clap-parsed input
pub async fn run_cli_command(cmd: Commands, config: &StaticConfig) -> Result<()> {
    match cmd {
        Commands::Migrate { action } => {
            with_connection(&config.database, async |db| {
                match action {
                    MigrateCommands::Up { steps } => commands::migrate_up(db, steps).await,
                    MigrateCommands::Down { steps } => commands::migrate_down(db, steps).await,
                    MigrateCommands::Status => commands::migrate_status(db).await,
                }
            })
            .await
        }

        Commands::Inspect { target } => match target {
            InspectCommands::Columns { table, json } => {
                validate_table_name(&table)?;
                with_connection(&config.database, async |db| {
                    commands::inspect_columns(&MySqlInspector::new(db), &table, json).await
                })
                .await
            }
            InspectCommands::Triggers { table, json } => {
                validate_table_name(&table)?;
                with_connection(&config.database, async |db| {
                    commands::inspect_triggers(&MySqlInspector::new(db), &table, json).await
                })
                .await
            }
        },

        Commands::Verify { json } => {
            with_connection(&config.database, async |db| {
                commands::verify(&MySqlInspector::new(db), json).await
            })
            .await
        }

        Commands::Ecosystem { output } => {
            commands::render_ecosystem(&config.apps, output.as_deref())
        }

        Commands::Config { action } => match action {
            ConfigCommands::Generate { output_path, force } => {
                commands::config_generate(output_path, force)
            }
        },
    }
}
