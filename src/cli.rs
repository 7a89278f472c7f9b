//! Command-line interface definitions using clap
//!
//! This module defines the CLI structure for assetdb using clap's derive macros.

use clap::{Parser, Subcommand};

use migration::targets::{HISTORY_TABLE, LOCATIONS_TABLE};

/// assetdb - Schema migration and verification for the asset-management database
#[derive(Parser, Debug)]
#[command(name = "assetdb")]
#[command(version)]
#[command(about = "Schema migration and verification for the asset-management database", long_about = None)]
pub struct Cli {
    /// Configuration file (default: assetdb.toml, optional)
    #[arg(long, short = 'c', global = true)]
    pub config: Option<String>,

    #[command(subcommand)]
    pub command: Commands,
}

/// Available commands
#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Apply, roll back or list schema migrations
    Migrate {
        #[command(subcommand)]
        action: MigrateCommands,
    },

    /// Print table structure or triggers (read-only)
    Inspect {
        #[command(subcommand)]
        target: InspectCommands,
    },

    /// Check that the migrated schema is in place (read-only)
    Verify {
        /// Output as JSON
        #[arg(long)]
        json: bool,
    },

    /// Render the process-manager declaration as JSON
    Ecosystem {
        /// Output file path (default: stdout)
        #[arg(long, short = 'o')]
        output: Option<String>,
    },

    /// Manage configuration
    Config {
        #[command(subcommand)]
        action: ConfigCommands,
    },
}

/// Migration commands
#[derive(Subcommand, Debug, PartialEq, Eq)]
pub enum MigrateCommands {
    /// Apply pending migrations
    Up {
        /// Number of pending migrations to apply (default: all)
        #[arg(long, short = 'n')]
        steps: Option<u32>,
    },

    /// Roll back applied migrations
    Down {
        /// Number of migrations to roll back
        #[arg(long, short = 'n', default_value_t = 1)]
        steps: u32,
    },

    /// Show applied and pending migrations
    Status,
}

/// Inspection commands
#[derive(Subcommand, Debug, PartialEq, Eq)]
pub enum InspectCommands {
    /// Describe the columns of a table
    Columns {
        #[arg(default_value = LOCATIONS_TABLE)]
        table: String,

        /// Output as JSON
        #[arg(long)]
        json: bool,
    },

    /// List the triggers defined on a table
    Triggers {
        #[arg(default_value = HISTORY_TABLE)]
        table: String,

        /// Output as JSON
        #[arg(long)]
        json: bool,
    },
}

/// Configuration management commands
#[derive(Subcommand, Debug, PartialEq, Eq)]
pub enum ConfigCommands {
    /// Generate example configuration file
    Generate {
        /// Output path (default: assetdb.example.toml)
        output_path: Option<String>,

        /// Overwrite an existing file
        #[arg(long)]
        force: bool,
    },
}
