//! assetdb - schema migration and verification for the asset-management database
//!
//! # Architecture
//! - `config`: static configuration (TOML file + environment, `DB_*` parameters)
//! - `database`: connection lifecycle, retry, read-only introspection
//! - `services`: schema verification
//! - `ecosystem`: process-manager declaration for the backend and frontend
//! - `interfaces`: CLI command implementations
//! - `system`: logging

pub mod cli;
pub mod config;
pub mod database;
pub mod ecosystem;
pub mod errors;
pub mod interfaces;
pub mod services;
pub mod system;
