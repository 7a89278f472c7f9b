//! CLI command implementations
//!
//! This module re-exports all CLI command functions.

mod config_gen;
mod ecosystem;
mod inspect;
mod migrate;
mod verify;

pub use config_gen::*;
pub use ecosystem::*;
pub use inspect::*;
pub use migrate::*;
pub use verify::*;
