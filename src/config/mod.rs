//! Configuration management
//!
//! Static configuration is read once per invocation from an optional TOML
//! file and the environment. `.env` is loaded by `main` before this runs.

mod structs;

pub use structs::*;
