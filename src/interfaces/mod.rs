//! User-facing interfaces
//!
//! - `cli`: command dispatch for the `assetdb` binary

pub mod cli;
