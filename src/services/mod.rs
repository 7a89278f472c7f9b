pub mod schema_check;

pub use schema_check::{CheckResult, VerificationReport, verify_schema};
