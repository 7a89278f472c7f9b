//! Database access
//!
//! - `connection`: connect / close / scoped connection
//! - `retry`: backoff for transient connection errors
//! - `introspect`: read-only information_schema queries

pub mod connection;
pub mod introspect;
pub mod retry;

pub use connection::{close, connect, with_connection};
pub use introspect::{
    ColumnInfo, ForeignKeyInfo, MySqlInspector, SchemaInspector, TriggerInfo,
    validate_table_name,
};
