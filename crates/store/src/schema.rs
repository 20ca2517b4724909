//! Fixed field schemas for the logical tables.
//!
//! Backends differ in how they store sparse rows; the schema registry masks
//! that by filling missing fields with `Null` on every read, so callers
//! always see the full declared field set.

use warden_core::{Record, Table, Value};

/// The declared field set for a table, in storage order.
pub fn fields(table: Table) -> &'static [&'static str] {
    match table {
        Table::Groups => &["id", "created_at"],
        Table::Relationships => &[
            "id",
            "principal",
            "principal_type",
            "granted",
            "granted_type",
            "ts",
        ],
        Table::AccessEvents => &["user_id", "permission", "ts", "allowed"],
        Table::AdminEvents => &["ts", "table_name", "operation", "vals", "where_val"],
    }
}

/// Fill every declared field that is absent from `record` with `Null`.
pub fn apply_defaults(table: Table, record: &mut Record) {
    for field in fields(table) {
        if !record.contains(field) {
            record.set(*field, Value::Null);
        }
    }
}
