//! Storage abstraction for the Warden authorization engine.
//!
//! The engine talks to persistence exclusively through [`AccessStore`]; which
//! physical backend sits behind it is invisible to every higher component.
//! This crate ships one backend ([`MemoryStore`]) plus the cross-cutting
//! mutation-audit decorator ([`AuditedStore`]).

pub mod audit;
pub mod codec;
pub mod memory;
pub mod schema;

use async_trait::async_trait;
use warden_core::error::WardenResult;
use warden_core::{Filter, Record, Table};

pub use audit::AuditedStore;
pub use memory::MemoryStore;

/// Abstraction over any durable key/record store.
///
/// Contract, honored by every backend:
/// - Reads return full rows: missing fields are filled from the table schema
///   (see [`schema`]), never partial records.
/// - `set` is the single upsert primitive for create and update alike.
/// - Composite values are serialized to opaque bytes on write and decoded on
///   read (see [`codec`]); scalars pass through unchanged.
/// - Each `set`/`delete` is atomic at single-record granularity; no further
///   ordering is promised to racing callers.
#[async_trait]
pub trait AccessStore: Send + Sync {
    /// Fetch one record by primary key. Absence is `Ok(None)`, never an error.
    async fn get(&self, key: &str, table: Table) -> WardenResult<Option<Record>>;

    /// Fetch every record matching an ordered AND-only filter conjunction.
    /// Empty filters return the whole table.
    async fn get_all(&self, table: Table, filters: &[Filter]) -> WardenResult<Vec<Record>>;

    /// Upsert: overwrite the record at `key` if present, insert it otherwise.
    async fn set(&self, key: &str, table: Table, record: Record) -> WardenResult<()>;

    /// Delete by primary key when `filters` is empty, otherwise delete every
    /// matching record (`key` is ignored). Returns the number of records
    /// removed; deleting nothing is success with 0.
    async fn delete(&self, key: &str, table: Table, filters: &[Filter]) -> WardenResult<u64>;

    /// Append-only insert, used exclusively for event-log tables.
    async fn insert(&self, table: Table, record: Record) -> WardenResult<()>;
}
