//! Domain models, shared types, and error definitions.
//!
//! Foundation crate -- no async or I/O dependencies.

pub mod error;
pub mod types;

pub use error::WardenError;
pub use types::{
    AccessEvent, Filter, FilterSet, GrantEdge, GrantedKind, GroupRecord, MutationEvent,
    MutationOp, PrincipalKind, Record, Table, Value, WILDCARD,
};
