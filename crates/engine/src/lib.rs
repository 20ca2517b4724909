//! Grant resolution engine: ledger, inheritance closure, aggregation,
//! and access decisions.
//!
//! Every function here is request-scoped and stateless between calls; all
//! state lives behind the [`AccessStore`](warden_store::AccessStore) contract.
//! Pipeline for one decision:
//! `has_access` -> `permissions_of` -> direct grants + group closure ->
//! per-group permission grants -> membership/wildcard check -> access event.

pub mod aggregator;
pub mod decision;
pub mod group;
pub mod guard;
pub mod relationship;
pub mod resolver;
pub mod subject;

pub use decision::has_access;
pub use guard::{controlled, Fallback, Gated};
pub use relationship::EdgeQuery;
pub use subject::Subject;
