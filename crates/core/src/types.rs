//! Domain types for the Warden authorization engine.

use crate::error::{WardenError, WardenResult};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use smallvec::SmallVec;
use std::collections::BTreeMap;
use std::fmt;
use std::str::FromStr;

/// The sentinel permission name meaning "every permission".
pub const WILDCARD: &str = "*";

// ---------------------------------------------------------------------------
// Principals and grants
// ---------------------------------------------------------------------------

/// What kind of entity sits on the granting side of an edge.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum PrincipalKind {
    User,
    Group,
}

impl PrincipalKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            PrincipalKind::User => "user",
            PrincipalKind::Group => "group",
        }
    }
}

impl fmt::Display for PrincipalKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for PrincipalKind {
    type Err = WardenError;

    fn from_str(s: &str) -> WardenResult<Self> {
        match s {
            "user" => Ok(PrincipalKind::User),
            "group" => Ok(PrincipalKind::Group),
            other => Err(WardenError::InvalidArgument(format!(
                "principal_type must be one of user, group; got {other:?}"
            ))),
        }
    }
}

/// What kind of object is being granted: membership in a group, or a
/// permission.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum GrantedKind {
    Group,
    Permission,
}

impl GrantedKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            GrantedKind::Group => "group",
            GrantedKind::Permission => "permission",
        }
    }
}

impl fmt::Display for GrantedKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for GrantedKind {
    type Err = WardenError;

    fn from_str(s: &str) -> WardenResult<Self> {
        match s {
            "group" => Ok(GrantedKind::Group),
            "permission" => Ok(GrantedKind::Permission),
            other => Err(WardenError::InvalidArgument(format!(
                "granted_type must be one of group, permission; got {other:?}"
            ))),
        }
    }
}

/// A directed, typed grant edge: `principal -> granted`.
///
/// The 4-tuple `(principal, principal_kind, granted, granted_kind)` is the
/// edge's identity. Edges are immutable once created; re-creating one only
/// refreshes `created_at`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct GrantEdge {
    pub principal: String,
    pub principal_kind: PrincipalKind,
    pub granted: String,
    pub granted_kind: GrantedKind,
    pub created_at: DateTime<Utc>,
}

impl GrantEdge {
    /// Composite primary key: the four identity fields joined with `-`.
    ///
    /// The join is unescaped, so ids that themselves contain `-` can alias
    /// another tuple's key. Filtered queries always constrain the four
    /// columns separately and are unaffected; keyed `get`/`delete` assume
    /// principal and granted names keep `-` out of ambiguous positions.
    pub fn composite_id(
        principal: &str,
        principal_kind: PrincipalKind,
        granted: &str,
        granted_kind: GrantedKind,
    ) -> String {
        format!(
            "{principal}-{}-{granted}-{}",
            principal_kind.as_str(),
            granted_kind.as_str()
        )
    }

    pub fn id(&self) -> String {
        Self::composite_id(
            &self.principal,
            self.principal_kind,
            &self.granted,
            self.granted_kind,
        )
    }

    pub fn to_record(&self) -> Record {
        Record::new()
            .with("id", Value::Text(self.id()))
            .with("principal", Value::Text(self.principal.clone()))
            .with(
                "principal_type",
                Value::Text(self.principal_kind.as_str().into()),
            )
            .with("granted", Value::Text(self.granted.clone()))
            .with(
                "granted_type",
                Value::Text(self.granted_kind.as_str().into()),
            )
            .with("ts", Value::Text(self.created_at.to_rfc3339()))
    }

    pub fn from_record(record: &Record) -> WardenResult<Self> {
        let field = |name: &str| {
            record.str_field(name).map(str::to_owned).ok_or_else(|| {
                WardenError::Internal(format!("relationship record missing field {name:?}"))
            })
        };
        Ok(GrantEdge {
            principal: field("principal")?,
            principal_kind: field("principal_type")?.parse()?,
            granted: field("granted")?,
            granted_kind: field("granted_type")?.parse()?,
            created_at: parse_ts(&field("ts")?)?,
        })
    }
}

/// A named group: the only principal kind with its own record.
///
/// Grants and inheritance live in the relationships table; the group record
/// itself carries nothing but its name and creation time.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct GroupRecord {
    pub name: String,
    pub created_at: DateTime<Utc>,
}

impl GroupRecord {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            created_at: Utc::now(),
        }
    }

    pub fn to_record(&self) -> Record {
        Record::new()
            .with("id", Value::Text(self.name.clone()))
            .with("created_at", Value::Text(self.created_at.to_rfc3339()))
    }

    pub fn from_record(record: &Record) -> WardenResult<Self> {
        let name = record
            .str_field("id")
            .ok_or_else(|| WardenError::Internal("group record missing field \"id\"".into()))?;
        let ts = record
            .str_field("created_at")
            .ok_or_else(|| WardenError::Internal("group record missing field \"created_at\"".into()))?;
        Ok(GroupRecord {
            name: name.to_owned(),
            created_at: parse_ts(ts)?,
        })
    }
}

// ---------------------------------------------------------------------------
// Audit events
// ---------------------------------------------------------------------------

/// One access check, logged exactly once per `has_access` call. Append-only.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AccessEvent {
    pub user_id: String,
    pub permission: String,
    pub ts: DateTime<Utc>,
    pub allowed: bool,
}

impl AccessEvent {
    pub fn to_record(&self) -> Record {
        Record::new()
            .with("user_id", Value::Text(self.user_id.clone()))
            .with("permission", Value::Text(self.permission.clone()))
            .with("ts", Value::Text(self.ts.to_rfc3339()))
            .with("allowed", Value::Bool(self.allowed))
    }
}

/// The mutating store operations the audit trail distinguishes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum MutationOp {
    Set,
    Delete,
}

impl MutationOp {
    pub fn as_str(&self) -> &'static str {
        match self {
            MutationOp::Set => "set",
            MutationOp::Delete => "delete",
        }
    }
}

/// One ledger mutation, written by the audit decorator alongside every
/// `set`/`delete` against a ledger table. Append-only.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MutationEvent {
    pub ts: DateTime<Utc>,
    pub table: Table,
    pub op: MutationOp,
    /// The record written, for `set`; the primary key, for keyed `delete`.
    pub values: Value,
    /// The filter conjunction, for bulk `delete`; `Null` otherwise.
    pub where_clause: Value,
}

impl MutationEvent {
    pub fn to_record(&self) -> Record {
        Record::new()
            .with("ts", Value::Text(self.ts.to_rfc3339()))
            .with("table_name", Value::Text(self.table.as_str().into()))
            .with("operation", Value::Text(self.op.as_str().into()))
            .with("vals", self.values.clone())
            .with("where_val", self.where_clause.clone())
    }
}

// ---------------------------------------------------------------------------
// Storage primitives
// ---------------------------------------------------------------------------

/// The fixed logical tables the engine requires of any backend.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Table {
    Groups,
    Relationships,
    AccessEvents,
    AdminEvents,
}

impl Table {
    pub const ALL: [Table; 4] = [
        Table::Groups,
        Table::Relationships,
        Table::AccessEvents,
        Table::AdminEvents,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            Table::Groups => "groups",
            Table::Relationships => "relationships",
            Table::AccessEvents => "access_events",
            Table::AdminEvents => "admin_events",
        }
    }

    /// Ledger tables get the mutation-audit wrapper; event tables do not.
    pub fn is_ledger(&self) -> bool {
        matches!(self, Table::Groups | Table::Relationships)
    }

    /// Event tables are append-only and have no meaningful primary key.
    pub fn is_event_log(&self) -> bool {
        matches!(self, Table::AccessEvents | Table::AdminEvents)
    }
}

impl fmt::Display for Table {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A stored field value.
///
/// `List` and `Map` only exist above the store boundary; backends serialize
/// them to opaque `Bytes` on write and decode transparently on read. Scalars
/// pass through unchanged.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum Value {
    Null,
    Bool(bool),
    Int(i64),
    Float(f64),
    Text(String),
    Bytes(Vec<u8>),
    List(Vec<Value>),
    Map(BTreeMap<String, Value>),
}

impl Value {
    pub fn is_composite(&self) -> bool {
        matches!(self, Value::List(_) | Value::Map(_))
    }

    pub fn as_str(&self) -> Option<&str> {
        match self {
            Value::Text(s) => Some(s),
            _ => None,
        }
    }

    pub fn as_bool(&self) -> Option<bool> {
        match self {
            Value::Bool(b) => Some(*b),
            _ => None,
        }
    }
}

/// A full row: field name -> value. Backends always return full rows, with
/// missing fields defaulted from the table schema.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Record(BTreeMap<String, Value>);

impl Record {
    pub fn new() -> Self {
        Self::default()
    }

    /// Builder-style insert.
    pub fn with(mut self, field: impl Into<String>, value: Value) -> Self {
        self.0.insert(field.into(), value);
        self
    }

    pub fn set(&mut self, field: impl Into<String>, value: Value) {
        self.0.insert(field.into(), value);
    }

    pub fn get(&self, field: &str) -> Option<&Value> {
        self.0.get(field)
    }

    pub fn contains(&self, field: &str) -> bool {
        self.0.contains_key(field)
    }

    pub fn str_field(&self, field: &str) -> Option<&str> {
        self.0.get(field).and_then(Value::as_str)
    }

    pub fn bool_field(&self, field: &str) -> Option<bool> {
        self.0.get(field).and_then(Value::as_bool)
    }

    pub fn fields(&self) -> impl Iterator<Item = (&String, &Value)> {
        self.0.iter()
    }

    pub fn fields_mut(&mut self) -> impl Iterator<Item = (&String, &mut Value)> {
        self.0.iter_mut()
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

/// One equality constraint: `column = value`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Filter {
    pub column: String,
    pub value: Value,
}

impl Filter {
    pub fn eq(column: impl Into<String>, value: impl Into<String>) -> Self {
        Self {
            column: column.into(),
            value: Value::Text(value.into()),
        }
    }
}

/// An ordered AND-only conjunction. Queries never constrain more than the
/// four identity columns, so this stays on the stack.
pub type FilterSet = SmallVec<[Filter; 4]>;

fn parse_ts(raw: &str) -> WardenResult<DateTime<Utc>> {
    DateTime::parse_from_rfc3339(raw)
        .map(|dt| dt.with_timezone(&Utc))
        .map_err(|e| WardenError::Internal(format!("bad timestamp {raw:?}: {e}")))
}
