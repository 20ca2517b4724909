//! Mutation-audit decorator around any [`AccessStore`].
//!
//! Every `set`/`delete` against a ledger table (`groups`, `relationships`)
//! gets a [`MutationEvent`] appended to `admin_events` through the same
//! backend, right after the primary mutation succeeds. A failed audit append
//! is a reportable inconsistency, not a failed mutation: it is logged at
//! `warn` and the call still returns success.

use crate::AccessStore;
use async_trait::async_trait;
use chrono::Utc;
use std::collections::BTreeMap;
use warden_core::error::WardenResult;
use warden_core::{Filter, MutationEvent, MutationOp, Record, Table, Value};

/// Wraps a backend and mirrors ledger mutations into the audit log.
#[derive(Debug)]
pub struct AuditedStore<S> {
    inner: S,
}

impl<S: AccessStore> AuditedStore<S> {
    pub fn new(inner: S) -> Self {
        Self { inner }
    }

    pub fn inner(&self) -> &S {
        &self.inner
    }

    pub fn into_inner(self) -> S {
        self.inner
    }

    async fn log_mutation(&self, table: Table, op: MutationOp, values: Value, where_clause: Value) {
        let event = MutationEvent {
            ts: Utc::now(),
            table,
            op,
            values,
            where_clause,
        };

        if let Err(e) = self.inner.insert(Table::AdminEvents, event.to_record()).await {
            tracing::warn!(table = %table, op = op.as_str(), error = %e, "failed to append mutation event");
        }
    }
}

fn record_value(record: &Record) -> Value {
    Value::Map(
        record
            .fields()
            .map(|(field, value)| (field.clone(), value.clone()))
            .collect(),
    )
}

fn filters_value(filters: &[Filter]) -> Value {
    if filters.is_empty() {
        return Value::Null;
    }
    Value::List(
        filters
            .iter()
            .map(|f| {
                let mut m = BTreeMap::new();
                m.insert("column".to_owned(), Value::Text(f.column.clone()));
                m.insert("value".to_owned(), f.value.clone());
                Value::Map(m)
            })
            .collect(),
    )
}

#[async_trait]
impl<S: AccessStore> AccessStore for AuditedStore<S> {
    async fn get(&self, key: &str, table: Table) -> WardenResult<Option<Record>> {
        self.inner.get(key, table).await
    }

    async fn get_all(&self, table: Table, filters: &[Filter]) -> WardenResult<Vec<Record>> {
        self.inner.get_all(table, filters).await
    }

    async fn set(&self, key: &str, table: Table, record: Record) -> WardenResult<()> {
        let values = record_value(&record);
        self.inner.set(key, table, record).await?;
        if table.is_ledger() {
            self.log_mutation(table, MutationOp::Set, values, Value::Null)
                .await;
        }
        Ok(())
    }

    async fn delete(&self, key: &str, table: Table, filters: &[Filter]) -> WardenResult<u64> {
        let removed = self.inner.delete(key, table, filters).await?;
        if table.is_ledger() {
            self.log_mutation(
                table,
                MutationOp::Delete,
                Value::Text(key.to_owned()),
                filters_value(filters),
            )
            .await;
        }
        Ok(removed)
    }

    async fn insert(&self, table: Table, record: Record) -> WardenResult<()> {
        self.inner.insert(table, record).await
    }
}
