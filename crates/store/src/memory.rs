//! In-process backend: keyed tables plus append-only event logs.
//!
//! Intended for tests and single-process deployments. Records still travel
//! through the [`codec`](crate::codec) on every write and read so the
//! encoding boundary behaves exactly as it would against a real backend.

use crate::{codec, schema, AccessStore};
use async_trait::async_trait;
use std::collections::{BTreeMap, HashMap};
use tokio::sync::RwLock;
use warden_core::error::WardenResult;
use warden_core::{Filter, Record, Table};

/// Thread-safe in-memory store. Cheap to construct per test.
#[derive(Debug, Default)]
pub struct MemoryStore {
    /// Primary-keyed tables (`groups`, `relationships`).
    keyed: RwLock<HashMap<Table, BTreeMap<String, Record>>>,
    /// Append-only event logs (`access_events`, `admin_events`).
    logs: RwLock<HashMap<Table, Vec<Record>>>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }
}

fn matches(record: &Record, filters: &[Filter]) -> bool {
    filters
        .iter()
        .all(|f| record.get(&f.column) == Some(&f.value))
}

fn present(record: Record, table: Table) -> Record {
    let mut out = codec::decode_record(record);
    schema::apply_defaults(table, &mut out);
    out
}

#[async_trait]
impl AccessStore for MemoryStore {
    async fn get(&self, key: &str, table: Table) -> WardenResult<Option<Record>> {
        if table.is_event_log() {
            return Ok(None);
        }
        let keyed = self.keyed.read().await;
        Ok(keyed
            .get(&table)
            .and_then(|rows| rows.get(key))
            .map(|r| present(r.clone(), table)))
    }

    async fn get_all(&self, table: Table, filters: &[Filter]) -> WardenResult<Vec<Record>> {
        let rows: Vec<Record> = if table.is_event_log() {
            let logs = self.logs.read().await;
            logs.get(&table).cloned().unwrap_or_default()
        } else {
            let keyed = self.keyed.read().await;
            keyed
                .get(&table)
                .map(|rows| rows.values().cloned().collect())
                .unwrap_or_default()
        };

        // Filters run against the decoded, default-filled view, so a query
        // sees exactly what a read would return.
        Ok(rows
            .into_iter()
            .map(|r| present(r, table))
            .filter(|r| matches(r, filters))
            .collect())
    }

    async fn set(&self, key: &str, table: Table, record: Record) -> WardenResult<()> {
        let encoded = codec::encode_record(record)?;
        let mut keyed = self.keyed.write().await;
        keyed
            .entry(table)
            .or_default()
            .insert(key.to_owned(), encoded);
        Ok(())
    }

    async fn delete(&self, key: &str, table: Table, filters: &[Filter]) -> WardenResult<u64> {
        let mut keyed = self.keyed.write().await;
        let Some(rows) = keyed.get_mut(&table) else {
            return Ok(0);
        };

        if filters.is_empty() {
            Ok(rows.remove(key).map_or(0, |_| 1))
        } else {
            let before = rows.len();
            rows.retain(|_, record| !matches(&present(record.clone(), table), filters));
            Ok((before - rows.len()) as u64)
        }
    }

    async fn insert(&self, table: Table, record: Record) -> WardenResult<()> {
        let encoded = codec::encode_record(record)?;
        let mut logs = self.logs.write().await;
        logs.entry(table).or_default().push(encoded);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use warden_core::Value;

    fn edge_record(principal: &str, granted: &str) -> (String, Record) {
        let id = format!("{principal}-user-{granted}-permission");
        let record = Record::new()
            .with("id", Value::Text(id.clone()))
            .with("principal", Value::Text(principal.into()))
            .with("principal_type", Value::Text("user".into()))
            .with("granted", Value::Text(granted.into()))
            .with("granted_type", Value::Text("permission".into()));
        (id, record)
    }

    #[tokio::test]
    async fn set_then_get_fills_defaults() {
        let store = MemoryStore::new();
        let (id, record) = edge_record("alice", "open");
        store.set(&id, Table::Relationships, record).await.unwrap();

        let got = store.get(&id, Table::Relationships).await.unwrap().unwrap();
        assert_eq!(got.str_field("granted"), Some("open"));
        // `ts` was never written; the schema fills it.
        assert_eq!(got.get("ts"), Some(&Value::Null));
    }

    #[tokio::test]
    async fn set_is_an_upsert() {
        let store = MemoryStore::new();
        let (id, record) = edge_record("alice", "open");
        store
            .set(&id, Table::Relationships, record.clone())
            .await
            .unwrap();
        store.set(&id, Table::Relationships, record).await.unwrap();

        let all = store.get_all(Table::Relationships, &[]).await.unwrap();
        assert_eq!(all.len(), 1);
    }

    #[tokio::test]
    async fn get_all_applies_and_conjunction() {
        let store = MemoryStore::new();
        for (principal, granted) in [("alice", "open"), ("alice", "close"), ("bob", "open")] {
            let (id, record) = edge_record(principal, granted);
            store.set(&id, Table::Relationships, record).await.unwrap();
        }

        let filters = [
            Filter::eq("principal", "alice"),
            Filter::eq("granted", "open"),
        ];
        let hits = store
            .get_all(Table::Relationships, &filters)
            .await
            .unwrap();
        assert_eq!(hits.len(), 1);
        assert_eq!(hits[0].str_field("principal"), Some("alice"));
    }

    #[tokio::test]
    async fn filtered_delete_counts() {
        let store = MemoryStore::new();
        for (principal, granted) in [("alice", "open"), ("alice", "close"), ("bob", "open")] {
            let (id, record) = edge_record(principal, granted);
            store.set(&id, Table::Relationships, record).await.unwrap();
        }

        let removed = store
            .delete("", Table::Relationships, &[Filter::eq("principal", "alice")])
            .await
            .unwrap();
        assert_eq!(removed, 2);
        assert_eq!(
            store.get_all(Table::Relationships, &[]).await.unwrap().len(),
            1
        );
    }

    #[tokio::test]
    async fn delete_missing_key_is_success() {
        let store = MemoryStore::new();
        let removed = store
            .delete("nope", Table::Relationships, &[])
            .await
            .unwrap();
        assert_eq!(removed, 0);
    }

    #[tokio::test]
    async fn event_log_appends() {
        let store = MemoryStore::new();
        for _ in 0..3 {
            store
                .insert(
                    Table::AccessEvents,
                    Record::new().with("user_id", Value::Text("alice".into())),
                )
                .await
                .unwrap();
        }
        let events = store.get_all(Table::AccessEvents, &[]).await.unwrap();
        assert_eq!(events.len(), 3);
        // Defaults apply to log tables too.
        assert_eq!(events[0].get("allowed"), Some(&Value::Null));
    }

    #[tokio::test]
    async fn filters_see_the_decoded_defaulted_view() {
        let store = MemoryStore::new();
        // `ts` is never written; the schema defaults it to Null on read.
        let (id, record) = edge_record("alice", "open");
        store.set(&id, Table::Relationships, record).await.unwrap();

        let null_ts = [Filter {
            column: "ts".into(),
            value: Value::Null,
        }];
        let hits = store.get_all(Table::Relationships, &null_ts).await.unwrap();
        assert_eq!(hits.len(), 1);

        // Composite filter values match the decoded form, not the stored bytes.
        let stamp = Value::List(vec![Value::Int(2026), Value::Int(8)]);
        let record = Record::new()
            .with("id", Value::Text("g".into()))
            .with("created_at", stamp.clone());
        store.set("g", Table::Groups, record).await.unwrap();

        let by_composite = [Filter {
            column: "created_at".into(),
            value: stamp,
        }];
        let hits = store.get_all(Table::Groups, &by_composite).await.unwrap();
        assert_eq!(hits.len(), 1);

        // Bulk delete uses the same view as the reads above.
        let removed = store
            .delete("", Table::Relationships, &null_ts)
            .await
            .unwrap();
        assert_eq!(removed, 1);
    }

    #[tokio::test]
    async fn composite_values_are_opaque_in_storage() {
        let store = MemoryStore::new();
        let record = Record::new()
            .with("id", Value::Text("g".into()))
            .with(
                "created_at",
                Value::List(vec![Value::Int(2026), Value::Int(8)]),
            );
        store.set("g", Table::Groups, record).await.unwrap();

        let got = store.get("g", Table::Groups).await.unwrap().unwrap();
        assert_eq!(
            got.get("created_at"),
            Some(&Value::List(vec![Value::Int(2026), Value::Int(8)]))
        );
    }
}
