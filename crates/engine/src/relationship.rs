//! The relationship ledger: creates, checks, enumerates, deletes, and copies
//! directed grant edges. Exclusive owner of edge lifecycle; the resolver and
//! aggregator only read.

use chrono::Utc;
use smallvec::smallvec;
use warden_core::error::{WardenError, WardenResult};
use warden_core::{Filter, FilterSet, GrantEdge, GrantedKind, PrincipalKind, Table};
use warden_store::AccessStore;

/// Any subset of the four edge-identity columns, AND-combined.
#[derive(Debug, Clone, Default)]
pub struct EdgeQuery {
    pub principal: Option<String>,
    pub principal_kind: Option<PrincipalKind>,
    pub granted: Option<String>,
    pub granted_kind: Option<GrantedKind>,
}

impl EdgeQuery {
    pub fn principal(id: impl Into<String>, kind: PrincipalKind) -> Self {
        Self {
            principal: Some(id.into()),
            principal_kind: Some(kind),
            ..Self::default()
        }
    }

    pub fn granted(id: impl Into<String>, kind: GrantedKind) -> Self {
        Self {
            granted: Some(id.into()),
            granted_kind: Some(kind),
            ..Self::default()
        }
    }

    pub fn granted_kind(mut self, kind: GrantedKind) -> Self {
        self.granted_kind = Some(kind);
        self
    }

    fn filters(&self) -> FilterSet {
        let mut filters: FilterSet = smallvec![];
        if let Some(p) = &self.principal {
            filters.push(Filter::eq("principal", p.clone()));
        }
        if let Some(k) = self.principal_kind {
            filters.push(Filter::eq("principal_type", k.as_str()));
        }
        if let Some(g) = &self.granted {
            filters.push(Filter::eq("granted", g.clone()));
        }
        if let Some(k) = self.granted_kind {
            filters.push(Filter::eq("granted_type", k.as_str()));
        }
        filters
    }

    fn has_principal_pair(&self) -> bool {
        self.principal.is_some() && self.principal_kind.is_some()
    }

    fn has_granted_pair(&self) -> bool {
        self.granted.is_some() && self.granted_kind.is_some()
    }
}

fn require_non_empty(value: &str, name: &str) -> WardenResult<()> {
    if value.is_empty() {
        return Err(WardenError::InvalidArgument(format!(
            "{name} must not be empty"
        )));
    }
    Ok(())
}

/// Create a grant edge. Idempotent by composite key: re-creating an existing
/// edge upserts the same record, refreshing only its timestamp.
pub async fn create(
    store: &dyn AccessStore,
    principal: &str,
    principal_kind: PrincipalKind,
    granted: &str,
    granted_kind: GrantedKind,
) -> WardenResult<()> {
    require_non_empty(principal, "principal")?;
    require_non_empty(granted, "granted")?;

    let edge = GrantEdge {
        principal: principal.to_owned(),
        principal_kind,
        granted: granted.to_owned(),
        granted_kind,
        created_at: Utc::now(),
    };
    let id = edge.id();
    tracing::debug!(edge = %id, "creating relationship");
    store.set(&id, Table::Relationships, edge.to_record()).await
}

/// True iff an edge with exactly this composite id is stored.
pub async fn exists(
    store: &dyn AccessStore,
    principal: &str,
    principal_kind: PrincipalKind,
    granted: &str,
    granted_kind: GrantedKind,
) -> WardenResult<bool> {
    let id = GrantEdge::composite_id(principal, principal_kind, granted, granted_kind);
    Ok(store.get(&id, Table::Relationships).await?.is_some())
}

/// The `granted` ids of every edge matching the query. An empty query
/// returns every granted id in the ledger.
pub async fn get_all(store: &dyn AccessStore, query: &EdgeQuery) -> WardenResult<Vec<String>> {
    Ok(edges(store, query)
        .await?
        .into_iter()
        .map(|e| e.granted)
        .collect())
}

/// Full matching edges, for callers that need both endpoints.
pub async fn edges(store: &dyn AccessStore, query: &EdgeQuery) -> WardenResult<Vec<GrantEdge>> {
    let records = store
        .get_all(Table::Relationships, &query.filters())
        .await?;
    records.iter().map(GrantEdge::from_record).collect()
}

/// Delete one edge by composite id. Permissive: deleting a non-existent edge
/// succeeds; the return value says whether anything was actually removed.
pub async fn delete(
    store: &dyn AccessStore,
    principal: &str,
    principal_kind: PrincipalKind,
    granted: &str,
    granted_kind: GrantedKind,
) -> WardenResult<bool> {
    let id = GrantEdge::composite_id(principal, principal_kind, granted, granted_kind);
    let removed = store.delete(&id, Table::Relationships, &[]).await?;
    Ok(removed > 0)
}

/// Bulk delete: exactly one of the principal pair or the granted pair must be
/// supplied. This is the cascade primitive for removing a group or user
/// entirely. Returns the number of edges removed.
pub async fn delete_all(store: &dyn AccessStore, query: &EdgeQuery) -> WardenResult<u64> {
    let principals = query.has_principal_pair();
    let granteds = query.has_granted_pair();

    if principals && granteds {
        return Err(WardenError::InvalidArgument(
            "delete_all takes either the principal pair or the granted pair, not both".into(),
        ));
    }
    if !principals && !granteds {
        return Err(WardenError::InvalidArgument(
            "delete_all requires one of the principal pair or the granted pair".into(),
        ));
    }

    let removed = store
        .delete("", Table::Relationships, &query.filters())
        .await?;
    tracing::debug!(removed, "bulk-deleted relationships");
    Ok(removed)
}

/// Copy every outgoing edge of `from` onto `to`, preserving the granted side.
/// Used for group duplication.
pub async fn copy(
    store: &dyn AccessStore,
    from: &str,
    from_kind: PrincipalKind,
    to: &str,
    to_kind: PrincipalKind,
) -> WardenResult<()> {
    let outgoing = edges(store, &EdgeQuery::principal(from, from_kind)).await?;
    for edge in outgoing {
        create(store, to, to_kind, &edge.granted, edge.granted_kind).await?;
    }
    Ok(())
}
