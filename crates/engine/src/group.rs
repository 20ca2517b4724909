//! Group lifecycle: create, rename, duplicate, delete, and grant management.
//!
//! Name-conflict and missing-group conditions return `Ok(false)` rather than
//! errors; callers treat them as ordinary outcomes, not faults.

use crate::relationship::{self, EdgeQuery};
use crate::resolver;
use std::collections::BTreeSet;
use warden_core::error::{WardenError, WardenResult};
use warden_core::{GrantedKind, GroupRecord, PrincipalKind, Table};
use warden_store::AccessStore;

/// Initial grants for a freshly created group.
#[derive(Debug, Clone, Default)]
pub struct GroupSpec {
    pub permissions: Vec<String>,
    pub inherits: Vec<String>,
    pub users: Vec<String>,
}

pub async fn get(store: &dyn AccessStore, name: &str) -> WardenResult<Option<GroupRecord>> {
    match store.get(name, Table::Groups).await? {
        Some(record) => Ok(Some(GroupRecord::from_record(&record)?)),
        None => Ok(None),
    }
}

pub async fn get_all(store: &dyn AccessStore) -> WardenResult<Vec<GroupRecord>> {
    store
        .get_all(Table::Groups, &[])
        .await?
        .iter()
        .map(GroupRecord::from_record)
        .collect()
}

pub async fn exists(store: &dyn AccessStore, name: &str) -> WardenResult<bool> {
    Ok(store.get(name, Table::Groups).await?.is_some())
}

/// Create a group and its initial grant edges. `Ok(false)` if the name is
/// already taken.
pub async fn create(store: &dyn AccessStore, name: &str, spec: &GroupSpec) -> WardenResult<bool> {
    if name.is_empty() {
        return Err(WardenError::InvalidArgument(
            "group name must not be empty".into(),
        ));
    }
    if exists(store, name).await? {
        return Ok(false);
    }

    let group = GroupRecord::new(name);
    store.set(name, Table::Groups, group.to_record()).await?;

    for permission in &spec.permissions {
        relationship::create(store, name, PrincipalKind::Group, permission, GrantedKind::Permission)
            .await?;
    }
    for parent in &spec.inherits {
        relationship::create(store, name, PrincipalKind::Group, parent, GrantedKind::Group)
            .await?;
    }
    for user in &spec.users {
        relationship::create(store, user, PrincipalKind::User, name, GrantedKind::Group).await?;
    }

    tracing::info!(group = name, "created group");
    Ok(true)
}

/// Delete a group and cascade: every edge where it is the principal and
/// every edge where it is the granted target goes with it. Deleting a
/// missing group is a no-op success.
pub async fn delete(store: &dyn AccessStore, name: &str) -> WardenResult<()> {
    if !exists(store, name).await? {
        return Ok(());
    }

    store.delete(name, Table::Groups, &[]).await?;
    let outgoing =
        relationship::delete_all(store, &EdgeQuery::principal(name, PrincipalKind::Group)).await?;
    let incoming =
        relationship::delete_all(store, &EdgeQuery::granted(name, GrantedKind::Group)).await?;

    tracing::info!(group = name, outgoing, incoming, "deleted group with cascade");
    Ok(())
}

/// Rename a group, re-pointing every edge on both sides. `Ok(false)` if the
/// old name is missing or the new name is taken.
pub async fn rename(store: &dyn AccessStore, name: &str, new_name: &str) -> WardenResult<bool> {
    let Some(record) = get(store, name).await? else {
        return Ok(false);
    };
    if exists(store, new_name).await? {
        return Ok(false);
    }

    let renamed = GroupRecord {
        name: new_name.to_owned(),
        created_at: record.created_at,
    };
    store
        .set(new_name, Table::Groups, renamed.to_record())
        .await?;

    // Outgoing edges move wholesale.
    relationship::copy(store, name, PrincipalKind::Group, new_name, PrincipalKind::Group).await?;
    relationship::delete_all(store, &EdgeQuery::principal(name, PrincipalKind::Group)).await?;

    // Incoming edges (memberships and inheritors) are re-pointed one by one.
    let incoming =
        relationship::edges(store, &EdgeQuery::granted(name, GrantedKind::Group)).await?;
    for edge in incoming {
        relationship::create(store, &edge.principal, edge.principal_kind, new_name, GrantedKind::Group)
            .await?;
        relationship::delete(store, &edge.principal, edge.principal_kind, name, GrantedKind::Group)
            .await?;
    }

    store.delete(name, Table::Groups, &[]).await?;
    tracing::info!(from = name, to = new_name, "renamed group");
    Ok(true)
}

/// Create a new group carrying a copy of every outgoing edge of `name`.
/// `Ok(false)` if the source is missing or the new name is taken.
pub async fn duplicate(store: &dyn AccessStore, name: &str, new_name: &str) -> WardenResult<bool> {
    if exists(store, new_name).await? || !exists(store, name).await? {
        return Ok(false);
    }

    create(store, new_name, &GroupSpec::default()).await?;
    relationship::copy(store, name, PrincipalKind::Group, new_name, PrincipalKind::Group).await?;
    Ok(true)
}

/// Grant permissions to the group. `Ok(false)` if the group is missing.
pub async fn add_permissions(
    store: &dyn AccessStore,
    name: &str,
    permissions: &[String],
) -> WardenResult<bool> {
    if !exists(store, name).await? {
        return Ok(false);
    }
    for permission in permissions {
        relationship::create(store, name, PrincipalKind::Group, permission, GrantedKind::Permission)
            .await?;
    }
    Ok(true)
}

pub async fn remove_permissions(
    store: &dyn AccessStore,
    name: &str,
    permissions: &[String],
) -> WardenResult<bool> {
    if !exists(store, name).await? {
        return Ok(false);
    }
    for permission in permissions {
        relationship::delete(store, name, PrincipalKind::Group, permission, GrantedKind::Permission)
            .await?;
    }
    Ok(true)
}

/// Make the group inherit from each of `parents`.
pub async fn add_inherits(
    store: &dyn AccessStore,
    name: &str,
    parents: &[String],
) -> WardenResult<bool> {
    if !exists(store, name).await? {
        return Ok(false);
    }
    for parent in parents {
        relationship::create(store, name, PrincipalKind::Group, parent, GrantedKind::Group).await?;
    }
    Ok(true)
}

pub async fn remove_inherits(
    store: &dyn AccessStore,
    name: &str,
    parents: &[String],
) -> WardenResult<bool> {
    if !exists(store, name).await? {
        return Ok(false);
    }
    for parent in parents {
        relationship::delete(store, name, PrincipalKind::Group, parent, GrantedKind::Group).await?;
    }
    Ok(true)
}

/// Add users as members of the group.
pub async fn add_users(store: &dyn AccessStore, name: &str, users: &[String]) -> WardenResult<bool> {
    if !exists(store, name).await? {
        return Ok(false);
    }
    for user in users {
        relationship::create(store, user, PrincipalKind::User, name, GrantedKind::Group).await?;
    }
    Ok(true)
}

pub async fn remove_users(
    store: &dyn AccessStore,
    name: &str,
    users: &[String],
) -> WardenResult<bool> {
    if !exists(store, name).await? {
        return Ok(false);
    }
    for user in users {
        relationship::delete(store, user, PrincipalKind::User, name, GrantedKind::Group).await?;
    }
    Ok(true)
}

/// The group's full inheritance closure.
pub async fn inherits(store: &dyn AccessStore, name: &str) -> WardenResult<BTreeSet<String>> {
    resolver::inherited_groups(store, name).await
}

/// The group's effective permission set: its own grants plus the grants of
/// every group in its closure. Empty for a missing group.
pub async fn permissions(store: &dyn AccessStore, name: &str) -> WardenResult<BTreeSet<String>> {
    if !exists(store, name).await? {
        return Ok(BTreeSet::new());
    }

    let mut permissions: BTreeSet<String> = relationship::get_all(
        store,
        &EdgeQuery::principal(name, PrincipalKind::Group).granted_kind(GrantedKind::Permission),
    )
    .await?
    .into_iter()
    .collect();

    for parent in inherits(store, name).await? {
        let granted = relationship::get_all(
            store,
            &EdgeQuery::principal(&parent, PrincipalKind::Group)
                .granted_kind(GrantedKind::Permission),
        )
        .await?;
        permissions.extend(granted);
    }

    Ok(permissions)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::aggregator;
    use warden_store::MemoryStore;

    fn names(list: &[&str]) -> Vec<String> {
        list.iter().map(|s| s.to_string()).collect()
    }

    #[tokio::test]
    async fn create_rejects_duplicates() {
        let store = MemoryStore::new();
        assert!(create(&store, "ops", &GroupSpec::default()).await.unwrap());
        assert!(!create(&store, "ops", &GroupSpec::default()).await.unwrap());
    }

    #[tokio::test]
    async fn create_wires_initial_grants() {
        let store = MemoryStore::new();
        let spec = GroupSpec {
            permissions: names(&["deploy"]),
            inherits: names(&["entry"]),
            users: names(&["alice"]),
        };
        create(&store, "ops", &spec).await.unwrap();

        assert!(
            relationship::exists(&store, "ops", PrincipalKind::Group, "deploy", GrantedKind::Permission)
                .await
                .unwrap()
        );
        assert!(
            relationship::exists(&store, "ops", PrincipalKind::Group, "entry", GrantedKind::Group)
                .await
                .unwrap()
        );
        assert!(
            relationship::exists(&store, "alice", PrincipalKind::User, "ops", GrantedKind::Group)
                .await
                .unwrap()
        );
    }

    #[tokio::test]
    async fn delete_cascades_both_directions() {
        let store = MemoryStore::new();
        create(&store, "ops", &GroupSpec { permissions: names(&["deploy"]), ..Default::default() })
            .await
            .unwrap();
        create(&store, "child", &GroupSpec { inherits: names(&["ops"]), ..Default::default() })
            .await
            .unwrap();
        add_users(&store, "ops", &names(&["alice"])).await.unwrap();

        delete(&store, "ops").await.unwrap();

        assert!(!exists(&store, "ops").await.unwrap());
        assert!(
            !relationship::exists(&store, "ops", PrincipalKind::Group, "deploy", GrantedKind::Permission)
                .await
                .unwrap()
        );
        assert!(
            !relationship::exists(&store, "child", PrincipalKind::Group, "ops", GrantedKind::Group)
                .await
                .unwrap()
        );
        assert!(
            !relationship::exists(&store, "alice", PrincipalKind::User, "ops", GrantedKind::Group)
                .await
                .unwrap()
        );
    }

    #[tokio::test]
    async fn rename_repoints_both_sides() {
        let store = MemoryStore::new();
        create(&store, "ops", &GroupSpec { permissions: names(&["deploy"]), ..Default::default() })
            .await
            .unwrap();
        add_users(&store, "ops", &names(&["alice"])).await.unwrap();

        assert!(rename(&store, "ops", "platform").await.unwrap());

        assert!(!exists(&store, "ops").await.unwrap());
        assert!(exists(&store, "platform").await.unwrap());
        let permissions = aggregator::permissions_of(&store, "alice").await.unwrap();
        assert!(permissions.contains("deploy"));
        assert!(
            !relationship::exists(&store, "alice", PrincipalKind::User, "ops", GrantedKind::Group)
                .await
                .unwrap()
        );
    }

    #[tokio::test]
    async fn rename_refuses_conflicts() {
        let store = MemoryStore::new();
        create(&store, "a", &GroupSpec::default()).await.unwrap();
        create(&store, "b", &GroupSpec::default()).await.unwrap();

        assert!(!rename(&store, "a", "b").await.unwrap());
        assert!(!rename(&store, "missing", "c").await.unwrap());
    }

    #[tokio::test]
    async fn duplicate_copies_outgoing_edges() {
        let store = MemoryStore::new();
        create(
            &store,
            "ops",
            &GroupSpec {
                permissions: names(&["deploy"]),
                inherits: names(&["entry"]),
                ..Default::default()
            },
        )
        .await
        .unwrap();

        assert!(duplicate(&store, "ops", "ops-staging").await.unwrap());

        let copied =
            relationship::get_all(&store, &EdgeQuery::principal("ops-staging", PrincipalKind::Group))
                .await
                .unwrap();
        assert_eq!(copied.len(), 2);
        assert!(!duplicate(&store, "ops", "ops-staging").await.unwrap());
    }

    #[tokio::test]
    async fn grant_management_requires_existing_group() {
        let store = MemoryStore::new();
        assert!(!add_permissions(&store, "ghost", &names(&["x"])).await.unwrap());
        assert!(!add_inherits(&store, "ghost", &names(&["x"])).await.unwrap());
        assert!(!add_users(&store, "ghost", &names(&["x"])).await.unwrap());
    }

    #[tokio::test]
    async fn effective_permissions_follow_inheritance() {
        let store = MemoryStore::new();
        create(&store, "entry", &GroupSpec { permissions: names(&["open"]), ..Default::default() })
            .await
            .unwrap();
        create(
            &store,
            "mid",
            &GroupSpec {
                permissions: names(&["sensitive"]),
                inherits: names(&["entry"]),
                ..Default::default()
            },
        )
        .await
        .unwrap();

        let effective = permissions(&store, "mid").await.unwrap();
        assert_eq!(
            effective,
            ["open", "sensitive"].iter().map(|s| s.to_string()).collect()
        );
        assert!(permissions(&store, "ghost").await.unwrap().is_empty());
    }
}
