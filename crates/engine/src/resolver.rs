//! Transitive closure over `group -> group` inheritance edges.
//!
//! Breadth-first with an explicit work queue and visited-set: each group is
//! expanded at most once no matter how many paths lead to it, so inheritance
//! cycles and self-inheritance terminate structurally instead of erroring.
//!
//! Self-inclusion policy: the starting principal is excluded from its own
//! closure unless a cycle leads back to it. Seed groups (a user's direct
//! memberships) are part of the result.

use crate::relationship::{self, EdgeQuery};
use std::collections::{BTreeSet, HashSet, VecDeque};
use warden_core::error::WardenResult;
use warden_core::{GrantedKind, PrincipalKind};
use warden_store::AccessStore;

/// Every group reachable from `seeds` by following inheritance edges,
/// including the seeds themselves. Unordered; each group appears once.
pub async fn reachable_from(
    store: &dyn AccessStore,
    seeds: &[String],
) -> WardenResult<BTreeSet<String>> {
    let mut visited: HashSet<String> = HashSet::new();
    let mut reachable = BTreeSet::new();
    let mut queue: VecDeque<String> = seeds.iter().cloned().collect();

    while let Some(group) = queue.pop_front() {
        if !visited.insert(group.clone()) {
            continue;
        }
        let inherits = relationship::get_all(
            store,
            &EdgeQuery::principal(&group, PrincipalKind::Group).granted_kind(GrantedKind::Group),
        )
        .await?;
        queue.extend(inherits);
        reachable.insert(group);
    }

    Ok(reachable)
}

/// The closure over a single group's direct `inherits` edges. The group
/// itself is not in the result unless a cycle returns to it.
pub async fn inherited_groups(
    store: &dyn AccessStore,
    name: &str,
) -> WardenResult<BTreeSet<String>> {
    let direct = relationship::get_all(
        store,
        &EdgeQuery::principal(name, PrincipalKind::Group).granted_kind(GrantedKind::Group),
    )
    .await?;
    reachable_from(store, &direct).await
}
