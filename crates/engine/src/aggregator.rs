//! Effective group and permission sets for a principal.
//!
//! Read-only consumer of the ledger: unions direct grants with everything
//! inherited through the group closure. The wildcard `"*"` is returned
//! verbatim; interpreting it is the decision layer's job.

use crate::relationship::{self, EdgeQuery};
use crate::resolver;
use std::collections::BTreeSet;
use warden_core::error::WardenResult;
use warden_core::{GrantedKind, PrincipalKind};
use warden_store::AccessStore;

/// Direct group memberships unioned with the inheritance closure over them.
pub async fn groups_of(
    store: &dyn AccessStore,
    principal_id: &str,
) -> WardenResult<BTreeSet<String>> {
    let direct = relationship::get_all(
        store,
        &EdgeQuery::principal(principal_id, PrincipalKind::User).granted_kind(GrantedKind::Group),
    )
    .await?;
    resolver::reachable_from(store, &direct).await
}

/// Direct permission grants unioned with the permission grants of every
/// group in [`groups_of`]. Unknown principals resolve to the empty set.
pub async fn permissions_of(
    store: &dyn AccessStore,
    principal_id: &str,
) -> WardenResult<BTreeSet<String>> {
    let mut permissions: BTreeSet<String> = relationship::get_all(
        store,
        &EdgeQuery::principal(principal_id, PrincipalKind::User)
            .granted_kind(GrantedKind::Permission),
    )
    .await?
    .into_iter()
    .collect();

    for group in groups_of(store, principal_id).await? {
        let granted = relationship::get_all(
            store,
            &EdgeQuery::principal(&group, PrincipalKind::Group)
                .granted_kind(GrantedKind::Permission),
        )
        .await?;
        permissions.extend(granted);
    }

    Ok(permissions)
}
