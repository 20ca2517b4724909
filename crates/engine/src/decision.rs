//! The yes/no access decision, with a durable audit trail.

use crate::aggregator;
use chrono::Utc;
use warden_core::error::{WardenError, WardenResult};
use warden_core::{AccessEvent, Table, WILDCARD};
use warden_store::AccessStore;

/// Does `user_id` hold `permission`, directly or through group inheritance?
///
/// Empty arguments are an [`WardenError::InvalidArgument`], never a denial:
/// a missing principal id is an integration bug, and masking it as "denied"
/// would hide it. Every call appends exactly one [`AccessEvent`] regardless
/// of outcome; if that append fails the decision is still returned and the
/// failure is logged at `warn` (the decision matters more than the log).
pub async fn has_access(
    store: &dyn AccessStore,
    user_id: &str,
    permission: &str,
) -> WardenResult<bool> {
    if user_id.is_empty() {
        return Err(WardenError::InvalidArgument(
            "has_access requires a user id".into(),
        ));
    }
    if permission.is_empty() {
        return Err(WardenError::InvalidArgument(
            "has_access requires a permission name".into(),
        ));
    }

    let permissions = aggregator::permissions_of(store, user_id).await?;
    let allowed = permissions.contains(permission) || permissions.contains(WILDCARD);

    let event = AccessEvent {
        user_id: user_id.to_owned(),
        permission: permission.to_owned(),
        ts: Utc::now(),
        allowed,
    };
    if let Err(e) = store.insert(Table::AccessEvents, event.to_record()).await {
        tracing::warn!(user_id, permission, error = %e, "failed to append access event");
    }

    tracing::debug!(user_id, permission, allowed, "access decision");
    Ok(allowed)
}
