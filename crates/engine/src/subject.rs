//! Handle-based convenience API for one principal.
//!
//! Session layers keep a [`Subject`] on their user object instead of
//! threading a store and user id through every call site.

use crate::relationship;
use crate::{aggregator, decision};
use std::collections::BTreeSet;
use std::sync::Arc;
use warden_core::error::WardenResult;
use warden_core::{GrantedKind, PrincipalKind};
use warden_store::AccessStore;

/// A principal id bound to a store.
#[derive(Clone)]
pub struct Subject {
    store: Arc<dyn AccessStore>,
    id: String,
}

impl Subject {
    pub fn new(store: Arc<dyn AccessStore>, id: impl Into<String>) -> Self {
        Self {
            store,
            id: id.into(),
        }
    }

    pub fn id(&self) -> &str {
        &self.id
    }

    pub async fn add_group(&self, name: &str) -> WardenResult<()> {
        relationship::create(&*self.store, &self.id, PrincipalKind::User, name, GrantedKind::Group)
            .await
    }

    pub async fn remove_group(&self, name: &str) -> WardenResult<bool> {
        relationship::delete(&*self.store, &self.id, PrincipalKind::User, name, GrantedKind::Group)
            .await
    }

    /// Grant a permission directly to this principal.
    pub async fn grant(&self, permission: &str) -> WardenResult<()> {
        relationship::create(
            &*self.store,
            &self.id,
            PrincipalKind::User,
            permission,
            GrantedKind::Permission,
        )
        .await
    }

    pub async fn revoke(&self, permission: &str) -> WardenResult<bool> {
        relationship::delete(
            &*self.store,
            &self.id,
            PrincipalKind::User,
            permission,
            GrantedKind::Permission,
        )
        .await
    }

    /// Direct memberships plus the full inheritance closure.
    pub async fn groups(&self) -> WardenResult<BTreeSet<String>> {
        aggregator::groups_of(&*self.store, &self.id).await
    }

    /// The effective permission set, wildcard included verbatim.
    pub async fn permissions(&self) -> WardenResult<BTreeSet<String>> {
        aggregator::permissions_of(&*self.store, &self.id).await
    }

    /// Decide and audit, like [`decision::has_access`].
    pub async fn has_access(&self, permission: &str) -> WardenResult<bool> {
        decision::has_access(&*self.store, &self.id, permission).await
    }
}
