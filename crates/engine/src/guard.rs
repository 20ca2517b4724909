//! Decision helper for presentation layers.
//!
//! The engine only supplies the boolean decision; what a denied user sees is
//! the caller's policy, expressed as a [`Fallback`]. An unnamed permission
//! means the component is uncontrolled and shown to everyone.

use crate::decision;
use warden_core::error::WardenResult;
use warden_store::AccessStore;

/// What to hand back when access is denied.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Fallback<T> {
    /// Render nothing.
    Hidden,
    /// Render a generic "access denied" marker.
    Denied,
    /// Send the user to a path of the caller's choosing.
    Redirect(String),
    /// Render a caller-supplied substitute.
    Custom(T),
}

/// The outcome handed to the renderer.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Gated<T> {
    Shown(T),
    Hidden,
    Denied,
    Redirect(String),
    Custom(T),
}

impl<T> Gated<T> {
    /// The component to render, if any.
    pub fn component(self) -> Option<T> {
        match self {
            Gated::Shown(c) | Gated::Custom(c) => Some(c),
            _ => None,
        }
    }
}

/// Gate `component` behind `permission` for `user_id`.
///
/// An empty permission name is not access-controlled: the component is shown
/// to every caller without a decision or an audit record.
pub async fn controlled<T>(
    store: &dyn AccessStore,
    user_id: &str,
    permission: &str,
    component: T,
    fallback: Fallback<T>,
) -> WardenResult<Gated<T>> {
    if permission.is_empty() {
        return Ok(Gated::Shown(component));
    }

    if decision::has_access(store, user_id, permission).await? {
        return Ok(Gated::Shown(component));
    }

    Ok(match fallback {
        Fallback::Hidden => Gated::Hidden,
        Fallback::Denied => Gated::Denied,
        Fallback::Redirect(path) => Gated::Redirect(path),
        Fallback::Custom(substitute) => Gated::Custom(substitute),
    })
}
