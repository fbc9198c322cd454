//! The access check.

use tracing::warn;

use crate::policy::{CollectionPolicy, FieldGroup, PolicyCategory};
use crate::role::{RoleCode, RoleSet};

/// An actor's role is not in the set an action requires.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("{actor} has role {role} but role {required} is required to {action}")]
pub struct PermissionDenied {
    pub actor: String,
    pub role: RoleCode,
    pub required: RoleSet,
    pub action: String,
}

impl PermissionDenied {
    pub fn new(
        actor: impl Into<String>,
        role: RoleCode,
        required: RoleSet,
        action: impl Into<String>,
    ) -> Self {
        Self {
            actor: actor.into(),
            role,
            required,
            action: action.into(),
        }
    }
}

/// Authorized iff `role` is in `required`.
pub fn authorize(
    actor: &str,
    role: RoleCode,
    required: RoleSet,
    action: impl Into<String>,
) -> Result<(), PermissionDenied> {
    if required.contains(role) {
        return Ok(());
    }
    Err(deny(actor, role, required, action))
}

/// Build a denial and log it.
pub(crate) fn deny(
    actor: &str,
    role: RoleCode,
    required: RoleSet,
    action: impl Into<String>,
) -> PermissionDenied {
    let denied = PermissionDenied::new(actor, role, required, action);
    warn!(
        actor = %denied.actor,
        role = %denied.role,
        required = %denied.required,
        action = %denied.action,
        "Permission denied"
    );
    denied
}

/// Check a role against one category of a collection policy.
pub fn authorize_category(
    actor: &str,
    role: RoleCode,
    policy: &CollectionPolicy,
    category: PolicyCategory,
) -> Result<(), PermissionDenied> {
    authorize(actor, role, policy.allowed(category), category.action())
}

/// Check a role against the category gating a specimen field group.
pub fn authorize_group(
    actor: &str,
    role: RoleCode,
    policy: &CollectionPolicy,
    group: FieldGroup,
) -> Result<(), PermissionDenied> {
    authorize(
        actor,
        role,
        policy.allowed(group.policy_category()),
        group.action(),
    )
}
