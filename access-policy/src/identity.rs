//! Identity registry records and role resolution.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use crate::check::{authorize, deny, PermissionDenied};
use crate::role::{RoleCode, RoleSet};

/// A registered user and the role held in each collection.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct User {
    pub username: String,
    /// Collection name to role
    pub membership: BTreeMap<String, RoleCode>,
}

impl User {
    /// A freshly registered user with no memberships.
    pub fn new(username: impl Into<String>) -> Self {
        Self {
            username: username.into(),
            membership: BTreeMap::new(),
        }
    }

    /// Builder: set a membership.
    pub fn with_role(mut self, collection: impl Into<String>, role: RoleCode) -> Self {
        self.membership.insert(collection.into(), role);
        self
    }

    /// Role in a collection; `P` when not a member.
    pub fn role_in(&self, collection: &str) -> RoleCode {
        self.membership
            .get(collection)
            .copied()
            .unwrap_or(RoleCode::Public)
    }

    pub fn set_role(&mut self, collection: impl Into<String>, role: RoleCode) {
        self.membership.insert(collection.into(), role);
    }
}

/// Resolve the role an actor holds in a collection.
///
/// Unregistered actors and non-members both resolve to `P`. Never fails.
pub fn resolve_role(user: Option<&User>, collection: &str) -> RoleCode {
    user.map(|u| u.role_in(collection))
        .unwrap_or(RoleCode::Public)
}

/// Check whether a granter may set a grantee's role.
///
/// Managers may grant anything. Curators may grant any role except `M`,
/// and may not change the role of an existing Manager.
pub fn check_grant(
    granter: &str,
    granter_role: RoleCode,
    grantee: &str,
    grantee_role: RoleCode,
    new_role: RoleCode,
    collection: &str,
) -> Result<(), PermissionDenied> {
    let grantors = RoleSet::empty()
        .with(RoleCode::Manager)
        .with(RoleCode::Curator);

    authorize(
        granter,
        granter_role,
        grantors,
        format!("grant permissions in collection {collection}"),
    )?;

    if granter_role == RoleCode::Curator {
        let managers = RoleSet::empty().with(RoleCode::Manager);
        if new_role == RoleCode::Manager {
            return Err(deny(
                granter,
                granter_role,
                managers,
                format!("grant permission of Manager to {grantee}"),
            ));
        }
        if grantee_role == RoleCode::Manager {
            return Err(deny(
                granter,
                granter_role,
                managers,
                format!("change permission of Manager {grantee}"),
            ));
        }
    }

    Ok(())
}
