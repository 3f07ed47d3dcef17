use std::borrow::Cow;

use serde::{Deserialize, Serialize};

use crate::Permission;

/// Role identifier used for RBAC.
///
/// Roles are intentionally opaque strings at this layer; mapping roles to
/// permissions is done through [`RoleDefinition`] at credential issuance time.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Role(Cow<'static, str>);

impl Role {
    pub fn new(name: impl Into<Cow<'static, str>>) -> Self {
        Self(name.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl core::fmt::Display for Role {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.write_str(&self.0)
    }
}

/// A role and the permissions it grants.
///
/// `universal_grant` is an explicit capability flag: such a role holds every
/// permission regardless of the stored set. The engine never string-matches a
/// magic role name; instead issuance flattens a universal-grant role into the
/// wildcard permission.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RoleDefinition {
    pub name: Role,
    pub universal_grant: bool,
    pub permissions: Vec<Permission>,
}

impl RoleDefinition {
    pub fn new(name: Role, permissions: Vec<Permission>) -> Self {
        Self {
            name,
            universal_grant: false,
            permissions,
        }
    }

    pub fn universal(name: Role) -> Self {
        Self {
            name,
            universal_grant: true,
            permissions: Vec::new(),
        }
    }

    /// Flatten this role into the permission set baked into a credential.
    ///
    /// Called exactly once, at login. Permissions are never re-derived from
    /// the store on subsequent requests, so a role edit only takes effect when
    /// the credential is reissued (accepted staleness window).
    pub fn flatten_permissions(&self) -> Vec<Permission> {
        if self.universal_grant {
            return vec![Permission::wildcard()];
        }
        self.permissions.clone()
    }
}
