//! Authorization engine: policy lookup + composable per-endpoint gates.
//!
//! Two independent authorization paths exist in the clinic surface:
//! permission checks driven by the [`AccessPolicy`] table, and coarser role
//! allow-lists on a subset of accounting endpoints. Both are modeled as
//! interchangeable [`Gate`] strategies; where an endpoint carries several
//! gates, each must pass.

use thiserror::Error;

use crate::{AccessPolicy, Credential, Permission, Role};

#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum AuthzError {
    #[error("forbidden: missing permission '{0}'")]
    MissingPermission(String),

    #[error("forbidden: role is not on the allow-list for this action")]
    RoleNotAllowed,

    #[error("forbidden: action requires a universal-grant role")]
    NotSuperAdmin,
}

/// Authorize a credential against a named route.
///
/// - No IO
/// - No panics
/// - No business logic (pure policy check)
///
/// Routes without a policy entry are allowed by design (unregistered routes
/// are not gated).
pub fn authorize(
    credential: &Credential,
    route: &str,
    policy: &AccessPolicy,
) -> Result<(), AuthzError> {
    match policy.required_permission(route) {
        None => Ok(()),
        Some(required) => Gate::RequirePermission(required.clone()).evaluate(credential),
    }
}

/// One authorization strategy, evaluated against a decoded credential.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Gate {
    /// Credential must hold the permission (or the wildcard).
    RequirePermission(Permission),

    /// Credential's role must be on the allow-list. Universal-grant
    /// credentials pass regardless.
    RoleAllowList(Vec<Role>),

    /// Credential must have been issued to a universal-grant role.
    RequireUniversal,
}

impl Gate {
    pub fn evaluate(&self, credential: &Credential) -> Result<(), AuthzError> {
        match self {
            Gate::RequirePermission(required) => {
                if credential.has_permission(required) {
                    Ok(())
                } else {
                    Err(AuthzError::MissingPermission(required.as_str().to_string()))
                }
            }
            Gate::RoleAllowList(allowed) => {
                if credential.is_universal() || allowed.contains(&credential.role) {
                    Ok(())
                } else {
                    Err(AuthzError::RoleNotAllowed)
                }
            }
            Gate::RequireUniversal => {
                if credential.is_universal() {
                    Ok(())
                } else {
                    Err(AuthzError::NotSuperAdmin)
                }
            }
        }
    }
}

/// Evaluate a gate sequence; every gate must pass.
pub fn evaluate_all(gates: &[Gate], credential: &Credential) -> Result<(), AuthzError> {
    for gate in gates {
        gate.evaluate(credential)?;
    }
    Ok(())
}
