use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use thiserror::Error;

use clinicore_core::UserId;

use crate::{Permission, Role};

/// Decoded, verified session credential (transport-agnostic).
///
/// This is the minimal set of claims the back end expects once a token has
/// been decoded and signature-verified. Immutable once issued; the permission
/// set is flattened from the user's role at login and never refreshed.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Credential {
    /// Subject / user identifier.
    pub user_id: UserId,

    /// Display name.
    pub full_name: String,

    /// Contact email (also the login identifier).
    pub email: String,

    /// Role granted to the user.
    pub role: Role,

    /// Flattened permission set (unique names, order irrelevant).
    pub permissions: Vec<Permission>,

    /// Issued-at timestamp.
    pub issued_at: DateTime<Utc>,

    /// Expiration timestamp.
    pub expires_at: DateTime<Utc>,
}

impl Credential {
    /// Whether the credential carries `permission`, either explicitly or via
    /// the wildcard baked in for universal-grant roles.
    pub fn has_permission(&self, permission: &Permission) -> bool {
        self.permissions
            .iter()
            .any(|p| p.is_wildcard() || p == permission)
    }

    /// Whether the credential was issued to a universal-grant role.
    pub fn is_universal(&self) -> bool {
        self.permissions.iter().any(Permission::is_wildcard)
    }
}

#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum TokenValidationError {
    #[error("token has expired")]
    Expired,

    #[error("token not yet valid (issued_at is in the future)")]
    NotYetValid,

    #[error("invalid token time window (expires_at <= issued_at)")]
    InvalidTimeWindow,
}

/// Deterministically validate credential time claims.
///
/// Note: this validates the *claims* only. Signature verification / decoding
/// lives in [`crate::token`].
pub fn validate_claims(
    claims: &Credential,
    now: DateTime<Utc>,
) -> Result<(), TokenValidationError> {
    if claims.expires_at <= claims.issued_at {
        return Err(TokenValidationError::InvalidTimeWindow);
    }
    if now < claims.issued_at {
        return Err(TokenValidationError::NotYetValid);
    }
    if now >= claims.expires_at {
        return Err(TokenValidationError::Expired);
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Duration;

    fn credential(issued_at: DateTime<Utc>, expires_at: DateTime<Utc>) -> Credential {
        Credential {
            user_id: UserId::new(),
            full_name: "Test User".to_string(),
            email: "test@clinic.example".to_string(),
            role: Role::new("lab_technician"),
            permissions: vec![Permission::new("manage_lab")],
            issued_at,
            expires_at,
        }
    }

    #[test]
    fn valid_window_passes() {
        let now = Utc::now();
        let cred = credential(now - Duration::minutes(5), now + Duration::minutes(5));
        assert_eq!(validate_claims(&cred, now), Ok(()));
    }

    #[test]
    fn expired_credential_is_rejected() {
        let now = Utc::now();
        let cred = credential(now - Duration::minutes(10), now - Duration::minutes(1));
        assert_eq!(validate_claims(&cred, now), Err(TokenValidationError::Expired));
    }

    #[test]
    fn future_issued_at_is_rejected() {
        let now = Utc::now();
        let cred = credential(now + Duration::minutes(1), now + Duration::minutes(10));
        assert_eq!(validate_claims(&cred, now), Err(TokenValidationError::NotYetValid));
    }

    #[test]
    fn inverted_window_is_rejected() {
        let now = Utc::now();
        let cred = credential(now, now - Duration::minutes(1));
        assert_eq!(
            validate_claims(&cred, now),
            Err(TokenValidationError::InvalidTimeWindow)
        );
    }

    #[test]
    fn wildcard_permission_grants_everything() {
        let now = Utc::now();
        let mut cred = credential(now, now + Duration::minutes(5));
        cred.permissions = vec![Permission::wildcard()];
        assert!(cred.is_universal());
        assert!(cred.has_permission(&Permission::new("anything_at_all")));
    }
}
