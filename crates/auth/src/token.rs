//! Signed session token codec (HS256).
//!
//! Encoding happens once, at login, with the user's role flattened into a
//! permission list. Decoding verifies signature and expiry against the
//! server-held secret; nothing is re-read from the store per request, so a
//! role or permission edit only takes effect when the token is reissued.

use chrono::{DateTime, TimeZone, Utc};
use jsonwebtoken::{Algorithm, DecodingKey, EncodingKey, Header, Validation, errors::ErrorKind};
use serde::{Deserialize, Serialize};
use thiserror::Error;

use clinicore_core::UserId;

use crate::claims::{TokenValidationError, validate_claims};
use crate::{Credential, Permission, Role};

#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum TokenError {
    #[error("token signature is invalid or token is malformed")]
    InvalidSignature,

    #[error("token has expired")]
    Expired,

    #[error("token not yet valid (issued_at is in the future)")]
    NotYetValid,

    #[error("invalid token time window (expires_at <= issued_at)")]
    InvalidTimeWindow,

    #[error("failed to encode token")]
    Encode,
}

impl From<TokenValidationError> for TokenError {
    fn from(err: TokenValidationError) -> Self {
        match err {
            TokenValidationError::Expired => TokenError::Expired,
            TokenValidationError::NotYetValid => TokenError::NotYetValid,
            TokenValidationError::InvalidTimeWindow => TokenError::InvalidTimeWindow,
        }
    }
}

/// Wire shape of the signed claims (RFC 7519 field names for timestamps).
#[derive(Debug, Serialize, Deserialize)]
struct WireClaims {
    sub: UserId,
    name: String,
    email: String,
    role: Role,
    permissions: Vec<Permission>,
    iat: i64,
    exp: i64,
}

/// HS256 codec over a server-held secret.
pub struct Hs256TokenCodec {
    encoding: EncodingKey,
    decoding: DecodingKey,
    validation: Validation,
}

impl Hs256TokenCodec {
    pub fn new(secret: &[u8]) -> Self {
        let mut validation = Validation::new(Algorithm::HS256);
        // Expiry is a hard boundary for session credentials.
        validation.leeway = 0;
        Self {
            encoding: EncodingKey::from_secret(secret),
            decoding: DecodingKey::from_secret(secret),
            validation,
        }
    }

    /// Sign a credential into its compact wire form.
    pub fn encode(&self, credential: &Credential) -> Result<String, TokenError> {
        let claims = WireClaims {
            sub: credential.user_id,
            name: credential.full_name.clone(),
            email: credential.email.clone(),
            role: credential.role.clone(),
            permissions: credential.permissions.clone(),
            iat: credential.issued_at.timestamp(),
            exp: credential.expires_at.timestamp(),
        };

        jsonwebtoken::encode(&Header::new(Algorithm::HS256), &claims, &self.encoding)
            .map_err(|_| TokenError::Encode)
    }

    /// Verify signature + expiry and return the embedded credential.
    ///
    /// Signature and `exp` are checked by the JWT layer; the extracted claims
    /// then go through [`validate_claims`], which also rejects not-yet-valid
    /// and inverted time windows.
    ///
    /// No side effects; safe to call from any number of request handlers.
    pub fn decode(&self, raw: &str) -> Result<Credential, TokenError> {
        let data = jsonwebtoken::decode::<WireClaims>(raw, &self.decoding, &self.validation)
            .map_err(|e| match e.kind() {
                ErrorKind::ExpiredSignature => TokenError::Expired,
                _ => TokenError::InvalidSignature,
            })?;

        let claims = data.claims;
        let credential = Credential {
            user_id: claims.sub,
            full_name: claims.name,
            email: claims.email,
            role: claims.role,
            permissions: claims.permissions,
            issued_at: timestamp(claims.iat)?,
            expires_at: timestamp(claims.exp)?,
        };

        validate_claims(&credential, Utc::now())?;
        Ok(credential)
    }
}

fn timestamp(secs: i64) -> Result<DateTime<Utc>, TokenError> {
    // A numeric claim chrono cannot represent is malformed, not a default.
    Utc.timestamp_opt(secs, 0)
        .single()
        .ok_or(TokenError::InvalidSignature)
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Duration;

    fn codec() -> Hs256TokenCodec {
        Hs256TokenCodec::new(b"test-secret")
    }

    fn credential(expires_in: Duration) -> Credential {
        let now = Utc::now();
        Credential {
            user_id: UserId::new(),
            full_name: "Amira Hassan".to_string(),
            email: "amira@clinic.example".to_string(),
            role: Role::new("lab_technician"),
            permissions: vec![Permission::new("manage_lab"), Permission::new("view_patients")],
            issued_at: now,
            expires_at: now + expires_in,
        }
    }

    #[test]
    fn roundtrip_preserves_identity_role_and_permissions() {
        let codec = codec();
        let cred = credential(Duration::minutes(10));

        let raw = codec.encode(&cred).unwrap();
        let decoded = codec.decode(&raw).unwrap();

        assert_eq!(decoded.user_id, cred.user_id);
        assert_eq!(decoded.full_name, cred.full_name);
        assert_eq!(decoded.email, cred.email);
        assert_eq!(decoded.role, cred.role);
        assert_eq!(decoded.permissions, cred.permissions);
    }

    #[test]
    fn expired_token_fails_with_expired() {
        let codec = codec();
        let mut cred = credential(Duration::minutes(10));
        cred.issued_at = Utc::now() - Duration::hours(2);
        cred.expires_at = Utc::now() - Duration::hours(1);

        let raw = codec.encode(&cred).unwrap();
        assert_eq!(codec.decode(&raw), Err(TokenError::Expired));
    }

    #[test]
    fn wrong_secret_fails_with_invalid_signature() {
        let cred = credential(Duration::minutes(10));
        let raw = codec().encode(&cred).unwrap();

        let other = Hs256TokenCodec::new(b"other-secret");
        assert_eq!(other.decode(&raw), Err(TokenError::InvalidSignature));
    }

    #[test]
    fn garbage_fails_with_invalid_signature() {
        assert_eq!(
            codec().decode("not-a-token"),
            Err(TokenError::InvalidSignature)
        );
    }

    #[test]
    fn not_yet_valid_token_is_rejected() {
        let codec = codec();
        let mut cred = credential(Duration::minutes(10));
        cred.issued_at = Utc::now() + Duration::hours(1);
        cred.expires_at = Utc::now() + Duration::hours(2);

        let raw = codec.encode(&cred).unwrap();
        assert_eq!(codec.decode(&raw), Err(TokenError::NotYetValid));
    }

    #[test]
    fn inverted_time_window_is_rejected() {
        let codec = codec();
        let mut cred = credential(Duration::minutes(10));
        // exp is still in the future (so the JWT expiry check passes) but
        // before iat, which only the claims validation catches.
        cred.issued_at = Utc::now() + Duration::hours(2);
        cred.expires_at = Utc::now() + Duration::hours(1);

        let raw = codec.encode(&cred).unwrap();
        assert_eq!(codec.decode(&raw), Err(TokenError::InvalidTimeWindow));
    }

    #[test]
    fn unrepresentable_timestamp_claims_are_rejected() {
        let codec = codec();
        let now = Utc::now();
        let claims = WireClaims {
            sub: UserId::new(),
            name: "Amira Hassan".to_string(),
            email: "amira@clinic.example".to_string(),
            role: Role::new("lab_technician"),
            permissions: vec![Permission::new("manage_lab")],
            iat: now.timestamp(),
            exp: i64::MAX,
        };

        let raw =
            jsonwebtoken::encode(&Header::new(Algorithm::HS256), &claims, &codec.encoding)
                .unwrap();
        assert_eq!(codec.decode(&raw), Err(TokenError::InvalidSignature));
    }
}
