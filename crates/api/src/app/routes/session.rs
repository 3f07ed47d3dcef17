//! Session endpoints: credential issuance (login) and introspection (whoami).

use std::sync::Arc;

use axum::{Json, extract::Extension, http::StatusCode, response::IntoResponse};
use chrono::{Duration, Utc};
use serde_json::json;

use clinicore_auth::Credential;

use crate::app::dto::{LoginRequest, LoginResponse};
use crate::app::errors;
use crate::app::services::AppServices;
use crate::context::CredentialContext;

/// Session credential lifetime. Permissions are baked in at issuance; a role
/// or permission edit only takes effect when the client logs in again
/// (accepted staleness window).
const SESSION_TTL_HOURS: i64 = 8;

/// POST /auth/login — verify the account and issue a signed credential with
/// the role's permissions flattened in.
pub async fn login(
    Extension(services): Extension<Arc<AppServices>>,
    Json(req): Json<LoginRequest>,
) -> axum::response::Response {
    let Some(user) = services.users.find_by_email(&req.email) else {
        return errors::json_error(StatusCode::UNAUTHORIZED, "invalid_credentials", "invalid email or password");
    };
    if user.password != req.password {
        return errors::json_error(StatusCode::UNAUTHORIZED, "invalid_credentials", "invalid email or password");
    }

    let now = Utc::now();
    let credential = Credential {
        user_id: user.user_id,
        full_name: user.full_name.clone(),
        email: user.email.clone(),
        role: user.role.name.clone(),
        permissions: user.role.flatten_permissions(),
        issued_at: now,
        expires_at: now + Duration::hours(SESSION_TTL_HOURS),
    };

    match services.codec.encode(&credential) {
        Ok(token) => {
            tracing::info!(user = %credential.email, role = %credential.role, "credential issued");
            (StatusCode::OK, Json(LoginResponse { token })).into_response()
        }
        Err(e) => errors::json_error(
            StatusCode::INTERNAL_SERVER_ERROR,
            "token_encode_failed",
            e.to_string(),
        ),
    }
}

/// GET /whoami — echo the decoded credential.
///
/// Deliberately absent from the Access Policy Table: any authenticated
/// credential may call it (default-allow for unregistered routes).
pub async fn whoami(Extension(ctx): Extension<CredentialContext>) -> impl IntoResponse {
    let cred = ctx.credential();
    Json(json!({
        "user_id": cred.user_id,
        "full_name": cred.full_name,
        "email": cred.email,
        "role": cred.role,
        "permissions": cred.permissions,
        "expires_at": cred.expires_at,
    }))
}
