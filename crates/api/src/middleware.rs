//! Authentication + authorization middleware.
//!
//! Two layers, matching the request data flow: the codec decodes the bearer
//! credential (401 on failure), then the policy gate checks the concrete
//! request path against the Access Policy Table (403 on deny; unregistered
//! paths pass by design).

use std::sync::Arc;

use axum::{
    extract::State,
    http::{HeaderMap, StatusCode},
    middleware::Next,
    response::{IntoResponse, Response},
};

use clinicore_auth::{AccessPolicy, Hs256TokenCodec, TokenError, authorize};

use crate::app::errors;
use crate::context::CredentialContext;

#[derive(Clone)]
pub struct AuthState {
    pub codec: Arc<Hs256TokenCodec>,
    pub policy: Arc<AccessPolicy>,
}

/// Decode and verify the bearer credential; insert it as a request extension.
pub async fn authn_middleware(
    State(state): State<AuthState>,
    mut req: axum::http::Request<axum::body::Body>,
    next: Next,
) -> Result<Response, StatusCode> {
    let token = extract_bearer(req.headers())?;

    let credential = state.codec.decode(token).map_err(|e| match e {
        TokenError::Expired
        | TokenError::NotYetValid
        | TokenError::InvalidTimeWindow
        | TokenError::InvalidSignature
        | TokenError::Encode => StatusCode::UNAUTHORIZED,
    })?;

    req.extensions_mut()
        .insert(CredentialContext::new(credential));

    Ok(next.run(req).await)
}

/// Gate the request path through the Access Policy Table.
pub async fn policy_middleware(
    State(state): State<AuthState>,
    req: axum::http::Request<axum::body::Body>,
    next: Next,
) -> Response {
    let Some(ctx) = req.extensions().get::<CredentialContext>() else {
        // Authn layer must run first; absence is a wiring bug, not a client error.
        return StatusCode::UNAUTHORIZED.into_response();
    };

    let path = req.uri().path().to_string();
    if let Err(e) = authorize(ctx.credential(), &path, &state.policy) {
        tracing::info!(route = %path, error = %e, "request denied by access policy");
        return errors::authz_error_to_response(e);
    }

    next.run(req).await
}

fn extract_bearer(headers: &HeaderMap) -> Result<&str, StatusCode> {
    let header = headers
        .get(axum::http::header::AUTHORIZATION)
        .ok_or(StatusCode::UNAUTHORIZED)?;

    let header = header.to_str().map_err(|_| StatusCode::UNAUTHORIZED)?;

    let header = header
        .strip_prefix("Bearer ")
        .ok_or(StatusCode::UNAUTHORIZED)?;

    let token = header.trim();
    if token.is_empty() {
        return Err(StatusCode::UNAUTHORIZED);
    }

    Ok(token)
}
