//! HTTP API application wiring (Axum router + service wiring).
//!
//! Layout:
//! - `services.rs`: infrastructure wiring (stores, directories, token codec)
//! - `routes/`: HTTP routes + handlers (one file per domain area)
//! - `dto.rs`: request/response DTOs and JSON mapping helpers
//! - `errors.rs`: consistent error responses

use std::sync::Arc;

use axum::{Extension, Router, routing::{get, post}};

use clinicore_auth::{AccessPolicy, Permission, PolicyEntry};

use crate::middleware;

pub mod dto;
pub mod errors;
pub mod routes;
pub mod services;

/// The static Access Policy Table, loaded once at startup.
///
/// Routes absent from this table are NOT gated (default-allow); `/whoami`
/// relies on that and the black-box tests assert it.
pub fn access_policy() -> AccessPolicy {
    AccessPolicy::new(vec![
        PolicyEntry::new(
            "/clinic/[branchId]/lab/orders",
            Permission::new("manage_lab"),
        ),
        PolicyEntry::new(
            "/clinic/[branchId]/lab/orders/[orderId]/results",
            Permission::new("manage_lab"),
        ),
        PolicyEntry::new(
            "/clinic/[branchId]/lab/orders/[orderId]/images",
            Permission::new("manage_lab"),
        ),
        PolicyEntry::new(
            "/clinic/[branchId]/lab/orders/[orderId]/validate",
            Permission::new("validate_lab_orders"),
        ),
        PolicyEntry::new(
            "/clinic/[branchId]/lab/validation-queue",
            Permission::new("validate_lab_orders"),
        ),
        PolicyEntry::new("/accounting/reports", Permission::new("view_financial_reports")),
        PolicyEntry::new("/admin/roles", Permission::new("manage_roles")),
    ])
}

/// Build the full HTTP router (public entrypoint used by `main.rs`).
pub fn build_app(session_secret: String) -> Router {
    let services = Arc::new(services::build_services(session_secret.as_bytes()));
    let auth_state = middleware::AuthState {
        codec: Arc::clone(&services.codec),
        policy: Arc::new(access_policy()),
    };

    // Protected routes: credential decode, then policy gate.
    // Layers run outermost-last, so authn executes before the policy check.
    let protected = routes::router()
        .layer(axum::middleware::from_fn_with_state(
            auth_state.clone(),
            middleware::policy_middleware,
        ))
        .layer(axum::middleware::from_fn_with_state(
            auth_state,
            middleware::authn_middleware,
        ))
        .layer(Extension(Arc::clone(&services)));

    Router::new()
        .route("/health", get(routes::system::health))
        .route("/auth/login", post(routes::session::login))
        .layer(Extension(services))
        .merge(protected)
}
