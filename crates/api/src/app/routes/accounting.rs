//! Accounting report surface.
//!
//! These endpoints carry TWO independent authorization paths: the policy
//! table requires `view_financial_reports`, and the handler additionally
//! applies a coarser role allow-list. Both must pass.

use std::sync::Arc;

use axum::{
    Json, Router,
    extract::Extension,
    http::StatusCode,
    response::IntoResponse,
    routing::get,
};
use serde_json::json;

use clinicore_auth::{Gate, Role, evaluate_all};

use crate::app::errors;
use crate::app::services::AppServices;
use crate::context::CredentialContext;

pub fn router() -> Router {
    Router::new().route("/accounting/reports", get(reports))
}

/// GET /accounting/reports
pub async fn reports(
    Extension(services): Extension<Arc<AppServices>>,
    Extension(ctx): Extension<CredentialContext>,
) -> axum::response::Response {
    let gates = [Gate::RoleAllowList(vec![
        Role::new("accountant"),
        Role::new("manager"),
    ])];
    if let Err(e) = evaluate_all(&gates, ctx.credential()) {
        return errors::authz_error_to_response(e);
    }

    let revenue = services.orders.completed_revenue_minor_units();
    (
        StatusCode::OK,
        Json(json!({ "completed_lab_revenue_minor_units": revenue })),
    )
        .into_response()
}
