use axum::http::StatusCode;
use axum::response::IntoResponse;
use serde_json::json;

use clinicore_auth::AuthzError;
use clinicore_core::DomainError;
use clinicore_lab::LabOrderError;

pub fn json_error(
    status: StatusCode,
    code: &'static str,
    message: impl Into<String>,
) -> axum::response::Response {
    (
        status,
        axum::Json(json!({
            "error": code,
            "message": message.into(),
        })),
    )
        .into_response()
}

pub fn authz_error_to_response(err: AuthzError) -> axum::response::Response {
    let code = match err {
        AuthzError::MissingPermission(_) => "missing_permission",
        AuthzError::RoleNotAllowed => "role_not_allowed",
        AuthzError::NotSuperAdmin => "not_super_admin",
    };
    json_error(StatusCode::FORBIDDEN, code, err.to_string())
}

pub fn order_error_to_response(err: LabOrderError) -> axum::response::Response {
    match &err {
        LabOrderError::InvalidState { .. } => {
            json_error(StatusCode::CONFLICT, "invalid_state", err.to_string())
        }
        LabOrderError::NotAnEmployee => json_error(
            StatusCode::UNPROCESSABLE_ENTITY,
            "not_an_employee",
            err.to_string(),
        ),
        LabOrderError::MissingInterpretation => json_error(
            StatusCode::UNPROCESSABLE_ENTITY,
            "missing_interpretation",
            err.to_string(),
        ),
        LabOrderError::Domain(e) => domain_error_to_response(e.clone()),
    }
}

pub fn domain_error_to_response(err: DomainError) -> axum::response::Response {
    match &err {
        DomainError::Validation(_) | DomainError::InvalidId(_) => {
            json_error(StatusCode::BAD_REQUEST, "validation_error", err.to_string())
        }
        DomainError::InvariantViolation(_) | DomainError::ConstraintViolation(_) => json_error(
            StatusCode::UNPROCESSABLE_ENTITY,
            "invariant_violation",
            err.to_string(),
        ),
        DomainError::NotFound => json_error(StatusCode::NOT_FOUND, "not_found", "not found"),
        DomainError::DuplicateKey(_) | DomainError::Conflict(_) => {
            json_error(StatusCode::CONFLICT, "conflict", err.to_string())
        }
    }
}
