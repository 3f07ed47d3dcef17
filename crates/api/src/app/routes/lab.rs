//! Lab order endpoints: creation, result entry, validation, attachments, and
//! the validation workbench.

use std::sync::Arc;

use axum::{
    Json, Router,
    extract::{Extension, Path},
    http::StatusCode,
    response::IntoResponse,
    routing::{get, post},
};
use chrono::Utc;

use clinicore_core::{AggregateId, BranchId, ExpectedVersion};
use clinicore_lab::order::{
    AttachImage, CreateLabOrder, RecordResults, ValidateLabOrder,
};
use clinicore_lab::{
    LabOrder, LabOrderCommand, LabOrderError, LabOrderId, LabResult, RadiologyImage, ResultFlag,
    age_in_days, classify, resolve,
};

use crate::app::dto::{
    AttachImageRequest, CreateOrderRequest, OrderResponse, RecordResultsRequest, ValidateRequest,
    WorkbenchEntryResponse,
};
use crate::app::errors;
use crate::app::services::AppServices;
use crate::context::CredentialContext;

pub fn router() -> Router {
    Router::new()
        .route("/clinic/:branch_id/lab/orders", post(create_order))
        .route(
            "/clinic/:branch_id/lab/orders/:order_id/results",
            post(record_results),
        )
        .route(
            "/clinic/:branch_id/lab/orders/:order_id/validate",
            post(validate_order),
        )
        .route(
            "/clinic/:branch_id/lab/orders/:order_id/images",
            post(attach_image),
        )
        .route("/clinic/:branch_id/lab/validation-queue", get(validation_queue))
}

fn parse_branch(raw: &str) -> Result<BranchId, axum::response::Response> {
    raw.parse::<BranchId>()
        .map_err(errors::domain_error_to_response)
}

fn parse_order_id(raw: &str) -> Result<LabOrderId, axum::response::Response> {
    raw.parse::<AggregateId>()
        .map(LabOrderId::new)
        .map_err(errors::domain_error_to_response)
}

/// Orders are branch-scoped through the **patient** they belong to.
fn ensure_order_in_branch(
    services: &AppServices,
    order: &LabOrder,
    branch_id: BranchId,
) -> Result<(), axum::response::Response> {
    let patient_branch = order
        .patient_id()
        .and_then(|id| services.patients.branch_of(id));
    if patient_branch != Some(branch_id) {
        return Err(errors::json_error(
            StatusCode::NOT_FOUND,
            "not_found",
            "order not found in this branch",
        ));
    }
    Ok(())
}

/// POST /clinic/:branch_id/lab/orders
pub async fn create_order(
    Extension(services): Extension<Arc<AppServices>>,
    Path(branch_id): Path<String>,
    Json(req): Json<CreateOrderRequest>,
) -> axum::response::Response {
    let branch_id = match parse_branch(&branch_id) {
        Ok(id) => id,
        Err(resp) => return resp,
    };

    let Some(patient) = services.patients.get(req.patient_id) else {
        return errors::json_error(StatusCode::NOT_FOUND, "not_found", "unknown patient");
    };
    if patient.branch_id != branch_id {
        return errors::json_error(
            StatusCode::NOT_FOUND,
            "not_found",
            "patient not registered in this branch",
        );
    }

    let order_id = LabOrderId::new(AggregateId::new());
    let command = LabOrderCommand::Create(CreateLabOrder {
        order_id,
        patient_id: req.patient_id,
        service: req.service,
        occurred_at: Utc::now(),
    });

    match services
        .orders
        .execute(order_id, ExpectedVersion::Exact(0), &command)
    {
        Ok(order) => (StatusCode::CREATED, Json(OrderResponse::from_order(&order))).into_response(),
        Err(e) => errors::order_error_to_response(e),
    }
}

/// POST /clinic/:branch_id/lab/orders/:order_id/results
///
/// The caller asserts that the submitted set covers the service panel; each
/// entry is annotated here with its resolved reference range (if any) and
/// classification before the transition to PENDING_VALIDATION.
pub async fn record_results(
    Extension(services): Extension<Arc<AppServices>>,
    Path((branch_id, order_id)): Path<(String, String)>,
    Json(req): Json<RecordResultsRequest>,
) -> axum::response::Response {
    let branch_id = match parse_branch(&branch_id) {
        Ok(id) => id,
        Err(resp) => return resp,
    };
    let order_id = match parse_order_id(&order_id) {
        Ok(id) => id,
        Err(resp) => return resp,
    };

    let Some(order) = services.orders.get(order_id) else {
        return errors::json_error(StatusCode::NOT_FOUND, "not_found", "unknown order");
    };
    if let Err(resp) = ensure_order_in_branch(&services, &order, branch_id) {
        return resp;
    }

    let Some(patient) = order.patient_id().and_then(|id| services.patients.get(id)) else {
        return errors::json_error(StatusCode::NOT_FOUND, "not_found", "unknown patient");
    };
    let age = age_in_days(patient.date_of_birth, Utc::now());

    let mut results = Vec::with_capacity(req.results.len());
    for entry in req.results {
        let Some(parameter) = services.parameters.get(entry.parameter_id) else {
            return errors::json_error(
                StatusCode::NOT_FOUND,
                "not_found",
                format!("unknown parameter {}", entry.parameter_id),
            );
        };

        let resolved = resolve(&parameter, age, patient.gender);
        let flag = resolved
            .map(|range| classify(range, &entry.value))
            .unwrap_or(ResultFlag::Unclassified);

        results.push(LabResult {
            parameter_id: parameter.id,
            parameter_name: parameter.name.clone(),
            raw_value: entry.value,
            unit: parameter.unit.clone(),
            reference: resolved.map(|range| range.normal.clone()),
            flag,
        });
    }

    let command = LabOrderCommand::RecordResults(RecordResults {
        order_id,
        results,
        occurred_at: Utc::now(),
    });

    match services.orders.execute(order_id, ExpectedVersion::Any, &command) {
        Ok(order) => (StatusCode::OK, Json(OrderResponse::from_order(&order))).into_response(),
        Err(e) => errors::order_error_to_response(e),
    }
}

/// POST /clinic/:branch_id/lab/orders/:order_id/validate
///
/// Only an acting identity with an employee record may validate. The status
/// precondition and the update are applied atomically by the store.
pub async fn validate_order(
    Extension(services): Extension<Arc<AppServices>>,
    Extension(ctx): Extension<CredentialContext>,
    Path((branch_id, order_id)): Path<(String, String)>,
    Json(req): Json<ValidateRequest>,
) -> axum::response::Response {
    let branch_id = match parse_branch(&branch_id) {
        Ok(id) => id,
        Err(resp) => return resp,
    };
    let order_id = match parse_order_id(&order_id) {
        Ok(id) => id,
        Err(resp) => return resp,
    };

    let Some(order) = services.orders.get(order_id) else {
        return errors::json_error(StatusCode::NOT_FOUND, "not_found", "unknown order");
    };
    if let Err(resp) = ensure_order_in_branch(&services, &order, branch_id) {
        return resp;
    }

    let Some(employee) = services
        .employees
        .employee_for_user(ctx.credential().user_id)
    else {
        return errors::order_error_to_response(LabOrderError::NotAnEmployee);
    };

    let command = LabOrderCommand::Validate(ValidateLabOrder {
        order_id,
        employee_id: employee.employee_id,
        interpretation: req.interpretation,
        occurred_at: Utc::now(),
    });

    match services.orders.execute(order_id, ExpectedVersion::Any, &command) {
        Ok(order) => {
            tracing::info!(order = %order_id, validator = %employee.employee_id, "lab order validated");
            (StatusCode::OK, Json(OrderResponse::from_order(&order))).into_response()
        }
        Err(e) => errors::order_error_to_response(e),
    }
}

/// POST /clinic/:branch_id/lab/orders/:order_id/images
pub async fn attach_image(
    Extension(services): Extension<Arc<AppServices>>,
    Path((branch_id, order_id)): Path<(String, String)>,
    Json(req): Json<AttachImageRequest>,
) -> axum::response::Response {
    let branch_id = match parse_branch(&branch_id) {
        Ok(id) => id,
        Err(resp) => return resp,
    };
    let order_id = match parse_order_id(&order_id) {
        Ok(id) => id,
        Err(resp) => return resp,
    };

    let Some(order) = services.orders.get(order_id) else {
        return errors::json_error(StatusCode::NOT_FOUND, "not_found", "unknown order");
    };
    if let Err(resp) = ensure_order_in_branch(&services, &order, branch_id) {
        return resp;
    }

    let command = LabOrderCommand::AttachImage(AttachImage {
        order_id,
        image: RadiologyImage {
            file_name: req.file_name,
            content_type: req.content_type,
            storage_key: req.storage_key,
            uploaded_at: Utc::now(),
        },
        occurred_at: Utc::now(),
    });

    match services.orders.execute(order_id, ExpectedVersion::Any, &command) {
        Ok(order) => (StatusCode::OK, Json(OrderResponse::from_order(&order))).into_response(),
        Err(e) => errors::order_error_to_response(e),
    }
}

/// GET /clinic/:branch_id/lab/validation-queue
///
/// Orders in {PENDING_VALIDATION, COMPLETED}, scoped by the **patient's**
/// branch, newest first.
pub async fn validation_queue(
    Extension(services): Extension<Arc<AppServices>>,
    Path(branch_id): Path<String>,
) -> axum::response::Response {
    let branch_id = match parse_branch(&branch_id) {
        Ok(id) => id,
        Err(resp) => return resp,
    };

    let entries: Vec<WorkbenchEntryResponse> = services
        .orders
        .list_validation_workbench(branch_id, &services.patients)
        .iter()
        .map(WorkbenchEntryResponse::from_entry)
        .collect();

    (StatusCode::OK, Json(entries)).into_response()
}
