//! Request/response DTOs and JSON mapping helpers.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use clinicore_core::{EmployeeId, PatientId};
use clinicore_infra::{PatientSummary, WorkbenchEntry};
use clinicore_lab::{
    LabOrder, LabOrderStatus, LabResult, LabServiceRef, ParameterId, RadiologyImage,
};

#[derive(Debug, Deserialize)]
pub struct LoginRequest {
    pub email: String,
    pub password: String,
}

#[derive(Debug, Serialize)]
pub struct LoginResponse {
    pub token: String,
}

#[derive(Debug, Deserialize)]
pub struct CreateOrderRequest {
    pub patient_id: PatientId,
    pub service: LabServiceRef,
}

#[derive(Debug, Deserialize)]
pub struct ResultEntry {
    pub parameter_id: ParameterId,
    pub value: String,
}

#[derive(Debug, Deserialize)]
pub struct RecordResultsRequest {
    pub results: Vec<ResultEntry>,
}

#[derive(Debug, Deserialize)]
pub struct ValidateRequest {
    pub interpretation: String,
}

#[derive(Debug, Deserialize)]
pub struct AttachImageRequest {
    pub file_name: String,
    pub content_type: String,
    pub storage_key: String,
}

#[derive(Debug, Serialize)]
pub struct OrderResponse {
    pub id: String,
    pub patient_id: Option<PatientId>,
    pub service: Option<LabServiceRef>,
    pub status: LabOrderStatus,
    pub results: Vec<LabResult>,
    pub images: Vec<RadiologyImage>,
    pub interpretation: Option<String>,
    pub validator: Option<EmployeeId>,
    pub validated_at: Option<DateTime<Utc>>,
    pub ordered_at: Option<DateTime<Utc>>,
}

impl OrderResponse {
    pub fn from_order(order: &LabOrder) -> Self {
        Self {
            id: order.id_typed().to_string(),
            patient_id: order.patient_id(),
            service: order.service().cloned(),
            status: order.status(),
            results: order.results().to_vec(),
            images: order.images().to_vec(),
            interpretation: order.interpretation().map(str::to_string),
            validator: order.validator(),
            validated_at: order.validated_at(),
            ordered_at: order.ordered_at(),
        }
    }
}

#[derive(Debug, Serialize)]
pub struct WorkbenchEntryResponse {
    pub order: OrderResponse,
    pub patient: PatientSummary,
}

impl WorkbenchEntryResponse {
    pub fn from_entry(entry: &WorkbenchEntry) -> Self {
        Self {
            order: OrderResponse::from_order(&entry.order),
            patient: entry.patient.clone(),
        }
    }
}
