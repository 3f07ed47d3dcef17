//! Lab order lifecycle: ORDERED → PENDING_VALIDATION → COMPLETED.
//!
//! Modeled as a pure aggregate: `handle` decides, `apply` evolves. No reverse
//! transitions exist here; cancellation/deletion is a destructive operation
//! outside this state machine.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use thiserror::Error;

use clinicore_core::{Aggregate, AggregateId, AggregateRoot, DomainError, EmployeeId, PatientId};

use crate::parameter::{NormalSpec, ParameterId};
use crate::reference::ResultFlag;

/// Lab order identifier.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct LabOrderId(pub AggregateId);

impl LabOrderId {
    pub fn new(id: AggregateId) -> Self {
        Self(id)
    }
}

impl core::fmt::Display for LabOrderId {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        core::fmt::Display::fmt(&self.0, f)
    }
}

/// Lab service identifier (named panel of parameters).
#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct LabServiceId(pub AggregateId);

impl LabServiceId {
    pub fn new(id: AggregateId) -> Self {
        Self(id)
    }
}

impl core::fmt::Display for LabServiceId {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        core::fmt::Display::fmt(&self.0, f)
    }
}

/// Order status lifecycle.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum LabOrderStatus {
    Ordered,
    PendingValidation,
    Completed,
}

/// Reference to the ordered service panel (embedded summary).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LabServiceRef {
    pub id: LabServiceId,
    pub name: String,
    pub category: String,
    /// Price in smallest currency unit (accounting arithmetic is external).
    pub price: u64,
}

/// One recorded measurement, annotated at entry time with the resolved
/// reference (if any) and its classification.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LabResult {
    pub parameter_id: ParameterId,
    pub parameter_name: String,
    pub raw_value: String,
    pub unit: Option<String>,
    /// Snapshot of the resolved normal definition; `None` is the valid
    /// "no reference available" state.
    pub reference: Option<NormalSpec>,
    pub flag: ResultFlag,
}

/// Uploaded binary reference attached to an order, independent of the
/// numeric/text result flow.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RadiologyImage {
    pub file_name: String,
    pub content_type: String,
    /// Opaque storage reference; file storage itself is out of scope.
    pub storage_key: String,
    pub uploaded_at: DateTime<Utc>,
}

/// Lifecycle failures.
///
/// `NotAnEmployee` is raised at the request boundary when the acting identity
/// has no employee record; it shares this taxonomy so the wire contract stays
/// uniform.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum LabOrderError {
    #[error("invalid state: order is {actual:?}, expected {expected:?}")]
    InvalidState {
        expected: LabOrderStatus,
        actual: LabOrderStatus,
    },

    #[error("acting identity has no employee record")]
    NotAnEmployee,

    #[error("interpretation text must not be empty")]
    MissingInterpretation,

    #[error(transparent)]
    Domain(#[from] DomainError),
}

/// Aggregate root: LabOrder.
#[derive(Debug, Clone, PartialEq)]
pub struct LabOrder {
    id: LabOrderId,
    patient_id: Option<PatientId>,
    service: Option<LabServiceRef>,
    status: LabOrderStatus,
    results: Vec<LabResult>,
    images: Vec<RadiologyImage>,
    interpretation: Option<String>,
    validator: Option<EmployeeId>,
    validated_at: Option<DateTime<Utc>>,
    ordered_at: Option<DateTime<Utc>>,
    version: u64,
    created: bool,
}

impl LabOrder {
    /// Create an empty, not-yet-created aggregate instance for rehydration.
    pub fn empty(id: LabOrderId) -> Self {
        Self {
            id,
            patient_id: None,
            service: None,
            status: LabOrderStatus::Ordered,
            results: Vec::new(),
            images: Vec::new(),
            interpretation: None,
            validator: None,
            validated_at: None,
            ordered_at: None,
            version: 0,
            created: false,
        }
    }

    pub fn id_typed(&self) -> LabOrderId {
        self.id
    }

    pub fn patient_id(&self) -> Option<PatientId> {
        self.patient_id
    }

    pub fn service(&self) -> Option<&LabServiceRef> {
        self.service.as_ref()
    }

    pub fn status(&self) -> LabOrderStatus {
        self.status
    }

    pub fn results(&self) -> &[LabResult] {
        &self.results
    }

    pub fn images(&self) -> &[RadiologyImage] {
        &self.images
    }

    pub fn interpretation(&self) -> Option<&str> {
        self.interpretation.as_deref()
    }

    pub fn validator(&self) -> Option<EmployeeId> {
        self.validator
    }

    pub fn validated_at(&self) -> Option<DateTime<Utc>> {
        self.validated_at
    }

    pub fn ordered_at(&self) -> Option<DateTime<Utc>> {
        self.ordered_at
    }

    pub fn is_created(&self) -> bool {
        self.created
    }
}

impl AggregateRoot for LabOrder {
    type Id = LabOrderId;

    fn id(&self) -> &Self::Id {
        &self.id
    }

    fn version(&self) -> u64 {
        self.version
    }
}

/// Command: CreateLabOrder.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CreateLabOrder {
    pub order_id: LabOrderId,
    pub patient_id: PatientId,
    pub service: LabServiceRef,
    pub occurred_at: DateTime<Utc>,
}

/// Command: RecordResults.
///
/// The caller asserts the "all results for the panel are present"
/// precondition; this core does not poll for completeness.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RecordResults {
    pub order_id: LabOrderId,
    pub results: Vec<LabResult>,
    pub occurred_at: DateTime<Utc>,
}

/// Command: ValidateLabOrder.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ValidateLabOrder {
    pub order_id: LabOrderId,
    pub employee_id: EmployeeId,
    pub interpretation: String,
    pub occurred_at: DateTime<Utc>,
}

/// Command: AttachImage.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AttachImage {
    pub order_id: LabOrderId,
    pub image: RadiologyImage,
    pub occurred_at: DateTime<Utc>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum LabOrderCommand {
    Create(CreateLabOrder),
    RecordResults(RecordResults),
    Validate(ValidateLabOrder),
    AttachImage(AttachImage),
}

/// Event: LabOrderCreated.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LabOrderCreated {
    pub order_id: LabOrderId,
    pub patient_id: PatientId,
    pub service: LabServiceRef,
    pub occurred_at: DateTime<Utc>,
}

/// Event: ResultsRecorded (ORDERED → PENDING_VALIDATION).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ResultsRecorded {
    pub order_id: LabOrderId,
    pub results: Vec<LabResult>,
    pub occurred_at: DateTime<Utc>,
}

/// Event: LabOrderValidated (PENDING_VALIDATION → COMPLETED).
///
/// Status, interpretation, validator and timestamp travel in ONE event, so an
/// order can never be Completed without a validator or vice versa.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LabOrderValidated {
    pub order_id: LabOrderId,
    pub employee_id: EmployeeId,
    pub interpretation: String,
    pub occurred_at: DateTime<Utc>,
}

/// Event: ImageAttached.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ImageAttached {
    pub order_id: LabOrderId,
    pub image: RadiologyImage,
    pub occurred_at: DateTime<Utc>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum LabOrderEvent {
    Created(LabOrderCreated),
    ResultsRecorded(ResultsRecorded),
    Validated(LabOrderValidated),
    ImageAttached(ImageAttached),
}

impl Aggregate for LabOrder {
    type Command = LabOrderCommand;
    type Event = LabOrderEvent;
    type Error = LabOrderError;

    fn apply(&mut self, event: &Self::Event) {
        match event {
            LabOrderEvent::Created(e) => {
                self.id = e.order_id;
                self.patient_id = Some(e.patient_id);
                self.service = Some(e.service.clone());
                self.status = LabOrderStatus::Ordered;
                self.ordered_at = Some(e.occurred_at);
                self.created = true;
            }
            LabOrderEvent::ResultsRecorded(e) => {
                self.results = e.results.clone();
                self.status = LabOrderStatus::PendingValidation;
            }
            LabOrderEvent::Validated(e) => {
                self.status = LabOrderStatus::Completed;
                self.interpretation = Some(e.interpretation.clone());
                self.validator = Some(e.employee_id);
                self.validated_at = Some(e.occurred_at);
            }
            LabOrderEvent::ImageAttached(e) => {
                self.images.push(e.image.clone());
            }
        }

        // Deterministic version tracking: +1 per applied event.
        self.version += 1;
    }

    fn handle(&self, command: &Self::Command) -> Result<Vec<Self::Event>, Self::Error> {
        match command {
            LabOrderCommand::Create(cmd) => self.handle_create(cmd),
            LabOrderCommand::RecordResults(cmd) => self.handle_record_results(cmd),
            LabOrderCommand::Validate(cmd) => self.handle_validate(cmd),
            LabOrderCommand::AttachImage(cmd) => self.handle_attach_image(cmd),
        }
    }
}

impl LabOrder {
    fn ensure_order_id(&self, order_id: LabOrderId) -> Result<(), LabOrderError> {
        if self.id != order_id {
            return Err(DomainError::invariant("order_id mismatch").into());
        }
        Ok(())
    }

    fn handle_create(&self, cmd: &CreateLabOrder) -> Result<Vec<LabOrderEvent>, LabOrderError> {
        if self.created {
            return Err(DomainError::conflict("lab order already exists").into());
        }

        Ok(vec![LabOrderEvent::Created(LabOrderCreated {
            order_id: cmd.order_id,
            patient_id: cmd.patient_id,
            service: cmd.service.clone(),
            occurred_at: cmd.occurred_at,
        })])
    }

    fn handle_record_results(
        &self,
        cmd: &RecordResults,
    ) -> Result<Vec<LabOrderEvent>, LabOrderError> {
        if !self.created {
            return Err(DomainError::not_found().into());
        }
        self.ensure_order_id(cmd.order_id)?;

        if self.status != LabOrderStatus::Ordered {
            return Err(LabOrderError::InvalidState {
                expected: LabOrderStatus::Ordered,
                actual: self.status,
            });
        }

        if cmd.results.is_empty() {
            return Err(
                DomainError::validation("cannot submit an empty result set").into(),
            );
        }

        Ok(vec![LabOrderEvent::ResultsRecorded(ResultsRecorded {
            order_id: cmd.order_id,
            results: cmd.results.clone(),
            occurred_at: cmd.occurred_at,
        })])
    }

    fn handle_validate(
        &self,
        cmd: &ValidateLabOrder,
    ) -> Result<Vec<LabOrderEvent>, LabOrderError> {
        if !self.created {
            return Err(DomainError::not_found().into());
        }
        self.ensure_order_id(cmd.order_id)?;

        if self.status != LabOrderStatus::PendingValidation {
            return Err(LabOrderError::InvalidState {
                expected: LabOrderStatus::PendingValidation,
                actual: self.status,
            });
        }

        if cmd.interpretation.trim().is_empty() {
            return Err(LabOrderError::MissingInterpretation);
        }

        Ok(vec![LabOrderEvent::Validated(LabOrderValidated {
            order_id: cmd.order_id,
            employee_id: cmd.employee_id,
            interpretation: cmd.interpretation.clone(),
            occurred_at: cmd.occurred_at,
        })])
    }

    fn handle_attach_image(
        &self,
        cmd: &AttachImage,
    ) -> Result<Vec<LabOrderEvent>, LabOrderError> {
        if !self.created {
            return Err(DomainError::not_found().into());
        }
        self.ensure_order_id(cmd.order_id)?;

        if self.status == LabOrderStatus::Completed {
            return Err(LabOrderError::InvalidState {
                expected: LabOrderStatus::PendingValidation,
                actual: self.status,
            });
        }

        Ok(vec![LabOrderEvent::ImageAttached(ImageAttached {
            order_id: cmd.order_id,
            image: cmd.image.clone(),
            occurred_at: cmd.occurred_at,
        })])
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn test_order_id() -> LabOrderId {
        LabOrderId::new(AggregateId::new())
    }

    fn test_service() -> LabServiceRef {
        LabServiceRef {
            id: LabServiceId::new(AggregateId::new()),
            name: "Complete Blood Count".to_string(),
            category: "Hematology".to_string(),
            price: 2500,
        }
    }

    fn test_result() -> LabResult {
        LabResult {
            parameter_id: ParameterId::new(AggregateId::new()),
            parameter_name: "Hemoglobin".to_string(),
            raw_value: "13.2".to_string(),
            unit: Some("g/dL".to_string()),
            reference: Some(NormalSpec::Numeric { min: 12.0, max: 15.5 }),
            flag: ResultFlag::Normal,
        }
    }

    fn created_order(order_id: LabOrderId) -> LabOrder {
        let mut order = LabOrder::empty(order_id);
        let events = order
            .handle(&LabOrderCommand::Create(CreateLabOrder {
                order_id,
                patient_id: PatientId::new(),
                service: test_service(),
                occurred_at: Utc::now(),
            }))
            .unwrap();
        for e in &events {
            order.apply(e);
        }
        order
    }

    fn pending_order(order_id: LabOrderId) -> LabOrder {
        let mut order = created_order(order_id);
        let events = order
            .handle(&LabOrderCommand::RecordResults(RecordResults {
                order_id,
                results: vec![test_result()],
                occurred_at: Utc::now(),
            }))
            .unwrap();
        for e in &events {
            order.apply(e);
        }
        order
    }

    #[test]
    fn recording_results_moves_order_to_pending_validation() {
        let order_id = test_order_id();
        let order = pending_order(order_id);

        assert_eq!(order.status(), LabOrderStatus::PendingValidation);
        assert_eq!(order.results().len(), 1);
        assert!(order.validator().is_none());
    }

    #[test]
    fn validate_on_ordered_fails_with_invalid_state_and_leaves_order_unchanged() {
        let order_id = test_order_id();
        let order = created_order(order_id);
        let before = order.clone();

        let err = order
            .handle(&LabOrderCommand::Validate(ValidateLabOrder {
                order_id,
                employee_id: EmployeeId::new(),
                interpretation: "unremarkable".to_string(),
                occurred_at: Utc::now(),
            }))
            .unwrap_err();

        assert!(matches!(
            err,
            LabOrderError::InvalidState {
                actual: LabOrderStatus::Ordered,
                ..
            }
        ));
        assert_eq!(order, before);
    }

    #[test]
    fn empty_interpretation_is_rejected() {
        let order_id = test_order_id();
        let order = pending_order(order_id);

        let err = order
            .handle(&LabOrderCommand::Validate(ValidateLabOrder {
                order_id,
                employee_id: EmployeeId::new(),
                interpretation: "   ".to_string(),
                occurred_at: Utc::now(),
            }))
            .unwrap_err();

        assert_eq!(err, LabOrderError::MissingInterpretation);
    }

    #[test]
    fn successful_validation_sets_status_validator_and_timestamp_together() {
        let order_id = test_order_id();
        let mut order = pending_order(order_id);
        let employee = EmployeeId::new();
        let at = Utc::now();

        let events = order
            .handle(&LabOrderCommand::Validate(ValidateLabOrder {
                order_id,
                employee_id: employee,
                interpretation: "within normal limits".to_string(),
                occurred_at: at,
            }))
            .unwrap();
        assert_eq!(events.len(), 1);
        for e in &events {
            order.apply(e);
        }

        assert_eq!(order.status(), LabOrderStatus::Completed);
        assert_eq!(order.validator(), Some(employee));
        assert_eq!(order.validated_at(), Some(at));
        assert_eq!(order.interpretation(), Some("within normal limits"));
    }

    #[test]
    fn second_validation_fails_with_invalid_state() {
        let order_id = test_order_id();
        let mut order = pending_order(order_id);

        let cmd = LabOrderCommand::Validate(ValidateLabOrder {
            order_id,
            employee_id: EmployeeId::new(),
            interpretation: "ok".to_string(),
            occurred_at: Utc::now(),
        });

        let events = order.handle(&cmd).unwrap();
        for e in &events {
            order.apply(e);
        }

        let err = order.handle(&cmd).unwrap_err();
        assert!(matches!(
            err,
            LabOrderError::InvalidState {
                actual: LabOrderStatus::Completed,
                ..
            }
        ));
    }

    #[test]
    fn images_attach_independently_of_results_but_not_after_completion() {
        let order_id = test_order_id();
        let mut order = created_order(order_id);

        let image = RadiologyImage {
            file_name: "chest-xray.dcm".to_string(),
            content_type: "application/dicom".to_string(),
            storage_key: "uploads/2026/chest-xray.dcm".to_string(),
            uploaded_at: Utc::now(),
        };

        let events = order
            .handle(&LabOrderCommand::AttachImage(AttachImage {
                order_id,
                image: image.clone(),
                occurred_at: Utc::now(),
            }))
            .unwrap();
        for e in &events {
            order.apply(e);
        }
        assert_eq!(order.images().len(), 1);

        // Complete the order, then attachment must be refused.
        let events = order
            .handle(&LabOrderCommand::RecordResults(RecordResults {
                order_id,
                results: vec![test_result()],
                occurred_at: Utc::now(),
            }))
            .unwrap();
        for e in &events {
            order.apply(e);
        }
        let events = order
            .handle(&LabOrderCommand::Validate(ValidateLabOrder {
                order_id,
                employee_id: EmployeeId::new(),
                interpretation: "ok".to_string(),
                occurred_at: Utc::now(),
            }))
            .unwrap();
        for e in &events {
            order.apply(e);
        }

        let err = order
            .handle(&LabOrderCommand::AttachImage(AttachImage {
                order_id,
                image,
                occurred_at: Utc::now(),
            }))
            .unwrap_err();
        assert!(matches!(err, LabOrderError::InvalidState { .. }));
    }

    #[test]
    fn create_twice_conflicts() {
        let order_id = test_order_id();
        let order = created_order(order_id);

        let err = order
            .handle(&LabOrderCommand::Create(CreateLabOrder {
                order_id,
                patient_id: PatientId::new(),
                service: test_service(),
                occurred_at: Utc::now(),
            }))
            .unwrap_err();
        assert!(matches!(err, LabOrderError::Domain(DomainError::Conflict(_))));
    }
}
