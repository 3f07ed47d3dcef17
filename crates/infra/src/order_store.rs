//! Lab order store with atomic command execution.
//!
//! The precondition check and the state update happen under one lock, so two
//! concurrent validations of the same order cannot both succeed (the second
//! sees `Completed` and fails with `InvalidState`). A database-backed
//! implementation must keep the same check-then-act atomicity (transaction or
//! compare-and-swap).

use std::collections::HashMap;
use std::sync::Mutex;

use clinicore_core::{Aggregate, AggregateRoot, BranchId, ExpectedVersion};
use clinicore_lab::{LabOrder, LabOrderCommand, LabOrderError, LabOrderId, LabOrderStatus};

use crate::registry::{PatientRegistry, PatientSummary};

/// One row of the validation workbench: order plus embedded patient summary.
#[derive(Debug, Clone)]
pub struct WorkbenchEntry {
    pub order: LabOrder,
    pub patient: PatientSummary,
}

#[derive(Debug, Default)]
pub struct InMemoryOrderStore {
    orders: Mutex<HashMap<LabOrderId, LabOrder>>,
}

impl InMemoryOrderStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Load → version check → decide → apply → save, all under one lock.
    pub fn execute(
        &self,
        order_id: LabOrderId,
        expected: ExpectedVersion,
        command: &LabOrderCommand,
    ) -> Result<LabOrder, LabOrderError> {
        let mut guard = self.orders.lock().unwrap();

        let mut order = guard
            .get(&order_id)
            .cloned()
            .unwrap_or_else(|| LabOrder::empty(order_id));

        expected.check(order.version())?;

        let events = order.handle(command)?;
        for event in &events {
            order.apply(event);
        }

        guard.insert(order_id, order.clone());
        Ok(order)
    }

    pub fn get(&self, order_id: LabOrderId) -> Option<LabOrder> {
        self.orders.lock().unwrap().get(&order_id).cloned()
    }

    /// Validation workbench: orders in `{PendingValidation, Completed}` whose
    /// **patient** belongs to `branch_id`, newest order first.
    pub fn list_validation_workbench(
        &self,
        branch_id: BranchId,
        patients: &PatientRegistry,
    ) -> Vec<WorkbenchEntry> {
        let guard = self.orders.lock().unwrap();

        let mut entries: Vec<WorkbenchEntry> = guard
            .values()
            .filter(|order| {
                matches!(
                    order.status(),
                    LabOrderStatus::PendingValidation | LabOrderStatus::Completed
                )
            })
            .filter_map(|order| {
                let patient = order.patient_id().and_then(|id| patients.get(id))?;
                (patient.branch_id == branch_id).then(|| WorkbenchEntry {
                    order: order.clone(),
                    patient,
                })
            })
            .collect();

        entries.sort_by(|a, b| b.order.ordered_at().cmp(&a.order.ordered_at()));
        entries
    }

    /// Completed order totals per service, for the accounting report surface.
    pub fn completed_revenue_minor_units(&self) -> u64 {
        self.orders
            .lock()
            .unwrap()
            .values()
            .filter(|o| o.status() == LabOrderStatus::Completed)
            .filter_map(|o| o.service().map(|s| s.price))
            .sum()
    }
}
