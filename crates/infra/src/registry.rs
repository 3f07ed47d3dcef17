//! Patient registry: the summaries the lab core needs (age, gender, branch).

use std::collections::HashMap;
use std::sync::Mutex;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use clinicore_core::{BranchId, PatientId};
use clinicore_lab::Gender;

/// Embedded patient summary.
///
/// Branch scoping for the validation workbench is derived from here (the
/// patient's branch), never from the validating employee's branch.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PatientSummary {
    pub id: PatientId,
    pub full_name: String,
    pub branch_id: BranchId,
    pub date_of_birth: DateTime<Utc>,
    pub gender: Gender,
}

#[derive(Debug, Default)]
pub struct PatientRegistry {
    patients: Mutex<HashMap<PatientId, PatientSummary>>,
}

impl PatientRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert(&self, patient: PatientSummary) {
        self.patients.lock().unwrap().insert(patient.id, patient);
    }

    pub fn get(&self, id: PatientId) -> Option<PatientSummary> {
        self.patients.lock().unwrap().get(&id).cloned()
    }

    pub fn branch_of(&self, id: PatientId) -> Option<BranchId> {
        self.get(id).map(|p| p.branch_id)
    }
}
