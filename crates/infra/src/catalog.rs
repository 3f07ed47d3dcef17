//! Lab parameter master-data catalog.

use std::collections::HashMap;
use std::sync::Mutex;

use clinicore_core::{DomainError, DomainResult};
use clinicore_lab::{LabParameter, ParameterId};

/// Shared reference data: parameters and their reference ranges.
///
/// Ranges are sorted ascending by `age_min_days` on construction
/// ([`LabParameter::new`]); the catalog only hands out those sorted views,
/// which the resolver's tie-break depends on.
#[derive(Debug, Default)]
pub struct ParameterCatalog {
    parameters: Mutex<HashMap<ParameterId, LabParameter>>,
}

impl ParameterCatalog {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert(&self, parameter: LabParameter) -> DomainResult<()> {
        let mut guard = self.parameters.lock().unwrap();
        if guard.contains_key(&parameter.id) {
            return Err(DomainError::duplicate_key(format!(
                "parameter {}",
                parameter.id
            )));
        }
        guard.insert(parameter.id, parameter);
        Ok(())
    }

    pub fn get(&self, id: ParameterId) -> Option<LabParameter> {
        self.parameters.lock().unwrap().get(&id).cloned()
    }
}
