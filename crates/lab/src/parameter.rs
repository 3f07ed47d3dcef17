//! Lab parameter master data: parameters and their age/gender-banded
//! reference ranges.

use serde::{Deserialize, Serialize};

use clinicore_core::{AggregateId, DomainError, DomainResult};

/// Lab parameter identifier (master data, shared reference).
#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ParameterId(pub AggregateId);

impl ParameterId {
    pub fn new(id: AggregateId) -> Self {
        Self(id)
    }
}

impl core::fmt::Display for ParameterId {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        core::fmt::Display::fmt(&self.0, f)
    }
}

/// Patient gender as used by reference ranges.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum Gender {
    Male,
    Female,
}

/// Definition of "normal" for one range: either a numeric band or free text.
///
/// The enum makes the "at least one of numeric/text" invariant structural.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum NormalSpec {
    /// Inclusive numeric band.
    Numeric { min: f64, max: f64 },
    /// Free-text definition (e.g. "negative", "see physician").
    Text(String),
}

/// One reference range: optional gender (absent = applies to both), an
/// inclusive age band in days, and a normal definition.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LabParameterRange {
    pub gender: Option<Gender>,
    pub age_min_days: i64,
    pub age_max_days: i64,
    pub normal: NormalSpec,
}

impl LabParameterRange {
    /// Invariant: `age_min_days <= age_max_days`.
    pub fn validate(&self) -> DomainResult<()> {
        if self.age_min_days > self.age_max_days {
            return Err(DomainError::validation(format!(
                "range age band is inverted ({} > {})",
                self.age_min_days, self.age_max_days
            )));
        }
        Ok(())
    }

    /// Whether this range covers `age_in_days` (inclusive band).
    pub fn covers_age(&self, age_in_days: i64) -> bool {
        self.age_min_days <= age_in_days && age_in_days <= self.age_max_days
    }
}

/// A measurable lab parameter and its configured reference ranges.
///
/// Ranges are held sorted ascending by `age_min_days`; this stored order is
/// load-bearing for the resolver's first-match tie-break and must be preserved
/// by any storage layer.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LabParameter {
    pub id: ParameterId,
    pub name: String,
    pub unit: Option<String>,
    normal_ranges: Vec<LabParameterRange>,
}

impl LabParameter {
    pub fn new(
        id: ParameterId,
        name: impl Into<String>,
        unit: Option<String>,
        mut ranges: Vec<LabParameterRange>,
    ) -> DomainResult<Self> {
        for range in &ranges {
            range.validate()?;
        }
        // Stable sort: equal age_min keeps configuration order.
        ranges.sort_by_key(|r| r.age_min_days);
        Ok(Self {
            id,
            name: name.into(),
            unit,
            normal_ranges: ranges,
        })
    }

    pub fn normal_ranges(&self) -> &[LabParameterRange] {
        &self.normal_ranges
    }
}
