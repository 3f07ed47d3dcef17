//! `clinicore-lab` — clinical laboratory domain.
//!
//! Reference-range resolution and the lab order lifecycle. Pure domain logic;
//! stores and HTTP live elsewhere.

pub mod order;
pub mod parameter;
pub mod reference;

pub use order::{
    LabOrder, LabOrderCommand, LabOrderError, LabOrderEvent, LabOrderId, LabOrderStatus,
    LabResult, LabServiceRef, LabServiceId, RadiologyImage,
};
pub use parameter::{Gender, LabParameter, LabParameterRange, NormalSpec, ParameterId};
pub use reference::{ResultFlag, age_in_days, classify, resolve};
