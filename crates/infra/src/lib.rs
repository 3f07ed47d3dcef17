//! `clinicore-infra` — in-memory stores standing in for the external
//! persistent-store collaborator.
//!
//! Persistence engine design is out of scope; these stores keep the same
//! contracts a database-backed implementation would honor, in particular the
//! atomic check-then-act on lab order transitions and the ascending-`age_min`
//! range ordering.

pub mod catalog;
pub mod directory;
pub mod order_store;
pub mod registry;

pub use catalog::ParameterCatalog;
pub use directory::{EmployeeDirectory, EmployeeRecord, UserDirectory, UserRecord};
pub use order_store::{InMemoryOrderStore, WorkbenchEntry};
pub use registry::{PatientRegistry, PatientSummary};
