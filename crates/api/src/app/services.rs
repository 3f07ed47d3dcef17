//! Infrastructure wiring + demo dataset.
//!
//! The stores are in-memory stand-ins for the external persistent store; the
//! seeded dataset uses fixed UUIDs so black-box tests and local exploration
//! can address it deterministically.

use std::sync::Arc;

use chrono::{Duration, Utc};
use uuid::Uuid;

use clinicore_auth::{Hs256TokenCodec, Permission, Role, RoleDefinition};
use clinicore_core::{AggregateId, BranchId, EmployeeId, PatientId, UserId};
use clinicore_infra::{
    EmployeeDirectory, EmployeeRecord, InMemoryOrderStore, ParameterCatalog, PatientRegistry,
    PatientSummary, UserDirectory, UserRecord,
};
use clinicore_lab::{
    Gender, LabParameter, LabParameterRange, LabServiceId, LabServiceRef, NormalSpec, ParameterId,
};

pub struct AppServices {
    pub orders: InMemoryOrderStore,
    pub patients: PatientRegistry,
    pub parameters: ParameterCatalog,
    pub employees: EmployeeDirectory,
    pub users: UserDirectory,
    pub codec: Arc<Hs256TokenCodec>,
}

// Deterministic demo identifiers.

pub fn demo_branch_main() -> BranchId {
    BranchId::from_uuid(Uuid::from_u128(0xB1))
}

pub fn demo_branch_west() -> BranchId {
    BranchId::from_uuid(Uuid::from_u128(0xB2))
}

pub fn demo_patient_adult_female() -> PatientId {
    PatientId::from_uuid(Uuid::from_u128(0xA1))
}

pub fn demo_patient_child_male() -> PatientId {
    PatientId::from_uuid(Uuid::from_u128(0xA2))
}

pub fn demo_parameter_hemoglobin() -> ParameterId {
    ParameterId::new(AggregateId::from_uuid(Uuid::from_u128(0xC1)))
}

pub fn demo_service_cbc() -> LabServiceRef {
    LabServiceRef {
        id: LabServiceId::new(AggregateId::from_uuid(Uuid::from_u128(0xD1))),
        name: "Complete Blood Count".to_string(),
        category: "Hematology".to_string(),
        price: 2500,
    }
}

pub const DEMO_PASSWORD: &str = "demo-password";

pub fn build_services(session_secret: &[u8]) -> AppServices {
    let services = AppServices {
        orders: InMemoryOrderStore::new(),
        patients: PatientRegistry::new(),
        parameters: ParameterCatalog::new(),
        employees: EmployeeDirectory::new(),
        users: UserDirectory::new(),
        codec: Arc::new(Hs256TokenCodec::new(session_secret)),
    };

    seed_demo_data(&services);
    services
}

fn seed_demo_data(services: &AppServices) {
    let now = Utc::now();

    services.patients.insert(PatientSummary {
        id: demo_patient_adult_female(),
        full_name: "Lina Farouk".to_string(),
        branch_id: demo_branch_main(),
        date_of_birth: now - Duration::days(10_950),
        gender: Gender::Female,
    });
    services.patients.insert(PatientSummary {
        id: demo_patient_child_male(),
        full_name: "Omar Said".to_string(),
        branch_id: demo_branch_west(),
        date_of_birth: now - Duration::days(4_000),
        gender: Gender::Male,
    });

    let hemoglobin = LabParameter::new(
        demo_parameter_hemoglobin(),
        "Hemoglobin",
        Some("g/dL".to_string()),
        vec![
            LabParameterRange {
                gender: Some(Gender::Female),
                age_min_days: 6_570,
                age_max_days: 25_550,
                normal: NormalSpec::Numeric { min: 12.0, max: 15.5 },
            },
            LabParameterRange {
                gender: None,
                age_min_days: 0,
                age_max_days: 36_500,
                normal: NormalSpec::Text("see physician".to_string()),
            },
        ],
    )
    .expect("demo parameter is well-formed");
    services
        .parameters
        .insert(hemoglobin)
        .expect("demo catalog is empty");

    let admin_id = UserId::from_uuid(Uuid::from_u128(0xE1));
    let tech_id = UserId::from_uuid(Uuid::from_u128(0xE2));
    let pathologist_id = UserId::from_uuid(Uuid::from_u128(0xE3));
    let accountant_id = UserId::from_uuid(Uuid::from_u128(0xE4));

    services.users.insert(UserRecord {
        user_id: admin_id,
        full_name: "System Administrator".to_string(),
        email: "admin@clinic.example".to_string(),
        password: DEMO_PASSWORD.to_string(),
        role: RoleDefinition::universal(Role::new("super_admin")),
    });
    services.users.insert(UserRecord {
        user_id: tech_id,
        full_name: "Amira Hassan".to_string(),
        email: "tech@clinic.example".to_string(),
        password: DEMO_PASSWORD.to_string(),
        role: RoleDefinition::new(
            Role::new("lab_technician"),
            vec![Permission::new("manage_lab"), Permission::new("view_patients")],
        ),
    });
    services.users.insert(UserRecord {
        user_id: pathologist_id,
        full_name: "Dr. Karim Nour".to_string(),
        email: "pathologist@clinic.example".to_string(),
        password: DEMO_PASSWORD.to_string(),
        role: RoleDefinition::new(
            Role::new("pathologist"),
            vec![
                Permission::new("manage_lab"),
                Permission::new("validate_lab_orders"),
            ],
        ),
    });
    services.users.insert(UserRecord {
        user_id: accountant_id,
        full_name: "Mona Adel".to_string(),
        email: "accountant@clinic.example".to_string(),
        password: DEMO_PASSWORD.to_string(),
        role: RoleDefinition::new(
            Role::new("accountant"),
            vec![Permission::new("view_financial_reports")],
        ),
    });

    // Only staff with employee records may validate orders.
    services.employees.insert(EmployeeRecord {
        employee_id: EmployeeId::from_uuid(Uuid::from_u128(0xF1)),
        user_id: pathologist_id,
        full_name: "Dr. Karim Nour".to_string(),
        branch_id: demo_branch_main(),
    });
    services.employees.insert(EmployeeRecord {
        employee_id: EmployeeId::from_uuid(Uuid::from_u128(0xF2)),
        user_id: tech_id,
        full_name: "Amira Hassan".to_string(),
        branch_id: demo_branch_main(),
    });
}
