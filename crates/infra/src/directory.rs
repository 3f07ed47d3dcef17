//! User and employee directories.
//!
//! Users authenticate; employees act clinically. Only an acting identity that
//! resolves to an employee record may validate a lab order.

use std::collections::HashMap;
use std::sync::Mutex;

use serde::{Deserialize, Serialize};

use clinicore_auth::RoleDefinition;
use clinicore_core::{BranchId, EmployeeId, UserId};

/// A login-capable user account and the role definition flattened into its
/// credential at issuance.
#[derive(Debug, Clone)]
pub struct UserRecord {
    pub user_id: UserId,
    pub full_name: String,
    pub email: String,
    pub password: String,
    pub role: RoleDefinition,
}

#[derive(Debug, Default)]
pub struct UserDirectory {
    by_email: Mutex<HashMap<String, UserRecord>>,
}

impl UserDirectory {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert(&self, user: UserRecord) {
        self.by_email
            .lock()
            .unwrap()
            .insert(user.email.clone(), user);
    }

    pub fn find_by_email(&self, email: &str) -> Option<UserRecord> {
        self.by_email.lock().unwrap().get(email).cloned()
    }
}

/// Employee record tied to a user account.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct EmployeeRecord {
    pub employee_id: EmployeeId,
    pub user_id: UserId,
    pub full_name: String,
    pub branch_id: BranchId,
}

#[derive(Debug, Default)]
pub struct EmployeeDirectory {
    by_user: Mutex<HashMap<UserId, EmployeeRecord>>,
}

impl EmployeeDirectory {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert(&self, employee: EmployeeRecord) {
        self.by_user
            .lock()
            .unwrap()
            .insert(employee.user_id, employee);
    }

    /// Resolve the employee acting behind a user account, if any.
    pub fn employee_for_user(&self, user_id: UserId) -> Option<EmployeeRecord> {
        self.by_user.lock().unwrap().get(&user_id).cloned()
    }
}
