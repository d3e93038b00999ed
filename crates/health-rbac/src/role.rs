//! Staff roles

use serde::{Deserialize, Serialize};
use std::str::FromStr;

/// Staff role. Fixed, closed set.
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Role {
    /// Full system access
    Admin,
    /// Medical records, appointments, prescriptions
    Doctor,
    /// Patient care, vital signs
    Nurse,
    /// Appointments, patient registration, billing
    Receptionist,
    /// Financial reports, billing, payments
    Accountant,
    /// Pharmacy inventory, dispensing
    Pharmacist,
    /// Laboratory tests and results
    LabTechnician,
}

impl Role {
    pub const ALL: [Role; 7] = [
        Role::Admin,
        Role::Doctor,
        Role::Nurse,
        Role::Receptionist,
        Role::Accountant,
        Role::Pharmacist,
        Role::LabTechnician,
    ];

    /// Wire token, as stored on the account record
    pub fn as_str(&self) -> &'static str {
        match self {
            Role::Admin => "admin",
            Role::Doctor => "doctor",
            Role::Nurse => "nurse",
            Role::Receptionist => "receptionist",
            Role::Accountant => "accountant",
            Role::Pharmacist => "pharmacist",
            Role::LabTechnician => "lab_technician",
        }
    }
}

impl std::fmt::Display for Role {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A role token that matches no [`Role`]
#[derive(Clone, Debug, PartialEq, Eq, thiserror::Error)]
#[error("Invalid role: {0}")]
pub struct UnknownRole(pub String);

impl FromStr for Role {
    type Err = UnknownRole;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Role::ALL
            .iter()
            .copied()
            .find(|role| role.as_str() == s)
            .ok_or_else(|| UnknownRole(s.to_string()))
    }
}

/// Join role tokens for human-readable messages
pub(crate) fn join_roles<'a>(roles: impl IntoIterator<Item = &'a Role>) -> String {
    roles
        .into_iter()
        .map(Role::as_str)
        .collect::<Vec<_>>()
        .join(", ")
}
