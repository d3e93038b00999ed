//! Fine-grained capability tokens, scoped `resource:action`

use serde::{Deserialize, Serialize};
use std::str::FromStr;

/// Granular permission. Closed set.
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum Permission {
    // Patient management
    #[serde(rename = "patient:create")]
    PatientCreate,
    #[serde(rename = "patient:read")]
    PatientRead,
    #[serde(rename = "patient:update")]
    PatientUpdate,
    #[serde(rename = "patient:delete")]
    PatientDelete,

    // Appointment management
    #[serde(rename = "appointment:create")]
    AppointmentCreate,
    #[serde(rename = "appointment:read")]
    AppointmentRead,
    #[serde(rename = "appointment:update")]
    AppointmentUpdate,
    #[serde(rename = "appointment:delete")]
    AppointmentDelete,

    // Medical records
    #[serde(rename = "medical_record:create")]
    MedicalRecordCreate,
    #[serde(rename = "medical_record:read")]
    MedicalRecordRead,
    #[serde(rename = "medical_record:update")]
    MedicalRecordUpdate,
    #[serde(rename = "medical_record:delete")]
    MedicalRecordDelete,

    // Billing & financial
    #[serde(rename = "billing:create")]
    BillingCreate,
    #[serde(rename = "billing:read")]
    BillingRead,
    #[serde(rename = "billing:update")]
    BillingUpdate,
    #[serde(rename = "billing:delete")]
    BillingDelete,
    #[serde(rename = "financial:reports")]
    FinancialReports,

    // User management
    #[serde(rename = "user:create")]
    UserCreate,
    #[serde(rename = "user:read")]
    UserRead,
    #[serde(rename = "user:update")]
    UserUpdate,
    #[serde(rename = "user:delete")]
    UserDelete,

    // System administration
    #[serde(rename = "system:settings")]
    SystemSettings,
    #[serde(rename = "audit:read")]
    AuditLogRead,
    #[serde(rename = "backup:manage")]
    BackupManage,
}

impl Permission {
    pub const ALL: [Permission; 24] = [
        Permission::PatientCreate,
        Permission::PatientRead,
        Permission::PatientUpdate,
        Permission::PatientDelete,
        Permission::AppointmentCreate,
        Permission::AppointmentRead,
        Permission::AppointmentUpdate,
        Permission::AppointmentDelete,
        Permission::MedicalRecordCreate,
        Permission::MedicalRecordRead,
        Permission::MedicalRecordUpdate,
        Permission::MedicalRecordDelete,
        Permission::BillingCreate,
        Permission::BillingRead,
        Permission::BillingUpdate,
        Permission::BillingDelete,
        Permission::FinancialReports,
        Permission::UserCreate,
        Permission::UserRead,
        Permission::UserUpdate,
        Permission::UserDelete,
        Permission::SystemSettings,
        Permission::AuditLogRead,
        Permission::BackupManage,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            Permission::PatientCreate => "patient:create",
            Permission::PatientRead => "patient:read",
            Permission::PatientUpdate => "patient:update",
            Permission::PatientDelete => "patient:delete",
            Permission::AppointmentCreate => "appointment:create",
            Permission::AppointmentRead => "appointment:read",
            Permission::AppointmentUpdate => "appointment:update",
            Permission::AppointmentDelete => "appointment:delete",
            Permission::MedicalRecordCreate => "medical_record:create",
            Permission::MedicalRecordRead => "medical_record:read",
            Permission::MedicalRecordUpdate => "medical_record:update",
            Permission::MedicalRecordDelete => "medical_record:delete",
            Permission::BillingCreate => "billing:create",
            Permission::BillingRead => "billing:read",
            Permission::BillingUpdate => "billing:update",
            Permission::BillingDelete => "billing:delete",
            Permission::FinancialReports => "financial:reports",
            Permission::UserCreate => "user:create",
            Permission::UserRead => "user:read",
            Permission::UserUpdate => "user:update",
            Permission::UserDelete => "user:delete",
            Permission::SystemSettings => "system:settings",
            Permission::AuditLogRead => "audit:read",
            Permission::BackupManage => "backup:manage",
        }
    }

    /// Resource half of the token (`patient` in `patient:create`)
    pub fn resource(&self) -> &'static str {
        self.as_str().split(':').next().unwrap_or_default()
    }

    /// Action half of the token (`create` in `patient:create`)
    pub fn action(&self) -> &'static str {
        self.as_str().split(':').nth(1).unwrap_or_default()
    }
}

impl std::fmt::Display for Permission {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Clone, Debug, PartialEq, Eq, thiserror::Error)]
#[error("Invalid permission: {0}")]
pub struct UnknownPermission(pub String);

impl FromStr for Permission {
    type Err = UnknownPermission;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Permission::ALL
            .iter()
            .copied()
            .find(|p| p.as_str() == s)
            .ok_or_else(|| UnknownPermission(s.to_string()))
    }
}

pub(crate) fn join_permissions<'a>(
    permissions: impl IntoIterator<Item = &'a Permission>,
) -> String {
    permissions
        .into_iter()
        .map(Permission::as_str)
        .collect::<Vec<_>>()
        .join(", ")
}
