//! Role -> permission grant table
//!
//! A role's effective permissions are exactly the permissions mapped to it:
//! no inheritance, no wildcard. Admin holds every permission because the
//! table lists every permission for it, not because of a superuser flag.
//!
//! The table is built once at startup ([`GrantTable::standard`] or
//! [`GrantTable::from_json_str`]) and is immutable afterwards. Share it with
//! `Arc<GrantTable>`.

use crate::permission::{Permission, UnknownPermission};
use crate::role::{Role, UnknownRole};
use std::collections::{BTreeMap, BTreeSet, HashMap};

/// Errors loading a grant table from configuration
#[derive(Debug, thiserror::Error)]
pub enum GrantTableError {
    #[error("grant table is not valid JSON: {0}")]
    Json(#[from] serde_json::Error),
    #[error(transparent)]
    UnknownRole(#[from] UnknownRole),
    #[error(transparent)]
    UnknownPermission(#[from] UnknownPermission),
}

/// Static mapping from role to its grant set
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct GrantTable {
    grants: BTreeMap<Role, BTreeSet<Permission>>,
}

impl GrantTable {
    /// Build a table from explicit grants. Roles absent from `grants` hold no
    /// permissions.
    pub fn new(grants: impl IntoIterator<Item = (Role, Vec<Permission>)>) -> Self {
        let mut table: BTreeMap<Role, BTreeSet<Permission>> =
            Role::ALL.iter().map(|role| (*role, BTreeSet::new())).collect();

        for (role, permissions) in grants {
            table.entry(role).or_default().extend(permissions);
        }

        GrantTable { grants: table }
    }

    /// The clinic's built-in grant table
    pub fn standard() -> Self {
        use Permission::*;

        GrantTable::new([
            (Role::Admin, Permission::ALL.to_vec()),
            (
                Role::Doctor,
                vec![
                    PatientCreate, PatientRead, PatientUpdate,
                    AppointmentCreate, AppointmentRead, AppointmentUpdate,
                    MedicalRecordCreate, MedicalRecordRead, MedicalRecordUpdate,
                    // View billing, not modify
                    BillingRead,
                ],
            ),
            (
                Role::Nurse,
                vec![
                    PatientRead, PatientUpdate,
                    AppointmentRead,
                    MedicalRecordRead, MedicalRecordUpdate,
                ],
            ),
            (
                Role::Receptionist,
                vec![
                    PatientCreate, PatientRead, PatientUpdate,
                    AppointmentCreate, AppointmentRead, AppointmentUpdate, AppointmentDelete,
                    BillingCreate, BillingRead, BillingUpdate,
                ],
            ),
            (
                Role::Accountant,
                vec![
                    PatientRead,
                    BillingCreate, BillingRead, BillingUpdate,
                    FinancialReports,
                ],
            ),
            (
                Role::Pharmacist,
                vec![
                    PatientRead,
                    // Prescriptions live in medical records
                    MedicalRecordRead,
                    // Pharmacy sales
                    BillingCreate, BillingRead,
                ],
            ),
            (
                Role::LabTechnician,
                vec![
                    PatientRead,
                    // Lab results
                    MedicalRecordRead, MedicalRecordUpdate,
                ],
            ),
        ])
    }

    /// Load a table from JSON: an object mapping role tokens to arrays of
    /// permission tokens, e.g. `{"nurse": ["patient:read"]}`.
    pub fn from_json_str(json: &str) -> Result<Self, GrantTableError> {
        let raw: HashMap<String, Vec<String>> = serde_json::from_str(json)?;

        let mut grants = Vec::with_capacity(raw.len());
        for (role, permissions) in raw {
            let role: Role = role.parse()?;
            let permissions = permissions
                .iter()
                .map(|p| p.parse::<Permission>())
                .collect::<Result<Vec<_>, _>>()?;
            grants.push((role, permissions));
        }

        Ok(GrantTable::new(grants))
    }

    /// Grant set for a role
    pub fn permissions_for(&self, role: Role) -> &BTreeSet<Permission> {
        // `new` seeds every role, so the entry always exists
        &self.grants[&role]
    }

    pub fn has_permission(&self, role: Role, permission: Permission) -> bool {
        self.permissions_for(role).contains(&permission)
    }

    /// Grant set intersects `required`
    pub fn has_any(&self, role: Role, required: &BTreeSet<Permission>) -> bool {
        !self.permissions_for(role).is_disjoint(required)
    }

    /// Grant set is a superset of `required`
    pub fn has_all(&self, role: Role, required: &BTreeSet<Permission>) -> bool {
        self.permissions_for(role).is_superset(required)
    }

    /// Permissions from `required` the role does not hold
    pub fn missing(&self, role: Role, required: &BTreeSet<Permission>) -> Vec<Permission> {
        required
            .difference(self.permissions_for(role))
            .copied()
            .collect()
    }

    /// Every role granted `permission`
    pub fn roles_with(&self, permission: Permission) -> Vec<Role> {
        self.grants
            .iter()
            .filter(|(_, permissions)| permissions.contains(&permission))
            .map(|(role, _)| *role)
            .collect()
    }
}

impl Default for GrantTable {
    fn default() -> Self {
        GrantTable::standard()
    }
}
