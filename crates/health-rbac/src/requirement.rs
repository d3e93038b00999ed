//! What an operation demands of its caller, as inspectable data

use crate::permission::{join_permissions, Permission};
use crate::role::{join_roles, Role};
use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;

/// Authorization requirement, evaluated by [`crate::Guard`]
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", content = "value", rename_all = "snake_case")]
pub enum AuthRequirement {
    /// Caller's role is one of these
    ByRole(BTreeSet<Role>),
    /// Caller's grant set contains this permission
    ByPermission(Permission),
    /// Caller's grant set intersects these permissions
    AnyOf(BTreeSet<Permission>),
    /// Caller's grant set contains every one of these permissions
    AllOf(BTreeSet<Permission>),
}

impl AuthRequirement {
    pub fn roles(roles: impl IntoIterator<Item = Role>) -> Self {
        AuthRequirement::ByRole(roles.into_iter().collect())
    }

    pub fn permission(permission: Permission) -> Self {
        AuthRequirement::ByPermission(permission)
    }

    pub fn any_of(permissions: impl IntoIterator<Item = Permission>) -> Self {
        AuthRequirement::AnyOf(permissions.into_iter().collect())
    }

    pub fn all_of(permissions: impl IntoIterator<Item = Permission>) -> Self {
        AuthRequirement::AllOf(permissions.into_iter().collect())
    }

    pub fn admin_only() -> Self {
        Self::roles([Role::Admin])
    }

    /// Doctors and nurses
    pub fn medical_staff() -> Self {
        Self::roles([Role::Doctor, Role::Nurse])
    }

    /// Accountants, receptionists and admins
    pub fn financial_staff() -> Self {
        Self::roles([Role::Accountant, Role::Receptionist, Role::Admin])
    }

    /// Admins and receptionists
    pub fn admin_staff() -> Self {
        Self::roles([Role::Admin, Role::Receptionist])
    }

    /// Roles that may book and reschedule appointments
    pub fn appointment_editors() -> Self {
        Self::roles([Role::Admin, Role::Doctor, Role::Receptionist])
    }

    /// Roles that may hard-delete appointments
    pub fn appointment_deleters() -> Self {
        Self::roles([Role::Admin, Role::Doctor])
    }
}

impl std::fmt::Display for AuthRequirement {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            AuthRequirement::ByRole(roles) => write!(f, "one of roles [{}]", join_roles(roles)),
            AuthRequirement::ByPermission(p) => write!(f, "permission {}", p),
            AuthRequirement::AnyOf(ps) => {
                write!(f, "any of permissions [{}]", join_permissions(ps))
            }
            AuthRequirement::AllOf(ps) => {
                write!(f, "all of permissions [{}]", join_permissions(ps))
            }
        }
    }
}
