//! Authorization denials

use crate::permission::{join_permissions, Permission};
use crate::role::{join_roles, Role};
use serde::{Deserialize, Serialize};

/// Why a caller was turned away. Every variant surfaces as the same
/// [`AuthError::PermissionDenied`] kind; the variant is kept for logs and tests.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize, thiserror::Error)]
#[serde(tag = "reason", rename_all = "snake_case")]
pub enum Denial {
    #[error("Invalid role: {role}")]
    UnknownRole { role: String },

    #[error(
        "This action requires one of these roles: {}. Your role: {actual}",
        join_roles(.allowed)
    )]
    RoleNotAllowed { allowed: Vec<Role>, actual: Role },

    #[error(
        "This action requires permission: {required}. \
         Your role ({role}) doesn't have this permission."
    )]
    MissingPermission { required: Permission, role: Role },

    #[error("This action requires one of these permissions: {}", join_permissions(.required))]
    MissingAnyPermission { required: Vec<Permission>, role: Role },

    #[error(
        "This action requires ALL of these permissions: {}. Missing: {}",
        join_permissions(.required),
        join_permissions(.missing)
    )]
    MissingAllPermissions {
        required: Vec<Permission>,
        missing: Vec<Permission>,
        role: Role,
    },

    #[error("Your account is inactive. Please contact administrator.")]
    AccountInactive,

    #[error("Your account is locked. Please contact administrator.")]
    AccountLocked,
}

impl Denial {
    /// Denied because of the account's state rather than its role/permissions
    pub fn is_account_state(&self) -> bool {
        matches!(self, Denial::AccountInactive | Denial::AccountLocked)
    }
}

/// Authorization failure. Terminal for the request, never retried.
#[derive(Clone, Debug, PartialEq, Eq, thiserror::Error)]
pub enum AuthError {
    #[error("Permission denied: {0}")]
    PermissionDenied(Denial),
}

impl AuthError {
    pub fn denial(&self) -> &Denial {
        match self {
            AuthError::PermissionDenied(denial) => denial,
        }
    }

    /// HTTP-equivalent status for route layers
    pub fn status_code(&self) -> u16 {
        403
    }
}

impl From<Denial> for AuthError {
    fn from(denial: Denial) -> Self {
        AuthError::PermissionDenied(denial)
    }
}
