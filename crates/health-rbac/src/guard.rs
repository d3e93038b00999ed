//! Authorization guard
//!
//! A stateless decision over (role, requirement, is_active, is_locked) and the
//! injected grant table. Evaluation order:
//!
//! 1. The role token must name a known [`Role`]
//! 2. The role/permission requirement must be met
//! 3. The account must be active
//! 4. The account must not be locked
//!
//! A caller must pass every step; the first failing step names the denial.

use crate::caller::Caller;
use crate::error::{AuthError, Denial};
use crate::grants::GrantTable;
use crate::permission::Permission;
use crate::requirement::AuthRequirement;
use crate::role::Role;
use std::collections::BTreeSet;
use std::sync::Arc;
use tracing::{debug, warn};

/// Pure authorization decision against a grant table
pub fn evaluate(
    grants: &GrantTable,
    caller: &Caller,
    requirement: &AuthRequirement,
) -> Result<(), Denial> {
    let role: Role = caller
        .parsed_role()
        .map_err(|unknown| Denial::UnknownRole { role: unknown.0 })?;

    match requirement {
        AuthRequirement::ByRole(allowed) => {
            if !allowed.contains(&role) {
                return Err(Denial::RoleNotAllowed {
                    allowed: allowed.iter().copied().collect(),
                    actual: role,
                });
            }
        }
        AuthRequirement::ByPermission(required) => {
            if !grants.has_permission(role, *required) {
                return Err(Denial::MissingPermission { required: *required, role });
            }
        }
        AuthRequirement::AnyOf(required) => {
            if !grants.has_any(role, required) {
                return Err(Denial::MissingAnyPermission {
                    required: required.iter().copied().collect(),
                    role,
                });
            }
        }
        AuthRequirement::AllOf(required) => {
            if !grants.has_all(role, required) {
                return Err(Denial::MissingAllPermissions {
                    required: required.iter().copied().collect(),
                    missing: grants.missing(role, required),
                    role,
                });
            }
        }
    }

    if !caller.is_active {
        return Err(Denial::AccountInactive);
    }
    if caller.is_locked {
        return Err(Denial::AccountLocked);
    }

    Ok(())
}

/// Composable guard invoked before handler logic runs
#[derive(Clone, Debug)]
pub struct Guard {
    grants: Arc<GrantTable>,
}

impl Guard {
    pub fn new(grants: Arc<GrantTable>) -> Self {
        Guard { grants }
    }

    pub fn grants(&self) -> &GrantTable {
        &self.grants
    }

    /// Evaluate any requirement. Returns the caller on success so guards
    /// compose in `?` chains.
    pub fn authorize<'c>(
        &self,
        caller: &'c Caller,
        requirement: &AuthRequirement,
    ) -> Result<&'c Caller, AuthError> {
        match evaluate(&self.grants, caller, requirement) {
            Ok(()) => {
                debug!(caller = %caller.id, %requirement, "authorized");
                Ok(caller)
            }
            Err(denial) => {
                warn!(
                    caller = %caller.id,
                    role = %caller.role,
                    %requirement,
                    ?denial,
                    "authorization denied"
                );
                Err(AuthError::PermissionDenied(denial))
            }
        }
    }

    pub fn authorize_by_role<'c>(
        &self,
        caller: &'c Caller,
        allowed_roles: &[Role],
    ) -> Result<&'c Caller, AuthError> {
        self.authorize(caller, &AuthRequirement::roles(allowed_roles.iter().copied()))
    }

    pub fn authorize_by_permission<'c>(
        &self,
        caller: &'c Caller,
        required: Permission,
    ) -> Result<&'c Caller, AuthError> {
        self.authorize(caller, &AuthRequirement::ByPermission(required))
    }

    pub fn authorize_by_any_permission<'c>(
        &self,
        caller: &'c Caller,
        required: &[Permission],
    ) -> Result<&'c Caller, AuthError> {
        let required: BTreeSet<Permission> = required.iter().copied().collect();
        self.authorize(caller, &AuthRequirement::AnyOf(required))
    }

    pub fn authorize_by_all_permissions<'c>(
        &self,
        caller: &'c Caller,
        required: &[Permission],
    ) -> Result<&'c Caller, AuthError> {
        let required: BTreeSet<Permission> = required.iter().copied().collect();
        self.authorize(caller, &AuthRequirement::AllOf(required))
    }
}

impl Default for Guard {
    fn default() -> Self {
        Guard::new(Arc::new(GrantTable::standard()))
    }
}
