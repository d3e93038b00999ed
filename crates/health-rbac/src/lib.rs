//! MediFlow RBAC - Role-Based Access Control
//!
//! Coarse-grained, role-level authorization for every mutating and most read
//! operations:
//!
//! - [`Role`] and [`Permission`]: closed enumerations with stable wire tokens
//! - [`GrantTable`]: static role -> permission mapping, built once at startup
//! - [`AuthRequirement`]: by-role, by-permission, any-of and all-of checks as data
//! - [`Guard`]: evaluates a [`Caller`] against a requirement; inactive and
//!   locked accounts are always denied
//!
//! Ownership rules ("a doctor may only edit their own patients") are not
//! enforced here.
//!
//! # Example
//!
//! ```rust
//! use mediflow_rbac::{Caller, Guard, Permission, Role};
//!
//! let guard = Guard::default();
//! let doctor = Caller::new(7u64, Role::Doctor);
//!
//! assert!(guard.authorize_by_permission(&doctor, Permission::AppointmentCreate).is_ok());
//! assert!(guard.authorize_by_permission(&doctor, Permission::BillingDelete).is_err());
//! ```

pub mod caller;
pub mod error;
pub mod grants;
pub mod guard;
pub mod permission;
pub mod requirement;
pub mod role;

pub use caller::{Caller, UserId};
pub use error::{AuthError, Denial};
pub use grants::{GrantTable, GrantTableError};
pub use guard::{evaluate, Guard};
pub use permission::{Permission, UnknownPermission};
pub use requirement::AuthRequirement;
pub use role::{Role, UnknownRole};
