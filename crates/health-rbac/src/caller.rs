//! The authenticated account making a request

use crate::role::{Role, UnknownRole};
use derive_more::{Display, From};
use serde::{Deserialize, Serialize};

/// Staff account identifier
#[derive(
    Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize, Display, From,
)]
pub struct UserId(pub u64);

/// Account attributes relevant to authorization.
///
/// `role` is kept as the raw stored token: an account may carry a token that
/// maps to no [`Role`], and that must be denied rather than fail to load.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Caller {
    pub id: UserId,
    pub role: String,
    pub is_active: bool,
    pub is_locked: bool,
}

impl Caller {
    /// An active, unlocked account holding `role`
    pub fn new(id: impl Into<UserId>, role: Role) -> Self {
        Caller {
            id: id.into(),
            role: role.as_str().to_string(),
            is_active: true,
            is_locked: false,
        }
    }

    /// An active, unlocked account with a raw role token
    pub fn with_role_token(id: impl Into<UserId>, role: &str) -> Self {
        Caller {
            id: id.into(),
            role: role.to_string(),
            is_active: true,
            is_locked: false,
        }
    }

    pub fn deactivated(mut self) -> Self {
        self.is_active = false;
        self
    }

    pub fn locked(mut self) -> Self {
        self.is_locked = true;
        self
    }

    pub fn parsed_role(&self) -> Result<Role, UnknownRole> {
        self.role.parse()
    }
}
