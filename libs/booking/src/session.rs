//! Caller context passed to every booking operation

use serde::Serialize;
use uuid::Uuid;

use crate::{
    error::{BookingError, BookingResult},
    models::{Role, UserAccount},
};

/// The authenticated caller of an operation
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Session {
    pub account_id: Uuid,
    pub display_name: String,
    pub role: Role,
}

impl Session {
    pub fn new(account_id: Uuid, display_name: impl Into<String>, role: Role) -> Self {
        Self {
            account_id,
            display_name: display_name.into(),
            role,
        }
    }

    pub fn from_account(account: &UserAccount) -> Self {
        Self::new(account.id, account.display_name.clone(), account.role)
    }

    pub fn is_admin(&self) -> bool {
        self.role == Role::Admin
    }

    /// Fail with an authorization error unless the caller is an administrator
    pub fn require_admin(&self, action: &str) -> BookingResult<()> {
        if self.is_admin() {
            Ok(())
        } else {
            Err(BookingError::Authorization(format!(
                "{} requires an administrator",
                action
            )))
        }
    }

    /// Fail unless the caller owns `owner_id` or is an administrator
    pub fn require_owner_or_admin(&self, owner_id: Uuid, action: &str) -> BookingResult<()> {
        if self.account_id == owner_id || self.is_admin() {
            Ok(())
        } else {
            Err(BookingError::Authorization(format!(
                "{} is limited to the owner or an administrator",
                action
            )))
        }
    }
}
