//! User account and role model

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::{fmt, str::FromStr};
use uuid::Uuid;

use crate::error::BookingError;

/// Account role; exactly one at a time
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum Role {
    Admin,
    Customer,
    Worker,
}

impl Role {
    pub fn as_str(&self) -> &'static str {
        match self {
            Role::Admin => "ADMIN",
            Role::Customer => "CUSTOMER",
            Role::Worker => "WORKER",
        }
    }
}

impl fmt::Display for Role {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Role {
    type Err = BookingError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "ADMIN" => Ok(Role::Admin),
            "CUSTOMER" => Ok(Role::Customer),
            "WORKER" => Ok(Role::Worker),
            other => Err(BookingError::Validation(format!("unknown role: {}", other))),
        }
    }
}

/// The per-account role record layered on top of the identity service
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct UserAccount {
    pub id: Uuid,
    pub email: String,
    pub display_name: String,
    pub role: Role,
    /// Avatar; copied onto the worker profile when the account applies
    #[serde(default)]
    pub photo_url: Option<String>,
    pub created_at: DateTime<Utc>,
}

/// New account record; the store assigns `created_at`
#[derive(Debug, Clone, PartialEq)]
pub struct NewAccount {
    pub id: Uuid,
    pub email: String,
    pub display_name: String,
    pub role: Role,
}

/// What the identity service knows about a signed-in user
#[derive(Debug, Clone, PartialEq)]
pub struct IdentityProfile {
    pub id: Uuid,
    pub email: String,
    pub display_name: String,
}

/// Outcome of a role write
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RoleUpdate {
    pub previous: Role,
    /// Whether a worker profile existed and had its approval flag rewritten
    pub profile_synced: bool,
}
