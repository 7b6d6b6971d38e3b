//! Credential model and auth request payloads

use booking::models::IdentityProfile;
use chrono::{DateTime, Utc};
use serde::Deserialize;
use uuid::Uuid;

/// Stored sign-in identity
#[derive(Debug, Clone)]
pub struct Credential {
    pub id: Uuid,
    pub email: String,
    pub display_name: String,
    pub password_hash: String,
    pub created_at: DateTime<Utc>,
}

impl Credential {
    pub fn identity(&self) -> IdentityProfile {
        IdentityProfile {
            id: self.id,
            email: self.email.clone(),
            display_name: self.display_name.clone(),
        }
    }
}

/// Sign-up payload
#[derive(Debug, Clone, Deserialize)]
pub struct SignupRequest {
    pub email: String,
    pub password: String,
    pub display_name: String,
}

/// Sign-in payload
#[derive(Debug, Clone, Deserialize)]
pub struct LoginRequest {
    pub email: String,
    pub password: String,
}
