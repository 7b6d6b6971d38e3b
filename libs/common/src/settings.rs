//! Application settings shared by the services
//!
//! Values come from `BEOLCHO__*` environment variables, with `__` separating
//! nested keys (`BEOLCHO__ADMIN__BOOTSTRAP_EMAIL` maps to
//! `admin.bootstrap_email`).

use config::{Config, ConfigError, Environment};
use serde::Deserialize;

/// Top-level settings
#[derive(Debug, Clone, Deserialize)]
pub struct Settings {
    /// Socket address the HTTP server binds to
    pub bind_address: String,
    #[serde(default)]
    pub admin: AdminSettings,
    pub uploads: UploadSettings,
}

/// Opt-in administrator seeding
#[derive(Debug, Clone, Default, Deserialize)]
pub struct AdminSettings {
    /// Accounts signing up with this email are created as administrators,
    /// and an existing account with it is promoted at service start.
    pub bootstrap_email: Option<String>,
}

/// Limits applied to photo uploads before anything is sent to the blob store
#[derive(Debug, Clone, Deserialize)]
pub struct UploadSettings {
    pub max_reservation_photos: usize,
    pub max_portfolio_photos: usize,
    pub max_photo_bytes: usize,
}

impl Settings {
    /// Load settings from the environment
    ///
    /// `default_bind` is used when `BEOLCHO__BIND_ADDRESS` is not set, so
    /// each service keeps its own default port.
    pub fn from_env(default_bind: &str) -> Result<Self, ConfigError> {
        Config::builder()
            .set_default("bind_address", default_bind)?
            .set_default("uploads.max_reservation_photos", 5_i64)?
            .set_default("uploads.max_portfolio_photos", 20_i64)?
            .set_default("uploads.max_photo_bytes", 10_i64 * 1024 * 1024)?
            .add_source(Environment::with_prefix("BEOLCHO").separator("__"))
            .build()?
            .try_deserialize()
    }
}
