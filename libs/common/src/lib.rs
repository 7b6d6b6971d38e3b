//! Common library for the Beolcho services
//!
//! This crate provides the infrastructure shared by the `auth` and `api`
//! services: PostgreSQL pooling, the Redis cache, application settings,
//! tracing setup and access-token verification.

pub mod cache;
pub mod database;
pub mod error;
pub mod settings;
pub mod telemetry;
pub mod token;
