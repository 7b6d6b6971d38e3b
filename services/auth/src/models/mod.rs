//! Authentication service models

pub mod credential;

pub use credential::{Credential, LoginRequest, SignupRequest};
