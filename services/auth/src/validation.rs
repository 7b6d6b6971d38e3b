//! Sign-up input validation

use booking::validation::{validate_display_name, validate_email};

use crate::models::SignupRequest;

/// Validate password
pub fn validate_password(password: &str) -> Result<(), String> {
    if password.is_empty() {
        return Err("Password is required".to_string());
    }

    if password.chars().count() < 8 {
        return Err("Password must be at least 8 characters long".to_string());
    }

    if password.len() > 128 {
        return Err("Password must be at most 128 characters long".to_string());
    }

    let has_letter = password.chars().any(|c| c.is_alphabetic());
    let has_digit = password.chars().any(|c| c.is_ascii_digit());

    if !has_letter || !has_digit {
        return Err("Password must contain both letters and digits".to_string());
    }

    Ok(())
}

/// Validate a whole sign-up payload
pub fn validate_signup(request: &SignupRequest) -> Result<(), String> {
    validate_email(request.email.trim()).map_err(|e| e.to_string())?;
    validate_display_name(&request.display_name).map_err(|e| e.to_string())?;
    validate_password(&request.password)
}
