//! Access-token claims and verification
//!
//! Tokens are RS256 JWTs minted by the auth service. The api service only
//! holds the public key, so verification lives here where both can reach it.

use jsonwebtoken::{Algorithm, DecodingKey, Validation, decode};
use serde::{Deserialize, Serialize};
use std::env;
use uuid::Uuid;

use crate::error::TokenError;

/// JWT claims structure
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Claims {
    /// Account ID
    pub sub: Uuid,
    /// Account email at issue time
    pub email: String,
    /// Role at issue time; the api service re-reads the stored role
    pub role: String,
    /// Issued at time
    pub iat: u64,
    /// Expiration time
    pub exp: u64,
    /// Token type (access or refresh)
    pub token_type: TokenType,
}

/// Token type enum
#[derive(Debug, Serialize, Deserialize, Clone, Copy, PartialEq, Eq)]
pub enum TokenType {
    /// Access token
    Access,
    /// Refresh token
    Refresh,
}

/// Read a PEM key from an environment variable
///
/// The variable holds either the PEM text itself or a path to a PEM file.
pub fn read_pem_from_env(var: &str) -> Result<String, TokenError> {
    let value =
        env::var(var).map_err(|_| TokenError::Key(format!("{} environment variable not set", var)))?;

    if value.starts_with("-----BEGIN") {
        return Ok(value);
    }

    std::fs::read_to_string(&value)
        .map(|pem| pem.trim().to_string())
        .map_err(|e| TokenError::Key(format!("Failed to read key file {}: {}", value, e)))
}

/// Verifies RS256 tokens against the auth service's public key
#[derive(Clone)]
pub struct TokenVerifier {
    decoding_key: DecodingKey,
    validation: Validation,
}

impl TokenVerifier {
    /// Build a verifier from a PEM-encoded RSA public key
    pub fn from_public_pem(public_key: &str) -> Result<Self, TokenError> {
        let decoding_key = DecodingKey::from_rsa_pem(public_key.as_bytes())?;
        let mut validation = Validation::new(Algorithm::RS256);
        validation.validate_exp = true;

        Ok(Self {
            decoding_key,
            validation,
        })
    }

    /// Build a verifier from `JWT_PUBLIC_KEY`
    pub fn from_env() -> Result<Self, TokenError> {
        let public_key = read_pem_from_env("JWT_PUBLIC_KEY")?;
        Self::from_public_pem(&public_key)
    }

    /// Validate a token of any type and return its claims
    pub fn validate(&self, token: &str) -> Result<Claims, TokenError> {
        let token_data = decode::<Claims>(token, &self.decoding_key, &self.validation)?;
        Ok(token_data.claims)
    }

    /// Validate a token and require it to be of the given type
    pub fn validate_as(&self, token: &str, expected: TokenType) -> Result<Claims, TokenError> {
        let claims = self.validate(token)?;
        if claims.token_type != expected {
            return Err(TokenError::WrongType);
        }
        Ok(claims)
    }
}
