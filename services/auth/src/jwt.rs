//! JWT service for token generation and validation
//!
//! Tokens are RS256-signed. Verification is shared with the api service
//! through [`common::token::TokenVerifier`]; only this service holds the
//! private key.

use anyhow::Result;
use booking::models::UserAccount;
use common::token::{Claims, TokenType, TokenVerifier, read_pem_from_env};
use jsonwebtoken::{Algorithm, EncodingKey, Header, encode};
use std::time::{SystemTime, UNIX_EPOCH};

/// JWT configuration
#[derive(Debug, Clone)]
pub struct JwtConfig {
    /// Private key for signing tokens
    pub private_key: String,
    /// Public key for verifying tokens
    pub public_key: String,
    /// Access token expiration time in seconds (default: 15 minutes)
    pub access_token_expiry: u64,
    /// Refresh token expiration time in seconds (default: 7 days)
    pub refresh_token_expiry: u64,
}

impl JwtConfig {
    /// Create a new JwtConfig from environment variables
    ///
    /// # Environment Variables
    /// - `JWT_PRIVATE_KEY`: PEM private key, or a path to one
    /// - `JWT_PUBLIC_KEY`: PEM public key, or a path to one
    /// - `JWT_ACCESS_TOKEN_EXPIRY`: Access token expiry in seconds (default: 900)
    /// - `JWT_REFRESH_TOKEN_EXPIRY`: Refresh token expiry in seconds (default: 604800)
    pub fn from_env() -> Result<Self> {
        let private_key = read_pem_from_env("JWT_PRIVATE_KEY")?;
        let public_key = read_pem_from_env("JWT_PUBLIC_KEY")?;

        let access_token_expiry = std::env::var("JWT_ACCESS_TOKEN_EXPIRY")
            .ok()
            .and_then(|s| s.parse().ok())
            .unwrap_or(900);

        let refresh_token_expiry = std::env::var("JWT_REFRESH_TOKEN_EXPIRY")
            .ok()
            .and_then(|s| s.parse().ok())
            .unwrap_or(604800);

        Ok(JwtConfig {
            private_key,
            public_key,
            access_token_expiry,
            refresh_token_expiry,
        })
    }
}

/// Current UNIX time in seconds
pub fn now_secs() -> Result<u64> {
    Ok(SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map_err(|e| anyhow::anyhow!("Failed to get current time: {}", e))?
        .as_secs())
}

/// Issues and checks account tokens
#[derive(Clone)]
pub struct JwtService {
    encoding_key: EncodingKey,
    verifier: TokenVerifier,
    config: JwtConfig,
}

impl JwtService {
    pub fn new(config: JwtConfig) -> Result<Self> {
        let encoding_key = EncodingKey::from_rsa_pem(config.private_key.as_bytes())?;
        let verifier = TokenVerifier::from_public_pem(&config.public_key)?;

        Ok(JwtService {
            encoding_key,
            verifier,
            config,
        })
    }

    fn sign(&self, account: &UserAccount, token_type: TokenType, ttl: u64) -> Result<String> {
        let now = now_secs()?;
        let claims = Claims {
            sub: account.id,
            email: account.email.clone(),
            role: account.role.to_string(),
            iat: now,
            exp: now + ttl,
            token_type,
        };

        Ok(encode(
            &Header::new(Algorithm::RS256),
            &claims,
            &self.encoding_key,
        )?)
    }

    pub fn generate_access_token(&self, account: &UserAccount) -> Result<String> {
        self.sign(account, TokenType::Access, self.config.access_token_expiry)
    }

    pub fn generate_refresh_token(&self, account: &UserAccount) -> Result<String> {
        self.sign(account, TokenType::Refresh, self.config.refresh_token_expiry)
    }

    /// Validate a refresh token and return its claims
    pub fn validate_refresh_token(&self, token: &str) -> Result<Claims> {
        Ok(self.verifier.validate_as(token, TokenType::Refresh)?)
    }

    pub fn access_token_expiry(&self) -> u64 {
        self.config.access_token_expiry
    }

    pub fn refresh_token_expiry(&self) -> u64 {
        self.config.refresh_token_expiry
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use booking::models::Role;
    use chrono::Utc;
    use serial_test::serial;
    use uuid::Uuid;

    const PRIVATE_PEM: &str = include_str!("../../../testdata/jwt_test_private.pem");
    const PUBLIC_PEM: &str = include_str!("../../../testdata/jwt_test_public.pem");

    fn service() -> JwtService {
        JwtService::new(JwtConfig {
            private_key: PRIVATE_PEM.to_string(),
            public_key: PUBLIC_PEM.to_string(),
            access_token_expiry: 900,
            refresh_token_expiry: 3600,
        })
        .unwrap()
    }

    fn account() -> UserAccount {
        UserAccount {
            id: Uuid::new_v4(),
            email: "kim@beolcho.kr".to_string(),
            display_name: "김고객".to_string(),
            role: Role::Customer,
            photo_url: None,
            created_at: Utc::now(),
        }
    }

    #[test]
    fn test_access_token_carries_account_claims() {
        let jwt = service();
        let account = account();
        let token = jwt.generate_access_token(&account).unwrap();

        let verifier = TokenVerifier::from_public_pem(PUBLIC_PEM).unwrap();
        let claims = verifier.validate_as(&token, TokenType::Access).unwrap();
        assert_eq!(claims.sub, account.id);
        assert_eq!(claims.role, "CUSTOMER");
        assert_eq!(claims.exp - claims.iat, 900);
    }

    #[test]
    fn test_access_token_is_not_a_refresh_token() {
        let jwt = service();
        let account = account();

        let access = jwt.generate_access_token(&account).unwrap();
        assert!(jwt.validate_refresh_token(&access).is_err());

        let refresh = jwt.generate_refresh_token(&account).unwrap();
        assert_eq!(jwt.validate_refresh_token(&refresh).unwrap().sub, account.id);
    }

    #[test]
    #[serial]
    fn test_jwt_config_from_env() {
        unsafe {
            std::env::set_var("JWT_PRIVATE_KEY", PRIVATE_PEM);
            std::env::set_var("JWT_PUBLIC_KEY", PUBLIC_PEM);
            std::env::set_var("JWT_ACCESS_TOKEN_EXPIRY", "60");
            std::env::remove_var("JWT_REFRESH_TOKEN_EXPIRY");
        }

        let config = JwtConfig::from_env().unwrap();
        assert_eq!(config.access_token_expiry, 60);
        assert_eq!(config.refresh_token_expiry, 604800);
        assert!(JwtService::new(config).is_ok());

        unsafe {
            std::env::remove_var("JWT_PRIVATE_KEY");
            std::env::remove_var("JWT_PUBLIC_KEY");
            std::env::remove_var("JWT_ACCESS_TOKEN_EXPIRY");
        }
    }
}
