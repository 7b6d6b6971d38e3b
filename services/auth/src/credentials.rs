//! Credential repository for sign-up and sign-in

use anyhow::Result;
use argon2::{Argon2, PasswordHash, PasswordHasher, PasswordVerifier, password_hash::SaltString};
use sqlx::{PgPool, Row, postgres::PgRow};
use tracing::info;
use uuid::Uuid;

use crate::models::Credential;

/// Hash a password with Argon2 and a fresh salt
pub fn hash_password(password: &str) -> Result<String> {
    let salt = SaltString::generate(&mut rand::thread_rng());
    let hash = Argon2::default()
        .hash_password(password.as_bytes(), &salt)
        .map_err(|e| anyhow::anyhow!("Failed to hash password: {}", e))?
        .to_string();
    Ok(hash)
}

/// Check a password against a stored Argon2 hash
pub fn verify_password(password_hash: &str, password: &str) -> Result<bool> {
    let parsed_hash = PasswordHash::new(password_hash)
        .map_err(|e| anyhow::anyhow!("Failed to parse password hash: {}", e))?;

    Ok(Argon2::default()
        .verify_password(password.as_bytes(), &parsed_hash)
        .is_ok())
}

fn map_credential(row: &PgRow) -> Credential {
    Credential {
        id: row.get("id"),
        email: row.get("email"),
        display_name: row.get("display_name"),
        password_hash: row.get("password_hash"),
        created_at: row.get("created_at"),
    }
}

#[derive(Clone)]
pub struct CredentialRepository {
    pool: PgPool,
}

impl CredentialRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    /// Store a new credential; returns `None` when the email is already registered
    pub async fn create(
        &self,
        email: &str,
        display_name: &str,
        password: &str,
    ) -> Result<Option<Credential>> {
        info!("Creating credential for: {}", email);

        let password_hash = hash_password(password)?;

        let row = sqlx::query(
            r#"
            INSERT INTO credentials (email, display_name, password_hash)
            VALUES (lower($1), $2, $3)
            ON CONFLICT (email) DO NOTHING
            RETURNING id, email, display_name, password_hash, created_at
            "#,
        )
        .bind(email)
        .bind(display_name)
        .bind(&password_hash)
        .fetch_optional(&self.pool)
        .await?;

        Ok(row.as_ref().map(map_credential))
    }

    pub async fn find_by_email(&self, email: &str) -> Result<Option<Credential>> {
        info!("Finding credential by email: {}", email);

        let row = sqlx::query(
            r#"
            SELECT id, email, display_name, password_hash, created_at
            FROM credentials
            WHERE email = lower($1)
            "#,
        )
        .bind(email)
        .fetch_optional(&self.pool)
        .await?;

        Ok(row.as_ref().map(map_credential))
    }

    pub async fn find_by_id(&self, id: Uuid) -> Result<Option<Credential>> {
        info!("Finding credential by ID: {}", id);

        let row = sqlx::query(
            r#"
            SELECT id, email, display_name, password_hash, created_at
            FROM credentials
            WHERE id = $1
            "#,
        )
        .bind(id)
        .fetch_optional(&self.pool)
        .await?;

        Ok(row.as_ref().map(map_credential))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_password_hash_round_trip() {
        let hash = hash_password("beolcho2024!").unwrap();
        assert!(hash.starts_with("$argon2"));
        assert!(verify_password(&hash, "beolcho2024!").unwrap());
        assert!(!verify_password(&hash, "wrong-password").unwrap());
    }

    #[test]
    fn test_malformed_hash_is_an_error() {
        assert!(verify_password("not-a-hash", "anything").is_err());
    }
}
