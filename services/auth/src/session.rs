//! Refresh-token sessions and revocation in Redis

use anyhow::Result;
use common::cache::RedisPool;
use tracing::info;
use uuid::Uuid;

fn session_key(account_id: Uuid) -> String {
    format!("session:{}", account_id)
}

fn revoked_key(token: &str) -> String {
    format!("revoked_token:{}", token)
}

/// One live refresh token per account; older ones are revoked on rotation
#[derive(Clone)]
pub struct SessionManager {
    redis_pool: RedisPool,
    session_ttl: u64,
}

impl SessionManager {
    pub fn new(redis_pool: RedisPool, session_ttl: u64) -> Self {
        Self {
            redis_pool,
            session_ttl,
        }
    }

    /// Record `refresh_token` as the account's current session
    pub async fn store(&self, account_id: Uuid, refresh_token: &str) -> Result<()> {
        info!("Storing session for account: {}", account_id);
        self.redis_pool
            .set(&session_key(account_id), refresh_token, Some(self.session_ttl))
            .await
    }

    /// Whether `refresh_token` is the account's current, unrevoked session
    pub async fn is_current(&self, account_id: Uuid, refresh_token: &str) -> Result<bool> {
        if self.redis_pool.exists(&revoked_key(refresh_token)).await? {
            return Ok(false);
        }
        let stored = self.redis_pool.get(&session_key(account_id)).await?;
        Ok(stored.as_deref() == Some(refresh_token))
    }

    /// Revoke a token for the rest of its lifetime
    pub async fn revoke(&self, refresh_token: &str, remaining_secs: u64) -> Result<()> {
        self.redis_pool
            .set(&revoked_key(refresh_token), "1", Some(remaining_secs))
            .await
    }

    pub async fn end(&self, account_id: Uuid) -> Result<()> {
        info!("Ending session for account: {}", account_id);
        self.redis_pool.delete(&session_key(account_id)).await
    }

    pub async fn health_check(&self) -> Result<bool> {
        self.redis_pool.health_check().await
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_key_layout() {
        let id = Uuid::nil();
        assert_eq!(
            session_key(id),
            "session:00000000-0000-0000-0000-000000000000"
        );
        assert_eq!(revoked_key("abc"), "revoked_token:abc");
    }
}
