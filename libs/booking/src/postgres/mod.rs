//! PostgreSQL implementation of the booking stores

mod chat;
mod directory;
mod reservations;

use sqlx::PgPool;
use tracing::info;

use crate::error::StoreResult;

/// All booking stores backed by one connection pool
#[derive(Clone)]
pub struct PgBookingStore {
    pool: PgPool,
}

impl PgBookingStore {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    pub fn pool(&self) -> &PgPool {
        &self.pool
    }

    /// Apply pending schema migrations
    pub async fn run_migrations(&self) -> StoreResult<()> {
        info!("Running database migrations");
        sqlx::migrate!("../../migrations").run(&self.pool).await?;
        Ok(())
    }
}
