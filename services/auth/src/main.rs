use anyhow::Result;
use std::sync::Arc;
use tracing::info;

mod credentials;
mod jwt;
mod models;
mod routes;
mod session;
mod validation;

use booking::{
    account::{AccountService, AdminBootstrap},
    feed::ChangeFeed,
    postgres::PgBookingStore,
};
use common::{
    cache::{RedisConfig, RedisPool},
    database::{DatabaseConfig, health_check, init_pool},
    settings::Settings,
    telemetry::init_tracing,
};
use sqlx::PgPool;
use tokio::net::TcpListener;

use crate::{
    credentials::CredentialRepository,
    jwt::{JwtConfig, JwtService},
    session::SessionManager,
};

/// Application state shared across handlers
#[derive(Clone)]
pub struct AppState {
    pub db_pool: PgPool,
    pub jwt_service: JwtService,
    pub sessions: SessionManager,
    pub credentials: CredentialRepository,
    pub accounts: AccountService,
}

#[tokio::main]
async fn main() -> Result<()> {
    init_tracing("auth")?;
    info!("Starting authentication service");

    let settings = Settings::from_env("0.0.0.0:3000")?;

    // Initialize database connection pool
    let db_config = DatabaseConfig::from_env()?;
    let pool = init_pool(&db_config).await?;

    if health_check(&pool).await? {
        info!("Database connection successful");
    } else {
        anyhow::bail!("Failed to connect to database");
    }

    let store = PgBookingStore::new(pool.clone());
    store.run_migrations().await?;

    let jwt_service = JwtService::new(JwtConfig::from_env()?)?;

    let redis_config = RedisConfig::from_env()?;
    let redis_pool = RedisPool::new(&redis_config).await?;
    let sessions = SessionManager::new(redis_pool, jwt_service.refresh_token_expiry());

    let accounts = AccountService::new(
        Arc::new(store),
        AdminBootstrap::new(settings.admin.bootstrap_email.clone()),
        ChangeFeed::default(),
    );
    if let Some(admin) = accounts.seed_admin().await? {
        info!("Bootstrap admin account: {}", admin.id);
    }

    let app_state = AppState {
        credentials: CredentialRepository::new(pool.clone()),
        db_pool: pool,
        jwt_service,
        sessions,
        accounts,
    };

    info!("Authentication service initialized successfully");

    let app = routes::create_router(app_state);

    let listener = TcpListener::bind(&settings.bind_address).await?;
    info!("Authentication service listening on {}", settings.bind_address);

    axum::serve(listener, app).await?;

    Ok(())
}
