use anyhow::Result;
use std::sync::Arc;
use tracing::info;

mod blob;
mod error;
mod middleware;
mod models;
mod routes;
mod state;

use booking::{account::AdminBootstrap, postgres::PgBookingStore, upload::UploadLimits};
use common::{
    database::{DatabaseConfig, health_check, init_pool},
    settings::Settings,
    telemetry::init_tracing,
    token::TokenVerifier,
};
use tokio::net::TcpListener;

use crate::{
    blob::{BlobConfig, S3BlobStore},
    state::{AppState, Backends},
};

#[tokio::main]
async fn main() -> Result<()> {
    init_tracing("api")?;
    info!("Starting API service");

    let settings = Settings::from_env("0.0.0.0:3001")?;

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

    let blobs = S3BlobStore::from_env(BlobConfig::from_env()).await?;
    let verifier = TokenVerifier::from_env()?;

    let limits = UploadLimits {
        max_reservation_photos: settings.uploads.max_reservation_photos,
        max_portfolio_photos: settings.uploads.max_portfolio_photos,
        max_photo_bytes: settings.uploads.max_photo_bytes,
    };

    let app_state = AppState::build(
        Backends {
            store: Arc::new(store),
            blobs: Arc::new(blobs),
            db_pool: Some(pool),
        },
        verifier,
        // accounts are provisioned and promoted by the auth service only
        AdminBootstrap::default(),
        limits,
    );

    info!("API service initialized successfully");

    let app = routes::create_router(app_state);

    let listener = TcpListener::bind(&settings.bind_address).await?;
    info!("API service listening on {}", settings.bind_address);

    axum::serve(listener, app).await?;

    Ok(())
}
