//! Application state shared across handlers

use std::sync::Arc;

use booking::{
    account::{AccountService, AdminBootstrap},
    chat::ChatService,
    feed::ChangeFeed,
    reservation::ReservationService,
    store::{BlobStore, ChatStore, DirectoryStore, ReservationStore},
    upload::{PhotoUploader, UploadLimits},
    worker::WorkerService,
};
use common::token::TokenVerifier;
use sqlx::PgPool;

/// Application state shared across handlers
#[derive(Clone)]
pub struct AppState {
    /// Present when backed by PostgreSQL; reported by the health check
    pub db_pool: Option<PgPool>,
    pub verifier: TokenVerifier,
    pub feed: ChangeFeed,
    pub accounts: AccountService,
    pub reservations: ReservationService,
    pub workers: WorkerService,
    pub chat: ChatService,
}

/// Store backends the services are built on
pub struct Backends<S> {
    pub store: Arc<S>,
    pub blobs: Arc<dyn BlobStore>,
    pub db_pool: Option<PgPool>,
}

impl AppState {
    /// Wire every booking service onto one store and one change feed
    ///
    /// `bootstrap` only matters to callers that provision accounts through
    /// [`AccountService::ensure_account`]; the API binary passes an empty one.
    pub fn build<S>(
        backends: Backends<S>,
        verifier: TokenVerifier,
        bootstrap: AdminBootstrap,
        limits: UploadLimits,
    ) -> Self
    where
        S: ReservationStore + DirectoryStore + ChatStore + 'static,
    {
        let feed = ChangeFeed::default();
        let uploader = PhotoUploader::new(backends.blobs, limits);
        let store = backends.store;

        Self {
            db_pool: backends.db_pool,
            verifier,
            accounts: AccountService::new(store.clone(), bootstrap, feed.clone()),
            reservations: ReservationService::new(store.clone(), uploader.clone(), feed.clone()),
            workers: WorkerService::new(store.clone(), uploader, feed.clone()),
            chat: ChatService::new(store, feed.clone()),
            feed,
        }
    }
}
