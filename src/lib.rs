pub mod auth;
pub mod clock;
pub mod config;
pub mod db;
pub mod error;
pub mod extract;
pub mod handlers;
pub mod models;
pub mod rest;
pub mod storage;

use std::sync::Arc;

use sqlx::SqlitePool;

use crate::{
    auth::{password::CredentialError, CredentialStore, TokenService},
    clock::Clock,
    config::Config,
    storage::UploadStore,
};

/// Shared by every handler. Cloning is cheap.
#[derive(Clone)]
pub struct AppState {
    pub db: SqlitePool,
    pub tokens: TokenService,
    pub credentials: CredentialStore,
    pub uploads: UploadStore,
    pub clock: Arc<dyn Clock>,
    pub config: Arc<Config>,
}

impl AppState {
    /// Wire the services up from `config`.
    ///
    /// # Errors
    ///
    /// Fails when the configured argon2 work factor is out of range.
    pub fn new(
        db: SqlitePool,
        config: Config,
        clock: Arc<dyn Clock>,
    ) -> Result<Self, CredentialError> {
        let tokens = TokenService::new(&config.token, clock.clone());
        let credentials = CredentialStore::new(config.hashing)?;
        let uploads = UploadStore::new(config.uploads_dir.clone());
        Ok(Self {
            db,
            tokens,
            credentials,
            uploads,
            clock,
            config: Arc::new(config),
        })
    }
}
