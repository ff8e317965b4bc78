use std::sync::{Arc, Mutex, MutexGuard};

use rusqlite::Connection;

use crate::auth::TokenService;
use crate::config::AppConfig;
use crate::errors::AppError;
use crate::services::email::Mailer;

pub struct AppState {
    pub db: Arc<Mutex<Connection>>,
    pub config: AppConfig,
    pub mailer: Mailer,
    pub tokens: TokenService,
}

impl AppState {
    pub fn db(&self) -> Result<MutexGuard<'_, Connection>, AppError> {
        self.db
            .lock()
            .map_err(|_| AppError::Internal(anyhow::anyhow!("database mutex poisoned")))
    }
}
