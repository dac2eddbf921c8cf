use std::sync::Arc;

use crate::config::ServerConfig;

/// Shared application state available to all Axum handlers via `State<AppState>`.
///
/// This is cheaply cloneable (inner data is behind `Arc` or is already `Clone`).
#[derive(Clone)]
pub struct AppState {
    /// Database connection pool.
    pub pool: nexusone_db::DbPool,
    /// Server configuration (JWT settings, vendor endpoints, CORS).
    pub config: Arc<ServerConfig>,
}

impl AppState {
    pub fn new(pool: nexusone_db::DbPool, config: ServerConfig) -> Self {
        Self {
            pool,
            config: Arc::new(config),
        }
    }
}
