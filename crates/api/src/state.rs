use std::sync::Arc;

use sources_db::hooks::SourceHooks;

use crate::config::ServerConfig;

/// Shared application state available to all Axum handlers via `State<AppState>`.
///
/// Cheaply cloneable: inner data is behind `Arc` or is already `Clone`.
#[derive(Clone)]
pub struct AppState {
    /// Database connection pool.
    pub pool: sources_db::DbPool,
    /// Server configuration.
    pub config: Arc<ServerConfig>,
    /// Hooks run by every source write.
    pub hooks: SourceHooks,
}
