use std::sync::Arc;

use stxry_narrative::ContinuationGenerator;

use crate::config::ServerConfig;

/// Shared application state available to all Axum handlers via `State<AppState>`.
///
/// This is cheaply cloneable (inner data is behind `Arc` or is already `Clone`).
#[derive(Clone)]
pub struct AppState {
    /// Database connection pool.
    pub pool: stxry_db::DbPool,
    /// Server configuration.
    pub config: Arc<ServerConfig>,
    /// Continuation generator used by round resolution. Trait object so
    /// tests can substitute a canned generator.
    pub generator: Arc<dyn ContinuationGenerator>,
}
