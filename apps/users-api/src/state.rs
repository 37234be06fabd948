//! Shared application state.

use axum_helpers::JwtAuth;

/// Cloned into every router builder; all fields are cheap handle clones.
#[derive(Clone)]
pub struct AppState {
    pub config: crate::config::Config,
    /// PostgreSQL connection pool
    pub db: database::postgres::DatabaseConnection,
    /// Verifies bearer tokens on protected routes
    pub jwt_auth: JwtAuth,
}
