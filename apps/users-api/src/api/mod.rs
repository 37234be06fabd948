use axum::Router;

pub mod health;
pub mod users;

/// Primary mount point of the users resource
pub const USERS_PATH: &str = "/v1/users";

/// Older clients call the same resource here
pub const USERS_ALIAS_PATH: &str = "/v1/apiusers";

/// Creates the API routes without the `/api` prefix.
/// The `/api` prefix will be added by the `create_router` helper.
pub fn routes(state: &crate::state::AppState) -> Router {
    Router::new()
        .nest(USERS_PATH, users::router(state))
        .nest(USERS_ALIAS_PATH, users::router(state))
}

/// Creates a router with the /ready endpoint that performs actual health checks.
///
/// This router has state applied and can be merged with the stateless app router
/// from `create_router`.
pub fn ready_router(state: crate::state::AppState) -> Router {
    use axum::routing::get;

    Router::new()
        .route("/ready", get(health::ready_handler))
        .with_state(state)
}
