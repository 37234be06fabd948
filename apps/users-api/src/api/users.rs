use axum::{Router, middleware};
use axum_helpers::{JwtAuth, jwt_auth_middleware};
use domain_users::{Argon2Hasher, PostgresUserRepository, RolePolicy, UserService, handlers};

pub fn router(state: &crate::state::AppState) -> Router {
    let repository = PostgresUserRepository::new(state.db.clone());
    let service = UserService::new(repository, Argon2Hasher, RolePolicy);
    protect(handlers::router(service), state.jwt_auth.clone())
}

/// Require a valid bearer token on every route of `router`.
pub fn protect(router: Router, auth: JwtAuth) -> Router {
    router.layer(middleware::from_fn_with_state(auth, jwt_auth_middleware))
}
