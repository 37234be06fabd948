use axum::{
    Json, Router,
    extract::{OriginalUri, Query, State},
    http::StatusCode,
    response::IntoResponse,
    routing::get,
};
use axum_helpers::{
    UuidPath, ValidatedJson,
    errors::handlers::method_not_allowed,
    errors::responses::{
        BadRequestUuidResponse, BadRequestValidationResponse, ConflictResponse,
        ForbiddenResponse, InternalServerErrorResponse, NotFoundResponse, UnauthorizedResponse,
    },
};
use std::sync::Arc;
use utoipa::OpenApi;

use crate::error::UserResult;
use crate::models::{CreateUser, UpdateUser, UserResponse};
use crate::pagination::{ListResponse, PageLinks, PageMeta, PageRequest};
use crate::password::PasswordHasher;
use crate::policy::{Actor, UserPolicy};
use crate::repository::UserRepository;
use crate::service::UserService;

pub const TAG: &str = "users";

/// OpenAPI documentation for the Users API
#[derive(OpenApi)]
#[openapi(
    paths(list_users, create_user, get_user, update_user, patch_user, delete_user),
    components(
        schemas(UserResponse, CreateUser, UpdateUser, PageLinks, PageMeta),
        responses(
            NotFoundResponse,
            BadRequestValidationResponse,
            BadRequestUuidResponse,
            UnauthorizedResponse,
            ForbiddenResponse,
            ConflictResponse,
            InternalServerErrorResponse
        )
    ),
    tags(
        (name = TAG, description = "User management endpoints")
    )
)]
pub struct ApiDoc;

type SharedService<R, H, P> = Arc<UserService<R, H, P>>;

/// Create the user router with all HTTP endpoints.
///
/// Handlers expect `JwtClaims` in request extensions; the host applies
/// `jwt_auth_middleware` around this router.
pub fn router<R, H, P>(service: UserService<R, H, P>) -> Router
where
    R: UserRepository + 'static,
    H: PasswordHasher + 'static,
    P: UserPolicy + 'static,
{
    let shared_service = Arc::new(service);

    Router::new()
        .route("/", get(list_users).post(create_user))
        .route(
            "/{id}",
            get(get_user)
                .put(update_user)
                .patch(patch_user)
                .delete(delete_user),
        )
        .method_not_allowed_fallback(method_not_allowed)
        .with_state(shared_service)
}

/// List users, filtered by whitelisted query parameters
///
/// Unknown parameters are ignored. `page` and `per_page` control paging and
/// are kept in the returned links along with every filter.
#[utoipa::path(
    get,
    path = "",
    tag = TAG,
    params(
        ("name" = Option<String>, Query, description = "Exact name"),
        ("email" = Option<String>, Query, description = "Email, case-insensitive"),
        ("emailverifiedat" = Option<String>, Query, description = "Email verification time (RFC 3339)"),
        ("twofactorconfirmedat" = Option<String>, Query, description = "Two-factor confirmation time (RFC 3339)"),
        ("currentteamid" = Option<i64>, Query, description = "Current team id"),
        ("profilephotopath" = Option<String>, Query, description = "Profile photo path"),
        ("fbid" = Option<String>, Query, description = "Facebook id"),
        ("profilephotourl" = Option<String>, Query, description = "Profile photo URL"),
        PageRequest
    ),
    responses(
        (status = 200, description = "Paginated list of users", body = ListResponse<UserResponse>),
        (status = 400, response = BadRequestValidationResponse),
        (status = 401, response = UnauthorizedResponse),
        (status = 403, response = ForbiddenResponse),
        (status = 500, response = InternalServerErrorResponse)
    )
)]
async fn list_users<R, H, P>(
    State(service): State<SharedService<R, H, P>>,
    actor: Actor,
    OriginalUri(uri): OriginalUri,
    Query(params): Query<Vec<(String, String)>>,
) -> UserResult<Json<ListResponse<UserResponse>>>
where
    R: UserRepository,
    H: PasswordHasher,
    P: UserPolicy,
{
    let page_request = PageRequest::from_params(&params);
    let page = service.list_users(&actor, &params, page_request).await?;

    Ok(Json(ListResponse::from_page(page, uri.path(), &params)))
}

/// Create a new user
#[utoipa::path(
    post,
    path = "",
    tag = TAG,
    request_body = CreateUser,
    responses(
        (status = 201, description = "User created successfully", body = UserResponse),
        (status = 400, response = BadRequestValidationResponse),
        (status = 401, response = UnauthorizedResponse),
        (status = 403, response = ForbiddenResponse),
        (status = 409, response = ConflictResponse),
        (status = 500, response = InternalServerErrorResponse)
    )
)]
async fn create_user<R, H, P>(
    State(service): State<SharedService<R, H, P>>,
    actor: Actor,
    ValidatedJson(input): ValidatedJson<CreateUser>,
) -> UserResult<impl IntoResponse>
where
    R: UserRepository,
    H: PasswordHasher,
    P: UserPolicy,
{
    let user = service.create_user(&actor, input).await?;
    Ok((StatusCode::CREATED, Json(user)))
}

/// Get a user by ID
#[utoipa::path(
    get,
    path = "/{id}",
    tag = TAG,
    params(
        ("id" = Uuid, Path, description = "User ID")
    ),
    responses(
        (status = 200, description = "User found", body = UserResponse),
        (status = 400, response = BadRequestUuidResponse),
        (status = 401, response = UnauthorizedResponse),
        (status = 403, response = ForbiddenResponse),
        (status = 404, response = NotFoundResponse),
        (status = 500, response = InternalServerErrorResponse)
    )
)]
async fn get_user<R, H, P>(
    State(service): State<SharedService<R, H, P>>,
    actor: Actor,
    UuidPath(id): UuidPath,
) -> UserResult<Json<UserResponse>>
where
    R: UserRepository,
    H: PasswordHasher,
    P: UserPolicy,
{
    let user = service.get_user(&actor, id).await?;
    Ok(Json(user))
}

/// Update a user
#[utoipa::path(
    put,
    path = "/{id}",
    tag = TAG,
    params(
        ("id" = Uuid, Path, description = "User ID")
    ),
    request_body = UpdateUser,
    responses(
        (status = 200, description = "User updated successfully", body = UserResponse),
        (status = 400, response = BadRequestValidationResponse),
        (status = 401, response = UnauthorizedResponse),
        (status = 403, response = ForbiddenResponse),
        (status = 404, response = NotFoundResponse),
        (status = 409, response = ConflictResponse),
        (status = 500, response = InternalServerErrorResponse)
    )
)]
async fn update_user<R, H, P>(
    State(service): State<SharedService<R, H, P>>,
    actor: Actor,
    UuidPath(id): UuidPath,
    ValidatedJson(input): ValidatedJson<UpdateUser>,
) -> UserResult<Json<UserResponse>>
where
    R: UserRepository,
    H: PasswordHasher,
    P: UserPolicy,
{
    let user = service.update_user(&actor, id, input).await?;
    Ok(Json(user))
}

/// Partially update a user
///
/// Same semantics as PUT: absent fields are left unchanged.
#[utoipa::path(
    patch,
    path = "/{id}",
    tag = TAG,
    params(
        ("id" = Uuid, Path, description = "User ID")
    ),
    request_body = UpdateUser,
    responses(
        (status = 200, description = "User updated successfully", body = UserResponse),
        (status = 400, response = BadRequestValidationResponse),
        (status = 401, response = UnauthorizedResponse),
        (status = 403, response = ForbiddenResponse),
        (status = 404, response = NotFoundResponse),
        (status = 409, response = ConflictResponse),
        (status = 500, response = InternalServerErrorResponse)
    )
)]
async fn patch_user<R, H, P>(
    state: State<SharedService<R, H, P>>,
    actor: Actor,
    id: UuidPath,
    input: ValidatedJson<UpdateUser>,
) -> UserResult<Json<UserResponse>>
where
    R: UserRepository,
    H: PasswordHasher,
    P: UserPolicy,
{
    update_user(state, actor, id, input).await
}

/// Delete a user
#[utoipa::path(
    delete,
    path = "/{id}",
    tag = TAG,
    params(
        ("id" = Uuid, Path, description = "User ID")
    ),
    responses(
        (status = 204, description = "User deleted successfully"),
        (status = 400, response = BadRequestUuidResponse),
        (status = 401, response = UnauthorizedResponse),
        (status = 403, response = ForbiddenResponse),
        (status = 404, response = NotFoundResponse),
        (status = 500, response = InternalServerErrorResponse)
    )
)]
async fn delete_user<R, H, P>(
    State(service): State<SharedService<R, H, P>>,
    actor: Actor,
    UuidPath(id): UuidPath,
) -> UserResult<impl IntoResponse>
where
    R: UserRepository,
    H: PasswordHasher,
    P: UserPolicy,
{
    service.delete_user(&actor, id).await?;
    Ok(StatusCode::NO_CONTENT)
}
