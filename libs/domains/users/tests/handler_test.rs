//! Handler tests for the Users domain
//!
//! These exercise the domain router alone against the in-memory repository:
//! - query-string filters and pagination envelope
//! - request validation and status codes
//! - policy decisions surfaced as 401/403
//!
//! Claims are injected as a request extension, standing in for the JWT
//! middleware the host application applies.

use axum::body::Body;
use axum::http::{Request, StatusCode};
use axum_helpers::JwtClaims;
use domain_users::*;
use http_body_util::BodyExt;
use serde_json::{Value, json};
use test_utils::TestDataBuilder;
use tower::ServiceExt; // For oneshot()
use uuid::Uuid;

async fn json_body<T: serde::de::DeserializeOwned>(body: Body) -> T {
    let bytes = body.collect().await.unwrap().to_bytes();
    serde_json::from_slice(&bytes).unwrap()
}

fn claims(id: Uuid, admin: bool) -> JwtClaims {
    JwtClaims {
        sub: id.to_string(),
        email: format!("{}@example.test", id),
        name: "Caller".to_string(),
        roles: if admin { vec!["admin".to_string()] } else { vec![] },
        exp: i64::MAX,
        iat: 0,
        jti: Uuid::new_v4().to_string(),
    }
}

fn app(repo: InMemoryUserRepository) -> axum::Router {
    handlers::router(UserService::new(repo, Argon2Hasher, RolePolicy))
}

fn request(method: &str, uri: &str, caller: Option<JwtClaims>, body: Option<Value>) -> Request<Body> {
    let mut builder = Request::builder().method(method).uri(uri);

    if let Some(claims) = caller {
        builder = builder.extension(claims);
    }

    match body {
        Some(json) => builder
            .header("content-type", "application/json")
            .body(Body::from(json.to_string()))
            .unwrap(),
        None => builder.body(Body::empty()).unwrap(),
    }
}

/// Later seeds are newer, so listings return them first.
async fn seed(repo: &InMemoryUserRepository, name: &str, email: &str, team: Option<i64>) -> User {
    let mut user = User::new(name.to_string(), email.to_string(), "hash".to_string());
    user.current_team_id = team;
    user.created_at = chrono::Utc::now() + chrono::Duration::seconds(repo_len(repo).await);
    repo.create(user).await.unwrap()
}

async fn repo_len(repo: &InMemoryUserRepository) -> i64 {
    repo.query(vec![], PageRequest::default())
        .await
        .unwrap()
        .total as i64
}

#[tokio::test]
async fn test_list_filters_and_paginates() {
    let repo = InMemoryUserRepository::new();
    seed(&repo, "Ann", "ann@example.com", Some(1)).await;
    seed(&repo, "Bob", "bob@example.com", Some(1)).await;
    seed(&repo, "Cy", "cy@example.com", Some(2)).await;

    let response = app(repo)
        .oneshot(request(
            "GET",
            "/?currentteamid=1&per_page=1",
            Some(claims(Uuid::now_v7(), false)),
            None,
        ))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::OK);

    let body: Value = json_body(response.into_body()).await;
    assert_eq!(body["data"].as_array().unwrap().len(), 1);
    assert_eq!(body["data"][0]["name"], "Bob");
    assert_eq!(body["meta"]["total"], 2);
    assert_eq!(body["meta"]["last_page"], 2);
    assert_eq!(body["meta"]["from"], 1);
    assert_eq!(body["links"]["prev"], Value::Null);
    assert_eq!(
        body["links"]["next"],
        "/?currentteamid=1&per_page=1&page=2"
    );
    assert!(body["data"][0].get("password_hash").is_none());
}

#[tokio::test]
async fn test_list_ignores_unknown_and_disallowed_params() {
    let repo = InMemoryUserRepository::new();
    seed(&repo, "Ann", "ann@example.com", None).await;
    seed(&repo, "Bob", "bob@example.com", None).await;

    let response = app(repo)
        .oneshot(request(
            "GET",
            "/?password_hash=x&is_admin=true&name_gt=A",
            Some(claims(Uuid::now_v7(), false)),
            None,
        ))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::OK);

    let body: Value = json_body(response.into_body()).await;
    assert_eq!(body["meta"]["total"], 2);
}

#[tokio::test]
async fn test_list_with_huge_page_returns_empty_data() {
    let repo = InMemoryUserRepository::new();
    seed(&repo, "Ann", "ann@example.com", None).await;

    let response = app(repo)
        .oneshot(request(
            "GET",
            "/?page=18446744073709551615",
            Some(claims(Uuid::now_v7(), false)),
            None,
        ))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::OK);

    let body: Value = json_body(response.into_body()).await;
    assert_eq!(body["data"].as_array().unwrap().len(), 0);
    assert_eq!(body["meta"]["total"], 1);
    assert_eq!(body["meta"]["current_page"], pagination::MAX_PAGE);
    assert_eq!(body["meta"]["from"], Value::Null);
    assert_eq!(body["links"]["next"], Value::Null);
}

#[tokio::test]
async fn test_list_email_filter_ignores_case() {
    let repo = InMemoryUserRepository::new();
    seed(&repo, "Ann", "ann@example.com", None).await;
    seed(&repo, "Bob", "bob@example.com", None).await;

    let response = app(repo)
        .oneshot(request(
            "GET",
            "/?email=ANN%40example.com",
            Some(claims(Uuid::now_v7(), false)),
            None,
        ))
        .await
        .unwrap();

    let body: Value = json_body(response.into_body()).await;
    assert_eq!(body["meta"]["total"], 1);
    assert_eq!(body["data"][0]["name"], "Ann");
}

#[tokio::test]
async fn test_missing_claims_is_unauthorized() {
    let response = app(InMemoryUserRepository::new())
        .oneshot(request("GET", "/", None, None))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);

    let body: Value = json_body(response.into_body()).await;
    assert_eq!(body["error"], "UNAUTHORIZED");
}

#[tokio::test]
async fn test_admin_create_returns_201() {
    let builder = TestDataBuilder::from_test_name("handler_create_201");
    let repo = InMemoryUserRepository::new();

    let response = app(repo.clone())
        .oneshot(request(
            "POST",
            "/",
            Some(claims(Uuid::now_v7(), true)),
            Some(json!({
                "name": builder.name("user", "new"),
                "email": builder.email("new"),
                "password": builder.password(),
                "current_team_id": 5
            })),
        ))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::CREATED);

    let user: UserResponse = json_body(response.into_body()).await;
    assert_eq!(user.email, builder.email("new"));
    assert_eq!(user.current_team_id, Some(5));
    assert!(!user.is_admin);

    let stored = repo.get_by_id(user.id).await.unwrap().unwrap();
    assert!(stored.password_hash.starts_with("$argon2"));
}

#[tokio::test]
async fn test_member_create_is_forbidden() {
    let builder = TestDataBuilder::from_test_name("handler_create_403");

    let response = app(InMemoryUserRepository::new())
        .oneshot(request(
            "POST",
            "/",
            Some(claims(Uuid::now_v7(), false)),
            Some(json!({
                "name": "New",
                "email": builder.email("new"),
                "password": builder.password()
            })),
        ))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::FORBIDDEN);
}

#[tokio::test]
async fn test_create_validates_body() {
    let response = app(InMemoryUserRepository::new())
        .oneshot(request(
            "POST",
            "/",
            Some(claims(Uuid::now_v7(), true)),
            Some(json!({
                "name": "",
                "email": "not-an-email",
                "password": "Secret123"
            })),
        ))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::BAD_REQUEST);

    let body: Value = json_body(response.into_body()).await;
    assert_eq!(body["error"], "VALIDATION_ERROR");
    assert!(body["details"]["email"].is_array());
}

#[tokio::test]
async fn test_create_duplicate_email_is_conflict() {
    let repo = InMemoryUserRepository::new();
    seed(&repo, "Ann", "ann@example.com", None).await;

    let response = app(repo)
        .oneshot(request(
            "POST",
            "/",
            Some(claims(Uuid::now_v7(), true)),
            Some(json!({
                "name": "Other Ann",
                "email": "Ann@Example.com",
                "password": "Secret123"
            })),
        ))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::CONFLICT);
}

#[tokio::test]
async fn test_get_unknown_user_is_404() {
    let response = app(InMemoryUserRepository::new())
        .oneshot(request(
            "GET",
            &format!("/{}", Uuid::now_v7()),
            Some(claims(Uuid::now_v7(), false)),
            None,
        ))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn test_get_with_malformed_id_is_400() {
    let response = app(InMemoryUserRepository::new())
        .oneshot(request(
            "GET",
            "/not-a-uuid",
            Some(claims(Uuid::now_v7(), false)),
            None,
        ))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn test_member_patches_own_record() {
    let repo = InMemoryUserRepository::new();
    let own = seed(&repo, "Ann", "ann@example.com", None).await;

    let response = app(repo)
        .oneshot(request(
            "PATCH",
            &format!("/{}", own.id),
            Some(claims(own.id, false)),
            Some(json!({ "name": "Annie", "fb_id": "fb-1" })),
        ))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::OK);

    let user: UserResponse = json_body(response.into_body()).await;
    assert_eq!(user.name, "Annie");
    assert_eq!(user.fb_id.as_deref(), Some("fb-1"));
    assert_eq!(user.email, "ann@example.com");
}

#[tokio::test]
async fn test_member_update_of_other_user_is_forbidden() {
    let repo = InMemoryUserRepository::new();
    let other = seed(&repo, "Bob", "bob@example.com", None).await;

    let response = app(repo)
        .oneshot(request(
            "PUT",
            &format!("/{}", other.id),
            Some(claims(Uuid::now_v7(), false)),
            Some(json!({ "name": "Hacked" })),
        ))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::FORBIDDEN);
}

#[tokio::test]
async fn test_admin_delete_returns_204() {
    let repo = InMemoryUserRepository::new();
    let user = seed(&repo, "Ann", "ann@example.com", None).await;
    let admin = claims(Uuid::now_v7(), true);

    let response = app(repo.clone())
        .oneshot(request(
            "DELETE",
            &format!("/{}", user.id),
            Some(admin.clone()),
            None,
        ))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::NO_CONTENT);

    let response = app(repo)
        .oneshot(request("GET", &format!("/{}", user.id), Some(admin), None))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn test_unsupported_method_is_405_envelope() {
    let response = app(InMemoryUserRepository::new())
        .oneshot(request(
            "POST",
            &format!("/{}", Uuid::now_v7()),
            Some(claims(Uuid::now_v7(), true)),
            None,
        ))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::METHOD_NOT_ALLOWED);

    let body: Value = json_body(response.into_body()).await;
    assert_eq!(body["error"], "METHOD_NOT_ALLOWED");
}
