//! Who may do what to a user record.

use axum::{extract::FromRequestParts, http::request::Parts};
use axum_helpers::JwtClaims;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::error::UserError;
use crate::models::User;

/// Authenticated caller, taken from verified token claims
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Actor {
    pub id: Uuid,
    pub is_admin: bool,
}

impl Actor {
    pub fn new(id: Uuid, is_admin: bool) -> Self {
        Self { id, is_admin }
    }

    pub fn admin(id: Uuid) -> Self {
        Self::new(id, true)
    }

    pub fn member(id: Uuid) -> Self {
        Self::new(id, false)
    }
}

impl TryFrom<&JwtClaims> for Actor {
    type Error = UserError;

    fn try_from(claims: &JwtClaims) -> Result<Self, Self::Error> {
        let id = claims
            .subject_id()
            .ok_or_else(|| UserError::Unauthorized("Token subject is not a user id".to_string()))?;

        Ok(Self::new(id, claims.is_admin()))
    }
}

/// Reads the claims left by `jwt_auth_middleware`; a request without them
/// is rejected with 401.
impl<S> FromRequestParts<S> for Actor
where
    S: Send + Sync,
{
    type Rejection = UserError;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        let claims = parts
            .extensions
            .get::<JwtClaims>()
            .ok_or_else(|| UserError::Unauthorized("Authentication required".to_string()))?;

        Actor::try_from(claims)
    }
}

/// Abilities checked against a user record
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum UserAction {
    ViewAny,
    View,
    Create,
    Update,
    Delete,
    Restore,
    ForceDelete,
}

impl std::fmt::Display for UserAction {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let name = match self {
            UserAction::ViewAny => "view_any",
            UserAction::View => "view",
            UserAction::Create => "create",
            UserAction::Update => "update",
            UserAction::Delete => "delete",
            UserAction::Restore => "restore",
            UserAction::ForceDelete => "force_delete",
        };
        f.write_str(name)
    }
}

pub trait UserPolicy: Send + Sync {
    /// `target` is `None` for collection-level actions (`ViewAny`, `Create`).
    fn authorize(&self, actor: &Actor, action: UserAction, target: Option<&User>) -> bool;
}

/// Default rules:
/// - any authenticated actor may list and view
/// - admins may do anything
/// - members may update or delete only their own record
#[derive(Debug, Clone, Copy, Default)]
pub struct RolePolicy;

impl UserPolicy for RolePolicy {
    fn authorize(&self, actor: &Actor, action: UserAction, target: Option<&User>) -> bool {
        let is_self = target.is_some_and(|user| user.id == actor.id);

        match action {
            UserAction::ViewAny | UserAction::View => true,
            UserAction::Create | UserAction::Restore | UserAction::ForceDelete => actor.is_admin,
            UserAction::Update | UserAction::Delete => actor.is_admin || is_self,
        }
    }
}
