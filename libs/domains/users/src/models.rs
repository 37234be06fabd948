use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;
use uuid::Uuid;
use validator::Validate;

/// User entity, one row of the `users` table
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, ToSchema)]
pub struct User {
    pub id: Uuid,
    pub name: String,
    /// Unique, compared case-insensitively
    pub email: String,
    pub email_verified_at: Option<DateTime<Utc>>,
    /// Argon2 PHC string, never exposed in API responses
    #[serde(skip_serializing, default)]
    pub password_hash: String,
    pub two_factor_confirmed_at: Option<DateTime<Utc>>,
    pub current_team_id: Option<i64>,
    pub profile_photo_path: Option<String>,
    /// Facebook account id for social login
    pub fb_id: Option<String>,
    pub profile_photo_url: Option<String>,
    pub is_admin: bool,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl User {
    /// New non-admin user; the password must already be hashed.
    pub fn new(name: String, email: String, password_hash: String) -> Self {
        let now = Utc::now();
        Self {
            id: Uuid::now_v7(),
            name,
            email,
            email_verified_at: None,
            password_hash,
            two_factor_confirmed_at: None,
            current_team_id: None,
            profile_photo_path: None,
            fb_id: None,
            profile_photo_url: None,
            is_admin: false,
            created_at: now,
            updated_at: now,
        }
    }

    /// Value of a backing-store column rendered as text, `None` for NULL
    /// or for columns the record does not have.
    pub fn column_value(&self, column: &str) -> Option<String> {
        match column {
            "id" => Some(self.id.to_string()),
            "name" => Some(self.name.clone()),
            "email" => Some(self.email.clone()),
            "email_verified_at" => self.email_verified_at.map(|t| t.to_rfc3339()),
            "two_factor_confirmed_at" => self.two_factor_confirmed_at.map(|t| t.to_rfc3339()),
            "current_team_id" => self.current_team_id.map(|id| id.to_string()),
            "profile_photo_path" => self.profile_photo_path.clone(),
            "fb_id" => self.fb_id.clone(),
            "profile_photo_url" => self.profile_photo_url.clone(),
            "is_admin" => Some(self.is_admin.to_string()),
            "created_at" => Some(self.created_at.to_rfc3339()),
            "updated_at" => Some(self.updated_at.to_rfc3339()),
            _ => None,
        }
    }

    /// Apply a partial update. The password is rehashed by the service.
    pub fn apply_update(&mut self, update: UpdateUser, new_password_hash: Option<String>) {
        if let Some(name) = update.name {
            self.name = name;
        }
        if let Some(email) = update.email {
            self.email = email;
        }
        if let Some(hash) = new_password_hash {
            self.password_hash = hash;
        }
        if let Some(at) = update.email_verified_at {
            self.email_verified_at = Some(at);
        }
        if let Some(at) = update.two_factor_confirmed_at {
            self.two_factor_confirmed_at = Some(at);
        }
        if let Some(team) = update.current_team_id {
            self.current_team_id = Some(team);
        }
        if let Some(path) = update.profile_photo_path {
            self.profile_photo_path = Some(path);
        }
        if let Some(fb_id) = update.fb_id {
            self.fb_id = Some(fb_id);
        }
        if let Some(url) = update.profile_photo_url {
            self.profile_photo_url = Some(url);
        }
        if let Some(is_admin) = update.is_admin {
            self.is_admin = is_admin;
        }
        self.updated_at = Utc::now();
    }
}

/// User as returned by the API
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, ToSchema)]
pub struct UserResponse {
    pub id: Uuid,
    pub name: String,
    pub email: String,
    pub email_verified_at: Option<DateTime<Utc>>,
    pub two_factor_confirmed_at: Option<DateTime<Utc>>,
    pub current_team_id: Option<i64>,
    pub profile_photo_path: Option<String>,
    pub fb_id: Option<String>,
    pub profile_photo_url: Option<String>,
    pub is_admin: bool,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl From<User> for UserResponse {
    fn from(user: User) -> Self {
        Self {
            id: user.id,
            name: user.name,
            email: user.email,
            email_verified_at: user.email_verified_at,
            two_factor_confirmed_at: user.two_factor_confirmed_at,
            current_team_id: user.current_team_id,
            profile_photo_path: user.profile_photo_path,
            fb_id: user.fb_id,
            profile_photo_url: user.profile_photo_url,
            is_admin: user.is_admin,
            created_at: user.created_at,
            updated_at: user.updated_at,
        }
    }
}

#[derive(Debug, Clone, Deserialize, Validate, ToSchema)]
pub struct CreateUser {
    #[validate(length(min = 1, max = 255))]
    pub name: String,
    #[validate(email, length(max = 255))]
    pub email: String,
    pub password: String,
    pub current_team_id: Option<i64>,
    #[validate(length(max = 2048))]
    pub profile_photo_path: Option<String>,
    #[validate(length(max = 255))]
    pub fb_id: Option<String>,
    #[validate(url)]
    pub profile_photo_url: Option<String>,
    /// Only honoured for admin callers
    #[serde(default)]
    pub is_admin: bool,
}

#[derive(Debug, Clone, Default, Deserialize, Validate, ToSchema)]
pub struct UpdateUser {
    #[validate(length(min = 1, max = 255))]
    pub name: Option<String>,
    #[validate(email, length(max = 255))]
    pub email: Option<String>,
    pub password: Option<String>,
    pub email_verified_at: Option<DateTime<Utc>>,
    pub two_factor_confirmed_at: Option<DateTime<Utc>>,
    pub current_team_id: Option<i64>,
    #[validate(length(max = 2048))]
    pub profile_photo_path: Option<String>,
    #[validate(length(max = 255))]
    pub fb_id: Option<String>,
    #[validate(url)]
    pub profile_photo_url: Option<String>,
    /// Only admins may change this
    pub is_admin: Option<bool>,
}
