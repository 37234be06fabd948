use axum::{
    Json,
    http::StatusCode,
    response::{IntoResponse, Response},
};
use axum_helpers::{ErrorCode, ErrorResponse};
use thiserror::Error;
use uuid::Uuid;

#[derive(Debug, Error)]
pub enum UserError {
    #[error("User not found: {0}")]
    NotFound(Uuid),

    #[error("Email already exists: {0}")]
    DuplicateEmail(String),

    #[error("Invalid input: {0}")]
    Validation(String),

    #[error("Unauthorized: {0}")]
    Unauthorized(String),

    #[error("Forbidden: {0}")]
    Forbidden(String),

    #[error("Password hashing error: {0}")]
    PasswordHash(String),

    #[error("Internal error: {0}")]
    Internal(String),
}

pub type UserResult<T> = Result<T, UserError>;

impl UserError {
    pub fn error_code(&self) -> ErrorCode {
        match self {
            UserError::NotFound(_) => ErrorCode::NotFound,
            UserError::DuplicateEmail(_) => ErrorCode::Conflict,
            UserError::Validation(_) => ErrorCode::ValidationError,
            UserError::Unauthorized(_) => ErrorCode::Unauthorized,
            UserError::Forbidden(_) => ErrorCode::Forbidden,
            UserError::PasswordHash(_) | UserError::Internal(_) => ErrorCode::InternalError,
        }
    }

    pub fn status(&self) -> StatusCode {
        self.error_code().status()
    }
}

impl IntoResponse for UserError {
    fn into_response(self) -> Response {
        let code = self.error_code();

        let message = match &self {
            UserError::NotFound(id) => format!("User {} not found", id),
            UserError::DuplicateEmail(email) => format!("Email already exists: {}", email),
            UserError::Validation(msg) => msg.clone(),
            UserError::Unauthorized(msg) => {
                tracing::debug!(error_code = code.code(), "Unauthorized: {}", msg);
                msg.clone()
            }
            UserError::Forbidden(msg) => {
                tracing::info!(error_code = code.code(), "Forbidden: {}", msg);
                msg.clone()
            }
            UserError::PasswordHash(msg) => {
                tracing::error!(error_code = code.code(), "Password hash error: {}", msg);
                code.default_message().to_string()
            }
            UserError::Internal(msg) => {
                tracing::error!(error_code = code.code(), "Internal error: {}", msg);
                code.default_message().to_string()
            }
        };

        (code.status(), Json(ErrorResponse::new(code, message))).into_response()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_status_mapping() {
        assert_eq!(UserError::NotFound(Uuid::nil()).status(), StatusCode::NOT_FOUND);
        assert_eq!(
            UserError::DuplicateEmail("a@b.c".into()).status(),
            StatusCode::CONFLICT
        );
        assert_eq!(
            UserError::Validation("bad".into()).status(),
            StatusCode::BAD_REQUEST
        );
        assert_eq!(
            UserError::Unauthorized("no token".into()).status(),
            StatusCode::UNAUTHORIZED
        );
        assert_eq!(
            UserError::Forbidden("nope".into()).status(),
            StatusCode::FORBIDDEN
        );
        assert_eq!(
            UserError::PasswordHash("salt".into()).status(),
            StatusCode::INTERNAL_SERVER_ERROR
        );
    }
}
