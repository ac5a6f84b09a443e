use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde_json::json;
use thiserror::Error;

use crate::auth::{password::CredentialError, token::TokenError};

#[derive(Debug, Error)]
pub enum AppError {
    /// Missing, malformed, expired or unresolvable bearer token.
    #[error("Not authenticated")]
    Unauthenticated,
    #[error("Invalid email or password")]
    InvalidCredentials,
    #[error("{0}")]
    Forbidden(String),
    #[error("{0}")]
    NotFound(String),
    #[error("{0}")]
    Conflict(String),
    #[error("{0}")]
    Validation(String),
    #[error("database error: {0}")]
    Sqlx(#[from] sqlx::Error),
    #[error("credential error: {0}")]
    Credential(#[from] CredentialError),
    #[error("token error: {0}")]
    Token(#[from] TokenError),
    #[error("io error: {0}")]
    Io(#[from] std::io::Error),
    #[error("{0}")]
    Internal(String),
}

impl From<validator::ValidationErrors> for AppError {
    fn from(inner: validator::ValidationErrors) -> Self {
        AppError::Validation(inner.to_string())
    }
}

impl AppError {
    pub fn status(&self) -> StatusCode {
        match self {
            AppError::Unauthenticated | AppError::InvalidCredentials => StatusCode::UNAUTHORIZED,
            AppError::Forbidden(_) => StatusCode::FORBIDDEN,
            AppError::NotFound(_) => StatusCode::NOT_FOUND,
            AppError::Conflict(_) => StatusCode::CONFLICT,
            AppError::Validation(_) => StatusCode::BAD_REQUEST,
            AppError::Sqlx(e) if is_constraint_violation(e) => StatusCode::CONFLICT,
            AppError::Sqlx(_)
            | AppError::Credential(_)
            | AppError::Token(_)
            | AppError::Io(_)
            | AppError::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

fn is_constraint_violation(e: &sqlx::Error) -> bool {
    e.as_database_error()
        .is_some_and(|db_err| db_err.is_unique_violation() || db_err.is_foreign_key_violation())
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let status = self.status();

        let error_message = match &self {
            AppError::Sqlx(e) => match e.as_database_error() {
                Some(db_err) if db_err.is_unique_violation() => "Resource already exists".to_string(),
                Some(db_err) if db_err.is_foreign_key_violation() => {
                    "Resource conflicts with related records".to_string()
                }
                _ => "Internal server error".to_string(),
            },
            _ if status == StatusCode::INTERNAL_SERVER_ERROR => "Internal server error".to_string(),
            other => other.to_string(),
        };

        if status == StatusCode::INTERNAL_SERVER_ERROR {
            tracing::error!(error = %self, "request failed");
        }

        let body = Json(json!({
            "error": error_message,
        }));

        (status, body).into_response()
    }
}

pub type Result<T, E = AppError> = std::result::Result<T, E>;
