//! Error types shared by the store, the importer and the HTTP layer.
//!
//! [`AppError`] is the top-level error. Lower-level errors convert into it via
//! `From`, so `?` works across module boundaries, and it renders itself as a
//! JSON response with the matching status code.

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde_json::json;
use thiserror::Error;
use tracing::error;

use crate::point::PointFormatError;

/// A write was rejected because a field failed validation.
///
/// `key` identifies the entry inside a structured field (for example a policy
/// key) when the failure is not about the field as a whole.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("{field}: {message}")]
pub struct ValidationError {
    pub field: String,
    pub key: Option<String>,
    pub message: String,
}

impl ValidationError {
    pub fn new(field: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            field: field.into(),
            key: None,
            message: message.into(),
        }
    }

    pub fn for_key(
        field: impl Into<String>,
        key: impl Into<String>,
        message: impl Into<String>,
    ) -> Self {
        Self {
            field: field.into(),
            key: Some(key.into()),
            message: message.into(),
        }
    }
}

#[derive(Debug, Error)]
pub enum AppError {
    #[error(transparent)]
    Format(#[from] PointFormatError),

    #[error("Missing field: {0}")]
    MissingField(String),

    #[error("Conflict: {0}")]
    Conflict(String),

    #[error("Validation failed: {0}")]
    Validation(#[from] ValidationError),

    #[error("Permission denied: {0}")]
    PermissionDenied(String),

    #[error("Authentication required")]
    Unauthorized,

    #[error("Not found: {0}")]
    NotFound(String),

    #[error("Bad request: {0}")]
    BadRequest(String),

    #[error("Database error: {0}")]
    Database(sqlx::Error),

    #[error("Password hashing failed: {0}")]
    PasswordHash(String),
}

impl From<sqlx::Error> for AppError {
    fn from(err: sqlx::Error) -> Self {
        if let sqlx::Error::Database(db_err) = &err {
            if db_err.is_unique_violation() {
                return AppError::Conflict(db_err.message().to_string());
            }
            if db_err.is_foreign_key_violation() {
                return AppError::BadRequest(format!(
                    "Referenced record does not exist ({})",
                    db_err.message()
                ));
            }
        }
        AppError::Database(err)
    }
}

impl AppError {
    pub fn status_code(&self) -> StatusCode {
        match self {
            AppError::Format(_) | AppError::MissingField(_) | AppError::BadRequest(_) => {
                StatusCode::BAD_REQUEST
            }
            AppError::Conflict(_) => StatusCode::CONFLICT,
            AppError::Validation(_) => StatusCode::UNPROCESSABLE_ENTITY,
            AppError::PermissionDenied(_) => StatusCode::FORBIDDEN,
            AppError::Unauthorized => StatusCode::UNAUTHORIZED,
            AppError::NotFound(_) => StatusCode::NOT_FOUND,
            AppError::Database(_) | AppError::PasswordHash(_) => {
                StatusCode::INTERNAL_SERVER_ERROR
            }
        }
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let status = self.status_code();

        let body = match &self {
            AppError::Database(e) => {
                error!("Database error while handling request: {}", e);
                json!({ "error": "Internal server error" })
            }
            AppError::PasswordHash(e) => {
                error!("Password hashing failed while handling request: {}", e);
                json!({ "error": "Internal server error" })
            }
            AppError::Validation(v) => json!({
                "error": self.to_string(),
                "field": v.field,
                "key": v.key,
            }),
            _ => json!({ "error": self.to_string() }),
        };

        let mut response = (status, Json(body)).into_response();
        if matches!(self, AppError::Unauthorized) {
            response.headers_mut().insert(
                axum::http::header::WWW_AUTHENTICATE,
                axum::http::HeaderValue::from_static("Basic realm=\"admin\""),
            );
        }
        response
    }
}

pub type AppResult<T> = Result<T, AppError>;
