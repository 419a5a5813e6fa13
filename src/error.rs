use std::collections::BTreeMap;

use axum::http::{header, StatusCode};
use axum::response::{IntoResponse, Response};
use axum::Json;
use serde_json::json;
use thiserror::Error;

/// Per-field validation messages, keyed by request field name.
pub type FieldErrors = BTreeMap<String, String>;

#[derive(Debug, Error)]
pub enum AppError {
    #[error("validation failed")]
    Validation(FieldErrors),
    #[error("conflict: {0}")]
    Conflict(String),
    #[error("not found")]
    NotFound,
    #[error("unauthorized: {0}")]
    Unauthorized(String),
    #[error("storage error: {0}")]
    Storage(#[from] sqlx::Error),
    #[error("credential hashing failed: {0}")]
    Credential(#[from] bcrypt::BcryptError),
    #[error("token error: {0}")]
    Token(jsonwebtoken::errors::Error),
}

impl AppError {
    pub fn status(&self) -> StatusCode {
        match self {
            AppError::Validation(_) => StatusCode::UNPROCESSABLE_ENTITY,
            AppError::Conflict(_) => StatusCode::CONFLICT,
            AppError::NotFound => StatusCode::NOT_FOUND,
            AppError::Unauthorized(_) => StatusCode::UNAUTHORIZED,
            AppError::Storage(_) | AppError::Credential(_) | AppError::Token(_) => {
                StatusCode::INTERNAL_SERVER_ERROR
            }
        }
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let status = self.status();
        match self {
            AppError::Validation(fields) => (
                status,
                Json(json!({ "error": "validation failed", "fields": fields })),
            )
                .into_response(),
            AppError::Conflict(msg) => (status, Json(json!({ "error": msg }))).into_response(),
            AppError::NotFound => (status, Json(json!({ "error": "Not found" }))).into_response(),
            AppError::Unauthorized(msg) => (
                status,
                [(header::WWW_AUTHENTICATE, "Bearer")],
                Json(json!({ "error": msg })),
            )
                .into_response(),
            AppError::Storage(e) => {
                tracing::error!("Database error: {e}");
                internal_error()
            }
            AppError::Credential(e) => {
                tracing::error!("Credential hashing error: {e}");
                internal_error()
            }
            AppError::Token(e) => {
                tracing::error!("Token error: {e}");
                internal_error()
            }
        }
    }
}

fn internal_error() -> Response {
    (
        StatusCode::INTERNAL_SERVER_ERROR,
        Json(json!({ "error": "Internal server error" })),
    )
        .into_response()
}

/// True when `err` is a uniqueness violation reported by the database.
pub fn is_unique_violation(err: &sqlx::Error) -> bool {
    matches!(err, sqlx::Error::Database(db) if db.is_unique_violation())
}

pub fn is_foreign_key_violation(err: &sqlx::Error) -> bool {
    matches!(err, sqlx::Error::Database(db) if db.is_foreign_key_violation())
}
