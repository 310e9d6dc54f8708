//! Typed errors and HTTP mapping.

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde::Serialize;
use thiserror::Error;
use utoipa::ToSchema;

#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("missing setting: {0}")]
    Missing(&'static str),
    #[error("invalid {key}: {reason}")]
    Invalid { key: &'static str, reason: String },
}

#[derive(Error, Debug)]
pub enum AppError {
    #[error(transparent)]
    Config(#[from] ConfigError),
    #[error("{0}")]
    NotFound(String),
    #[error("{0}")]
    Validation(String),
    #[error("database: {0}")]
    Db(#[from] sqlx::Error),
    #[error("{0}")]
    Conflict(String),
}

impl AppError {
    pub fn person_not_found() -> Self {
        AppError::NotFound("Person not found".into())
    }

    pub fn email_taken() -> Self {
        AppError::Conflict("Email already registered".into())
    }

    /// Maps a storage unique violation to `Conflict`; every other error stays a `Db` error.
    pub fn from_write(e: sqlx::Error) -> Self {
        if let sqlx::Error::Database(ref db_err) = e {
            if db_err.is_unique_violation() {
                return AppError::email_taken();
            }
        }
        AppError::Db(e)
    }
}

/// Error response. `detail` carries the message at the top level, where clients
/// of the earlier Person API read it; `error` holds the machine-readable code.
#[derive(Serialize, ToSchema)]
pub struct ErrorBody {
    pub detail: String,
    pub error: ErrorDetail,
}

#[derive(Serialize, ToSchema)]
pub struct ErrorDetail {
    pub code: String,
    pub message: String,
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        // Duplicate email is reported as 400, matching what existing clients expect.
        let (status, code, message) = match &self {
            AppError::Config(e) => {
                tracing::error!(error = %e, "configuration error");
                (StatusCode::INTERNAL_SERVER_ERROR, "config_error", "configuration error".to_string())
            }
            AppError::NotFound(m) => (StatusCode::NOT_FOUND, "not_found", m.clone()),
            AppError::Validation(m) => (StatusCode::UNPROCESSABLE_ENTITY, "validation_error", m.clone()),
            AppError::Db(e) => {
                tracing::error!(error = %e, "database failure");
                (StatusCode::INTERNAL_SERVER_ERROR, "database_error", "database error".to_string())
            }
            AppError::Conflict(m) => (StatusCode::BAD_REQUEST, "bad_request", m.clone()),
        };
        let body = ErrorBody {
            detail: message.clone(),
            error: ErrorDetail {
                code: code.to_string(),
                message,
            },
        };
        (status, Json(body)).into_response()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn status_codes() {
        let cases = [
            (AppError::person_not_found(), StatusCode::NOT_FOUND),
            (AppError::Validation("bad id".into()), StatusCode::UNPROCESSABLE_ENTITY),
            (AppError::email_taken(), StatusCode::BAD_REQUEST),
            (AppError::Db(sqlx::Error::RowNotFound), StatusCode::INTERNAL_SERVER_ERROR),
            (AppError::Config(ConfigError::Missing("DATABASE_URL")), StatusCode::INTERNAL_SERVER_ERROR),
        ];
        for (err, status) in cases {
            assert_eq!(err.into_response().status(), status);
        }
    }
}
