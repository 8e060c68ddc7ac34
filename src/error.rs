use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use serde_json::json;
use thiserror::Error;

use crate::domain::ValidationErrors;
use crate::maps::MapError;

#[derive(Error, Debug)]
pub enum AppError {
    #[error("HTTP request failed: {0}")]
    Http(#[from] reqwest::Error),

    #[error("JSON deserialization failed: {0}")]
    Json(#[from] serde_json::Error),

    #[error("TOML deserialization failed: {0}")]
    Toml(#[from] toml::de::Error),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Configuration error: {0}")]
    Config(String),

    #[error("Validation failed: {0}")]
    Validation(ValidationErrors),

    #[error("Profile not found: {0}")]
    NotFound(String),

    #[error("Map session not found: {0}")]
    SessionNotFound(String),

    #[error("Duplicate profile id: {0}")]
    DuplicateId(String),

    #[error("Template rendering failed: {0}")]
    Template(#[from] askama::Error),

    #[error("Map error: {0}")]
    Map(#[from] MapError),
}

pub type Result<T> = std::result::Result<T, AppError>;

impl AppError {
    pub fn status_code(&self) -> StatusCode {
        match self {
            AppError::Validation(_) => StatusCode::UNPROCESSABLE_ENTITY,
            AppError::NotFound(_) | AppError::SessionNotFound(_) => StatusCode::NOT_FOUND,
            AppError::DuplicateId(_) => StatusCode::CONFLICT,
            AppError::Json(_) => StatusCode::BAD_REQUEST,
            AppError::Http(_) => StatusCode::BAD_GATEWAY,
            AppError::Map(_) => StatusCode::SERVICE_UNAVAILABLE,
            AppError::Toml(_) | AppError::Io(_) | AppError::Config(_) | AppError::Template(_) => {
                StatusCode::INTERNAL_SERVER_ERROR
            }
        }
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let status = self.status_code();
        if status.is_server_error() {
            tracing::error!(error = %self, "request failed");
        } else {
            tracing::debug!(error = %self, "request rejected");
        }

        let body = match &self {
            AppError::Validation(errors) => json!({
                "error": "validation failed",
                "fields": errors,
            }),
            other => json!({ "error": other.to_string() }),
        };

        (status, Json(body)).into_response()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_status_codes() {
        assert_eq!(AppError::NotFound("x".into()).status_code(), StatusCode::NOT_FOUND);
        assert_eq!(AppError::DuplicateId("x".into()).status_code(), StatusCode::CONFLICT);
        assert_eq!(
            AppError::Config("bad".into()).status_code(),
            StatusCode::INTERNAL_SERVER_ERROR
        );
        assert_eq!(
            AppError::Map(MapError::Aborted).status_code(),
            StatusCode::SERVICE_UNAVAILABLE
        );
    }
}
