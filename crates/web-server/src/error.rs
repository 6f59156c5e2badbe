use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use core_types::ValidationError;
use database::DbError;
use serde_json::json;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum AppError {
    #[error("Database error: {0}")]
    Database(#[from] DbError),
    #[error("{0}")]
    Validation(#[from] ValidationError),
}

/// Converts our custom `AppError` into an HTTP response.
impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let (status, body) = match self {
            AppError::Validation(err) => (
                StatusCode::UNPROCESSABLE_ENTITY,
                json!({
                    "error": "validation_error",
                    "message": err.to_string(),
                    "issues": err.issues,
                }),
            ),
            AppError::Database(err @ DbError::NotFound { .. }) => (
                StatusCode::NOT_FOUND,
                json!({ "error": "not_found", "message": err.to_string() }),
            ),
            AppError::Database(err @ DbError::Conflict { .. }) => (
                StatusCode::BAD_REQUEST,
                json!({ "error": "conflict", "message": err.to_string() }),
            ),
            AppError::Database(err @ DbError::InvalidReference { .. }) => (
                StatusCode::BAD_REQUEST,
                json!({ "error": "invalid_reference", "message": err.to_string() }),
            ),
            AppError::Database(db_err) => {
                tracing::error!(error = ?db_err, "Database error.");
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    json!({
                        "error": "internal_error",
                        "message": "An internal database error occurred",
                    }),
                )
            }
        };

        (status, Json(body)).into_response()
    }
}
