//! Extractors whose rejections go out as `AppError` JSON bodies instead of
//! axum's plain-text defaults.

use axum::{
    async_trait,
    extract::{FromRequest, FromRequestParts, Path, Request},
    http::request::Parts,
    Json,
};
use core_types::{FieldIssue, FieldKind, ValidationError};
use serde_json::Value;

use crate::error::AppError;

/// The numeric `:id` segment of a record route.
pub struct RecordId(pub i64);

#[async_trait]
impl<S> FromRequestParts<S> for RecordId
where
    S: Send + Sync,
{
    type Rejection = AppError;

    async fn from_request_parts(parts: &mut Parts, state: &S) -> Result<Self, Self::Rejection> {
        let Path(id) = Path::<i64>::from_request_parts(parts, state).await.map_err(|_| {
            ValidationError { issues: vec![FieldIssue::wrong_type("id", FieldKind::Integer)] }
        })?;
        Ok(Self(id))
    }
}

/// A JSON request body, decoded but not yet checked against a schema.
pub struct JsonBody(pub Value);

#[async_trait]
impl<S> FromRequest<S> for JsonBody
where
    S: Send + Sync,
{
    type Rejection = AppError;

    async fn from_request(req: Request, state: &S) -> Result<Self, Self::Rejection> {
        let Json(value) = Json::<Value>::from_request(req, state)
            .await
            .map_err(|rejection| ValidationError::body(rejection.body_text()))?;
        Ok(Self(value))
    }
}
