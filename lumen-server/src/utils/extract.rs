//! Request extractors with structured rejections
//!
//! axum's own `Json` and `Query` reject with plain-text bodies; these wrap
//! them so a malformed request gets the `{code, message, details}` envelope
//! with `ValidationFailed` (400).

use axum::extract::rejection::{JsonRejection, QueryRejection};
use axum::extract::{FromRequest, FromRequestParts, Query, Request};
use axum::Json;
use http::request::Parts;
use serde::de::DeserializeOwned;
use shared::error::AppError;

/// JSON request body
#[derive(Debug, Clone, Copy, Default)]
pub struct JsonBody<T>(pub T);

impl<T, S> FromRequest<S> for JsonBody<T>
where
    T: DeserializeOwned,
    S: Send + Sync,
{
    type Rejection = AppError;

    async fn from_request(req: Request, state: &S) -> Result<Self, Self::Rejection> {
        Json::<T>::from_request(req, state)
            .await
            .map(|Json(value)| Self(value))
            .map_err(json_rejection)
    }
}

/// Query string parameters
#[derive(Debug, Clone, Copy, Default)]
pub struct QueryParams<T>(pub T);

impl<T, S> FromRequestParts<S> for QueryParams<T>
where
    T: DeserializeOwned,
    S: Send + Sync,
{
    type Rejection = AppError;

    async fn from_request_parts(parts: &mut Parts, state: &S) -> Result<Self, Self::Rejection> {
        Query::<T>::from_request_parts(parts, state)
            .await
            .map(|Query(value)| Self(value))
            .map_err(query_rejection)
    }
}

fn json_rejection(rejection: JsonRejection) -> AppError {
    let kind = match &rejection {
        JsonRejection::JsonDataError(_) => "invalid_field",
        JsonRejection::JsonSyntaxError(_) => "malformed_json",
        JsonRejection::MissingJsonContentType(_) => "content_type",
        _ => "unreadable_body",
    };
    let reason = rejection.body_text();
    tracing::debug!(kind, reason = %reason, "Request body rejected");
    AppError::validation(format!("Invalid request body: {}", reason))
        .with_detail("body", kind)
}

fn query_rejection(rejection: QueryRejection) -> AppError {
    let reason = rejection.body_text();
    tracing::debug!(reason = %reason, "Query string rejected");
    AppError::validation(format!("Invalid query string: {}", reason))
        .with_detail("query", "invalid_field")
}
