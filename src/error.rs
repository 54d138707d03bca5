use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde::{Deserialize, Serialize};

/// Body of every non-success response, and of `/add` successes
#[derive(Debug, Serialize, Deserialize, utoipa::ToSchema)]
pub struct MessageResponse {
    pub message: String,
}

impl MessageResponse {
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
        }
    }
}

/// Custom error type for API endpoints
///
/// Every failure a handler can produce maps onto one of these variants,
/// which in turn maps onto a status code and a `{"message": ...}` body.
/// Nothing below the handler boundary leaks to the client: store and
/// parse failures are logged with their cause and reported as a plain
/// "server error".
#[derive(Debug)]
pub enum ApiError {
    /// Wrong HTTP verb; carries the message of the endpoint that rejected it
    MethodNotAllowed(&'static str),
    /// `/guess` body without a usable `text` field
    MissingText,
    /// `/add` key empty, not a string, or longer than the limit
    InvalidKey,
    /// `/add` value not a list of strings
    InvalidValue,
    /// Missing or wrong `x-api-key` header
    InvalidApiKey,
    /// Abbreviation has no stored translations
    NotFound,
    /// No route matches the request path
    UnknownRoute,
    /// Store operation error
    StoreError(anyhow::Error),
    /// JSON parsing error, either the request body or a stored record
    JsonError(serde_json::Error),
}

impl ApiError {
    pub fn status(&self) -> StatusCode {
        match self {
            ApiError::MethodNotAllowed(_) => StatusCode::METHOD_NOT_ALLOWED,
            ApiError::MissingText | ApiError::InvalidKey | ApiError::InvalidValue => {
                StatusCode::BAD_REQUEST
            }
            ApiError::InvalidApiKey => StatusCode::UNAUTHORIZED,
            ApiError::NotFound | ApiError::UnknownRoute => StatusCode::NOT_FOUND,
            ApiError::StoreError(_) | ApiError::JsonError(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    pub fn message(&self) -> &'static str {
        match self {
            ApiError::MethodNotAllowed(message) => *message,
            ApiError::MissingText => "missing key",
            ApiError::InvalidKey => "key invalid or too long",
            ApiError::InvalidValue => "value must be a list of strings",
            ApiError::InvalidApiKey => "invalid API key",
            ApiError::NotFound | ApiError::UnknownRoute => "not found",
            ApiError::StoreError(_) | ApiError::JsonError(_) => "server error",
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        match &self {
            ApiError::StoreError(err) => tracing::error!("Store error: {:#}", err),
            ApiError::JsonError(err) => tracing::error!("JSON error: {}", err),
            _ => {}
        }

        let body = Json(MessageResponse::new(self.message()));

        (self.status(), body).into_response()
    }
}

impl From<anyhow::Error> for ApiError {
    fn from(err: anyhow::Error) -> Self {
        ApiError::StoreError(err)
    }
}

impl From<serde_json::Error> for ApiError {
    fn from(err: serde_json::Error) -> Self {
        ApiError::JsonError(err)
    }
}
