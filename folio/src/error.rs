//! HTTP-facing error type and response envelope.
//!
//! Handlers return `Result<_, ApiError>`; domain errors (`LoginError`,
//! `ContentError`) convert into it. Internal failures are logged here and
//! reach the client only as a generic message.

use axum::{
    extract::{FromRequest, rejection::JsonRejection},
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde::Serialize;
use thiserror::Error;
use tracing::error;

use crate::admin::login::LoginError;

/// A validation failure attached to one input field.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct FieldError {
    pub field: String,
    pub message: String,
}

impl FieldError {
    pub fn new(field: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            field: field.into(),
            message: message.into(),
        }
    }
}

/// JSON envelope shared by every API response.
#[derive(Debug, Serialize)]
pub struct ApiResponse<T> {
    pub success: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub data: Option<T>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub errors: Option<Vec<FieldError>>,
}

impl<T: Serialize> ApiResponse<T> {
    /// Successful response carrying `data`.
    pub fn ok(data: T) -> Self {
        Self {
            success: true,
            data: Some(data),
            error: None,
            message: None,
            errors: None,
        }
    }

    pub fn with_message(mut self, message: impl Into<String>) -> Self {
        self.message = Some(message.into());
        self
    }
}

impl<T: Serialize> IntoResponse for ApiResponse<T> {
    fn into_response(self) -> Response {
        Json(self).into_response()
    }
}

/// Errors surfaced to HTTP clients.
#[derive(Debug, Error)]
pub enum ApiError {
    /// Input failed validation (400, with field detail).
    #[error("{message}")]
    Validation {
        message: String,
        errors: Vec<FieldError>,
    },

    /// Malformed or otherwise unusable request (400).
    #[error("{0}")]
    BadRequest(String),

    /// Authentication failed (401).
    #[error("{0}")]
    Unauthorized(String),

    /// Resource does not exist (404).
    #[error("{0}")]
    NotFound(String),

    /// Login cannot work because the admin identity is not configured (500).
    #[error("authentication service unavailable")]
    AuthUnavailable,

    /// Anything unexpected (500). Detail is logged, never returned.
    #[error(transparent)]
    Internal(#[from] anyhow::Error),
}

impl ApiError {
    pub fn status(&self) -> StatusCode {
        match self {
            ApiError::Validation { .. } | ApiError::BadRequest(_) => StatusCode::BAD_REQUEST,
            ApiError::Unauthorized(_) => StatusCode::UNAUTHORIZED,
            ApiError::NotFound(_) => StatusCode::NOT_FOUND,
            ApiError::AuthUnavailable | ApiError::Internal(_) => {
                StatusCode::INTERNAL_SERVER_ERROR
            }
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = self.status();
        let (message, errors) = match self {
            ApiError::Validation { message, errors } => (message, Some(errors)),
            ApiError::AuthUnavailable => (
                "Authentication service is currently unavailable.".to_string(),
                None,
            ),
            ApiError::Internal(e) => {
                error!(error = ?e, "Request failed");
                ("Internal server error".to_string(), None)
            }
            other => (other.to_string(), None),
        };

        let body = ApiResponse::<()> {
            success: false,
            data: None,
            error: Some(message),
            message: None,
            errors,
        };

        (status, Json(body)).into_response()
    }
}

/// JSON body extractor whose rejection is an enveloped 400.
#[derive(Debug, FromRequest)]
#[from_request(via(Json), rejection(ApiError))]
pub struct ApiJson<T>(pub T);

impl From<JsonRejection> for ApiError {
    fn from(rejection: JsonRejection) -> Self {
        ApiError::BadRequest(rejection.body_text())
    }
}

impl From<LoginError> for ApiError {
    fn from(err: LoginError) -> Self {
        match err {
            LoginError::Validation(errors) => ApiError::Validation {
                message: "Username and password are required".to_string(),
                errors,
            },
            LoginError::InvalidInput => ApiError::Unauthorized("Invalid input.".to_string()),
            LoginError::InvalidCredentials => {
                ApiError::Unauthorized("Invalid username or password.".to_string())
            }
            LoginError::Misconfigured(_) => ApiError::AuthUnavailable,
            LoginError::Token(e) => {
                ApiError::Internal(anyhow::Error::new(e).context("Failed to issue session token"))
            }
        }
    }
}
