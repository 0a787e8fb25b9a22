//! API error types
//!
//! Every failure a handler can produce, with its status code and the JSON
//! body clients see. Messages are already localized when the error is built.

use axum::Json;
use axum::extract::rejection::JsonRejection;
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use serde_json::json;
use thiserror::Error;

use weather_core::ValidationErrors;

use crate::i18n::{Locale, Message};

#[derive(Debug, Error)]
pub enum ApiError {
    /// Missing, unknown or expired token
    #[error("{0}")]
    Unauthenticated(&'static str),

    /// Authenticated but lacking the required permission
    #[error("{0}")]
    Forbidden(&'static str),

    /// Field-level input errors
    #[error(transparent)]
    Validation(ValidationErrors),

    /// Body could not be decoded at all
    #[error("{0}")]
    Malformed(String),

    #[error("{0}")]
    NotFound(&'static str),

    #[error("{0}")]
    Conflict(&'static str),

    /// Unexpected fault; `detail` is echoed to the client as `error`.
    #[error("{message}: {detail}")]
    Internal { message: &'static str, detail: String },
}

impl ApiError {
    pub fn unauthenticated(locale: Locale) -> Self {
        Self::Unauthenticated(locale.text(Message::Unauthenticated))
    }

    pub fn forbidden(locale: Locale) -> Self {
        Self::Forbidden(locale.text(Message::Unauthorized))
    }

    pub fn not_found(locale: Locale, message: Message) -> Self {
        Self::NotFound(locale.text(message))
    }

    pub fn conflict(locale: Locale, message: Message) -> Self {
        Self::Conflict(locale.text(message))
    }

    pub fn internal(locale: Locale, message: Message, detail: impl ToString) -> Self {
        Self::Internal {
            message: locale.text(message),
            detail: detail.to_string(),
        }
    }

    pub fn status_code(&self) -> StatusCode {
        match self {
            Self::Unauthenticated(_) => StatusCode::UNAUTHORIZED,
            Self::Forbidden(_) => StatusCode::FORBIDDEN,
            Self::Validation(_) | Self::Malformed(_) => StatusCode::UNPROCESSABLE_ENTITY,
            Self::NotFound(_) => StatusCode::NOT_FOUND,
            Self::Conflict(_) => StatusCode::CONFLICT,
            Self::Internal { .. } => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

impl From<ValidationErrors> for ApiError {
    fn from(errors: ValidationErrors) -> Self {
        Self::Validation(errors)
    }
}

impl From<JsonRejection> for ApiError {
    fn from(rejection: JsonRejection) -> Self {
        Self::Malformed(rejection.body_text())
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = self.status_code();

        let body = match &self {
            Self::Validation(errors) => json!({
                "message": errors.to_string(),
                "errors": errors,
            }),
            Self::Internal { message, detail } => {
                tracing::error!(status = %status, error = %detail, "{message}");
                json!({ "message": message, "error": detail })
            }
            other => json!({ "message": other.to_string() }),
        };

        if !status.is_server_error() {
            tracing::debug!(status = %status, error = %self, "request rejected");
        }

        (status, Json(body)).into_response()
    }
}

pub type Result<T> = std::result::Result<T, ApiError>;
