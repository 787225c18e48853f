//! Application error type and the failure envelope.
//!
//! Every handler returns `Result<_, AppError>`. The error carries an HTTP
//! status and an [`anyhow::Error`] payload and renders as:
//!
//! ```json
//! { "statusCode": 409, "message": "...", "success": false, "errors": [] }
//! ```

use anyhow::Error;
use axum::{
    Json,
    http::StatusCode,
    response::{IntoResponse, Response},
};
use serde::Serialize;
use utoipa::ToSchema;
use validator::ValidationErrors;

/// Message exposed for errors that were not constructed deliberately.
const INTERNAL_MESSAGE: &str = "Internal server error";

/// Failure envelope returned by every endpoint.
#[derive(Debug, Clone, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct ApiError {
    #[schema(example = 400)]
    pub status_code: u16,
    #[schema(example = "All fields are required")]
    pub message: String,
    pub success: bool,
    pub errors: Vec<String>,
}

#[derive(Debug)]
pub struct AppError {
    pub status: StatusCode,
    pub error: Error,
    pub errors: Vec<String>,
}

impl AppError {
    pub fn new<E>(status: StatusCode, err: E) -> Self
    where
        E: Into<Error>,
    {
        Self {
            status,
            error: err.into(),
            errors: Vec::new(),
        }
    }

    pub fn internal<E>(err: E) -> Self
    where
        E: Into<Error>,
    {
        Self::new(StatusCode::INTERNAL_SERVER_ERROR, err)
    }

    pub fn internal_error(message: impl Into<String>) -> Self {
        Self::new(StatusCode::INTERNAL_SERVER_ERROR, Error::msg(message.into()))
    }

    pub fn not_found<E>(err: E) -> Self
    where
        E: Into<Error>,
    {
        Self::new(StatusCode::NOT_FOUND, err)
    }

    pub fn bad_request<E>(err: E) -> Self
    where
        E: Into<Error>,
    {
        Self::new(StatusCode::BAD_REQUEST, err)
    }

    pub fn unauthorized(message: impl Into<String>) -> Self {
        Self::new(StatusCode::UNAUTHORIZED, Error::msg(message.into()))
    }

    pub fn forbidden(message: impl Into<String>) -> Self {
        Self::new(StatusCode::FORBIDDEN, Error::msg(message.into()))
    }

    pub fn conflict(message: impl Into<String>) -> Self {
        Self::new(StatusCode::CONFLICT, Error::msg(message.into()))
    }

    /// A 400 carrying one entry per failed field.
    pub fn validation(errors: Vec<String>) -> Self {
        let message = if errors.is_empty() {
            "Validation failed".to_string()
        } else {
            errors.join(", ")
        };

        Self {
            status: StatusCode::BAD_REQUEST,
            error: Error::msg(message),
            errors,
        }
    }

    pub fn from_validation(errors: &ValidationErrors) -> Self {
        Self::validation(format_validation_errors(errors))
    }

    pub fn database<E>(err: E) -> Self
    where
        E: Into<Error>,
    {
        Self::new(
            StatusCode::INTERNAL_SERVER_ERROR,
            err.into().context(INTERNAL_MESSAGE),
        )
    }

    /// The message that ends up in the envelope.
    pub fn message(&self) -> String {
        self.error.to_string()
    }
}

/// Flattens field errors into messages, ordered by field name.
pub fn format_validation_errors(errors: &ValidationErrors) -> Vec<String> {
    let mut fields: Vec<_> = errors.field_errors().into_iter().collect();
    fields.sort_by(|a, b| a.0.cmp(&b.0));

    fields
        .into_iter()
        .flat_map(|(field, errors)| {
            errors.iter().map(move |error| {
                error
                    .message
                    .as_ref()
                    .map(|msg| msg.to_string())
                    .unwrap_or_else(|| format!("{} is invalid", field))
            })
        })
        .collect()
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        if self.status.is_server_error() {
            tracing::error!(error = ?self.error, status = %self.status.as_u16(), "Request failed");
        }

        let body = ApiError {
            status_code: self.status.as_u16(),
            message: self.error.to_string(),
            success: false,
            errors: self.errors,
        };

        (self.status, Json(body)).into_response()
    }
}

impl<E> From<E> for AppError
where
    E: Into<Error>,
{
    fn from(err: E) -> Self {
        AppError::database(err)
    }
}
