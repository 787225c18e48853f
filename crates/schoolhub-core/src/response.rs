//! Success envelope shared by every endpoint.

use axum::{
    Json,
    http::StatusCode,
    response::{IntoResponse, Response},
};
use serde::Serialize;
use utoipa::ToSchema;

/// `{ statusCode, data, message, success }`
///
/// `success` is derived from the status code, so a 2xx envelope always
/// reports `true`.
#[derive(Debug, Clone, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct ApiResponse<T> {
    pub status_code: u16,
    pub data: T,
    pub message: String,
    pub success: bool,
}

impl<T> ApiResponse<T> {
    pub fn new(status: StatusCode, data: T, message: impl Into<String>) -> Self {
        Self {
            status_code: status.as_u16(),
            data,
            message: message.into(),
            success: status.as_u16() < 400,
        }
    }

    pub fn ok(data: T, message: impl Into<String>) -> Self {
        Self::new(StatusCode::OK, data, message)
    }

    pub fn created(data: T, message: impl Into<String>) -> Self {
        Self::new(StatusCode::CREATED, data, message)
    }
}

impl<T> IntoResponse for ApiResponse<T>
where
    T: Serialize,
{
    fn into_response(self) -> Response {
        let status = StatusCode::from_u16(self.status_code).unwrap_or(StatusCode::OK);
        (status, Json(self)).into_response()
    }
}

/// Serializes as `{}` for operations with nothing to return.
#[derive(Debug, Clone, Copy, Default, Serialize, ToSchema)]
pub struct EmptyData {}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_success_flag_follows_status() {
        assert!(ApiResponse::ok((), "fine").success);
        assert!(ApiResponse::created((), "made").success);
        assert!(!ApiResponse::new(StatusCode::NOT_FOUND, (), "gone").success);
    }

    #[test]
    fn test_empty_data_serializes_as_object() {
        let envelope = ApiResponse::ok(EmptyData::default(), "Admin logged Out");
        let json = serde_json::to_value(&envelope).unwrap();

        assert_eq!(json["data"], serde_json::json!({}));
        assert_eq!(json["statusCode"], 200);
        assert_eq!(json["message"], "Admin logged Out");
        assert_eq!(json["success"], true);
    }

    #[tokio::test]
    async fn test_into_response_uses_status_code() {
        let response = ApiResponse::created(EmptyData::default(), "done").into_response();
        assert_eq!(response.status(), StatusCode::CREATED);
    }
}
