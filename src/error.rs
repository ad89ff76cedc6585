// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Application error types with consistent API responses.
//!
//! Every failure is rendered as `{statusCode, message}`. Absent resources are
//! folded into `BadRequest`; there is no separate 404 path.

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde::Serialize;

use crate::db::StoreError;

const INTERNAL_MESSAGE: &str = "Internal Server Error";

/// Application error type that converts to HTTP responses.
#[derive(Debug, thiserror::Error)]
pub enum AppError {
    #[error("Authentication required")]
    Unauthorized,

    #[error("Invalid request: {0}")]
    BadRequest(String),

    #[error("Database error: {0}")]
    Database(String),

    #[error("Internal server error: {0}")]
    Internal(#[from] anyhow::Error),
}

impl AppError {
    /// Shorthand for the generic client error used by most handlers.
    pub fn bad_request() -> Self {
        AppError::BadRequest("Bad Request".to_string())
    }

    /// HTTP status code this error renders with.
    pub fn status_code(&self) -> StatusCode {
        match self {
            AppError::Unauthorized => StatusCode::UNAUTHORIZED,
            AppError::BadRequest(_) => StatusCode::BAD_REQUEST,
            AppError::Database(_) | AppError::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

impl From<StoreError> for AppError {
    fn from(err: StoreError) -> Self {
        match err {
            StoreError::InvalidUpdate(msg) => AppError::BadRequest(msg),
            StoreError::Unavailable(msg) | StoreError::Serialization(msg) => {
                AppError::Database(msg)
            }
        }
    }
}

/// JSON error response body
#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct ErrorResponse {
    status_code: u16,
    message: String,
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let status = self.status_code();
        let message = match &self {
            AppError::Unauthorized => "Unauthorized".to_string(),
            AppError::BadRequest(msg) => msg.clone(),
            AppError::Database(msg) => {
                tracing::error!(error = %msg, "Database error");
                INTERNAL_MESSAGE.to_string()
            }
            AppError::Internal(err) => {
                tracing::error!(error = %err, "Internal server error");
                INTERNAL_MESSAGE.to_string()
            }
        };

        let body = ErrorResponse {
            status_code: status.as_u16(),
            message,
        };

        (status, Json(body)).into_response()
    }
}

/// Uniform success envelope: `{statusCode, body?, message?}`.
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ApiResponse<T: Serialize> {
    pub status_code: u16,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub body: Option<T>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,
}

impl ApiResponse<serde_json::Value> {
    /// 200 with no body.
    pub fn ok() -> Self {
        Self {
            status_code: StatusCode::OK.as_u16(),
            body: None,
            message: None,
        }
    }

    /// 202 "Progressing": the operation continues asynchronously.
    pub fn accepted() -> Self {
        Self {
            status_code: StatusCode::ACCEPTED.as_u16(),
            body: None,
            message: Some("Progressing".to_string()),
        }
    }
}

impl<T: Serialize> ApiResponse<T> {
    /// 200 with a body.
    pub fn with_body(body: T) -> Self {
        Self {
            status_code: StatusCode::OK.as_u16(),
            body: Some(body),
            message: None,
        }
    }

    pub fn message(mut self, message: impl Into<String>) -> Self {
        self.message = Some(message.into());
        self
    }
}

impl<T: Serialize> IntoResponse for ApiResponse<T> {
    fn into_response(self) -> Response {
        let status = StatusCode::from_u16(self.status_code).unwrap_or(StatusCode::OK);
        (status, Json(self)).into_response()
    }
}

/// Result type alias for handlers
pub type Result<T> = std::result::Result<T, AppError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn store_errors_map_to_expected_status() {
        let err: AppError = StoreError::Unavailable("throttled".to_string()).into();
        assert_eq!(err.status_code(), StatusCode::INTERNAL_SERVER_ERROR);

        let err: AppError = StoreError::InvalidUpdate("bad path".to_string()).into();
        assert_eq!(err.status_code(), StatusCode::BAD_REQUEST);
    }

    #[tokio::test]
    async fn internal_errors_do_not_leak_detail() {
        let response =
            AppError::Database("ProvisionedThroughputExceeded on users".to_string()).into_response();
        assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR);

        let body = axum::body::to_bytes(response.into_body(), 1024)
            .await
            .unwrap();
        let json: serde_json::Value = serde_json::from_slice(&body).unwrap();
        assert_eq!(json["statusCode"], 500);
        assert_eq!(json["message"], "Internal Server Error");
    }

    #[test]
    fn accepted_envelope_has_no_body() {
        let value = serde_json::to_value(ApiResponse::accepted()).unwrap();
        assert_eq!(value["statusCode"], 202);
        assert_eq!(value["message"], "Progressing");
        assert!(value.get("body").is_none());
    }
}
