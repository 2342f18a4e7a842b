//! HTTP error mapping

use axum::Json;
use axum::http::{HeaderValue, StatusCode, header};
use axum::response::{IntoResponse, Response};
use serde_json::json;
use thiserror::Error;

use super::generator::GenerateError;

#[derive(Debug, Error)]
pub enum ApiError {
    #[error("{0}")]
    BadRequest(String),
    #[error("Too many requests. Please try again later.")]
    RateLimited { retry_after_secs: u64, remaining: u32 },
    #[error("Session not found or expired")]
    NotFound,
    #[error(transparent)]
    Generation(#[from] GenerateError),
}

impl ApiError {
    pub fn status(&self) -> StatusCode {
        match self {
            ApiError::BadRequest(_) => StatusCode::BAD_REQUEST,
            ApiError::RateLimited { .. } => StatusCode::TOO_MANY_REQUESTS,
            ApiError::NotFound => StatusCode::NOT_FOUND,
            ApiError::Generation(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = self.status();
        match self {
            ApiError::RateLimited {
                retry_after_secs,
                remaining,
            } => {
                let body = json!({
                    "success": false,
                    "error": self.to_string(),
                    "retryAfter": retry_after_secs,
                });
                let mut response = (status, Json(body)).into_response();
                let headers = response.headers_mut();
                headers.insert(header::RETRY_AFTER, HeaderValue::from(retry_after_secs));
                headers.insert("x-ratelimit-remaining", HeaderValue::from(remaining));
                response
            }
            other => {
                let body = json!({ "success": false, "error": other.to_string() });
                (status, Json(body)).into_response()
            }
        }
    }
}
