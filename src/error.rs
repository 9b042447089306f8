use axum::http::{header, HeaderValue, StatusCode};
use axum::response::{IntoResponse, Response};
use axum::Json;
use serde::Serialize;
use thiserror::Error;

pub type Result<T> = std::result::Result<T, Error>;

/// Errors surfaced by the directory search core.
///
/// Messages never include another tenant's data or record counts; the
/// variants carry only what the caller supplied or a retry hint.
#[derive(Debug, Clone, Error)]
pub enum Error {
    #[error("invalid request: {0}")]
    InvalidInput(String),

    #[error("rate limit exceeded, retry in {retry_after_seconds}s")]
    RateLimited { retry_after_seconds: u64 },

    #[error("organization not found")]
    TenantNotFound,

    #[error("storage unavailable: {0}")]
    StorageUnavailable(String),

    #[error("internal error: {0}")]
    Internal(String),
}

#[derive(Debug, Serialize)]
pub struct ErrorResponse {
    pub error: String,
    pub message: String,
    pub code: u16,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub retry_after_seconds: Option<u64>,
}

impl ErrorResponse {
    fn new(error: &str, message: String, code: u16) -> Self {
        Self {
            error: error.to_string(),
            message,
            code,
            retry_after_seconds: None,
        }
    }
}

impl Error {
    fn status(&self) -> StatusCode {
        match self {
            Error::InvalidInput(_) => StatusCode::BAD_REQUEST,
            Error::RateLimited { .. } => StatusCode::TOO_MANY_REQUESTS,
            Error::TenantNotFound => StatusCode::NOT_FOUND,
            Error::StorageUnavailable(_) => StatusCode::SERVICE_UNAVAILABLE,
            Error::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    fn to_error_response(&self) -> ErrorResponse {
        let code = self.status().as_u16();
        match self {
            Error::InvalidInput(msg) => ErrorResponse::new("bad_request", msg.clone(), code),
            Error::RateLimited {
                retry_after_seconds,
            } => {
                let mut resp = ErrorResponse::new(
                    "rate_limit_exceeded",
                    "Too many requests. Please try again later.".to_string(),
                    code,
                );
                resp.retry_after_seconds = Some(*retry_after_seconds);
                resp
            }
            Error::TenantNotFound => ErrorResponse::new(
                "not_found",
                "Organization not found or inactive".to_string(),
                code,
            ),
            Error::StorageUnavailable(_) => ErrorResponse::new(
                "service_unavailable",
                "Storage temporarily unavailable, retry with backoff".to_string(),
                code,
            ),
            Error::Internal(_) => {
                ErrorResponse::new("internal_error", "Internal server error".to_string(), code)
            }
        }
    }
}

impl IntoResponse for Error {
    fn into_response(self) -> Response {
        let status = self.status();
        let body = self.to_error_response();
        let mut response = (status, Json(body)).into_response();

        if let Error::RateLimited {
            retry_after_seconds,
        } = &self
        {
            if let Ok(value) = HeaderValue::from_str(&retry_after_seconds.to_string()) {
                response.headers_mut().insert(header::RETRY_AFTER, value);
            }
        }

        response
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_rate_limited_response_carries_retry_after() {
        let err = Error::RateLimited {
            retry_after_seconds: 42,
        };
        let response = err.into_response();

        assert_eq!(response.status(), StatusCode::TOO_MANY_REQUESTS);
        assert_eq!(
            response.headers().get(header::RETRY_AFTER).unwrap(),
            &HeaderValue::from_static("42")
        );
    }

    #[test]
    fn test_internal_message_not_leaked() {
        let err = Error::Internal("lock poisoned in tenant 42 scan".to_string());
        let body = err.to_error_response();
        assert_eq!(body.message, "Internal server error");
    }

    #[test]
    fn test_status_mapping() {
        assert_eq!(
            Error::InvalidInput("bad page".into()).status(),
            StatusCode::BAD_REQUEST
        );
        assert_eq!(Error::TenantNotFound.status(), StatusCode::NOT_FOUND);
        assert_eq!(
            Error::StorageUnavailable("down".into()).status(),
            StatusCode::SERVICE_UNAVAILABLE
        );
    }
}
