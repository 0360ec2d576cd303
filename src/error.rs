use axum::{
    http::StatusCode,
    response::{IntoResponse, Json, Response},
};
use serde_json::json;
use thiserror::Error;

/// Errors that reach the HTTP caller. Everything else is absorbed at the
/// adapter boundary and degrades in place.
#[derive(Error, Debug, PartialEq, Eq)]
pub enum ApiError {
    #[error("Beach not found")]
    UnknownBeach,
    #[error("Invalid mode")]
    InvalidMode,
    #[error("Invalid time")]
    InvalidTime,
    #[error("No valid beaches found")]
    NoBeaches,
    #[error("Failed to fetch conditions")]
    UpstreamUnavailable,
}

impl ApiError {
    pub fn status_code(&self) -> StatusCode {
        match self {
            ApiError::UnknownBeach | ApiError::NoBeaches => StatusCode::NOT_FOUND,
            ApiError::InvalidMode | ApiError::InvalidTime => StatusCode::BAD_REQUEST,
            ApiError::UpstreamUnavailable => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let body = Json(json!({ "error": self.to_string() }));
        (self.status_code(), body).into_response()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_status_codes() {
        assert_eq!(ApiError::UnknownBeach.status_code(), StatusCode::NOT_FOUND);
        assert_eq!(ApiError::NoBeaches.status_code(), StatusCode::NOT_FOUND);
        assert_eq!(ApiError::InvalidMode.status_code(), StatusCode::BAD_REQUEST);
        assert_eq!(ApiError::InvalidTime.status_code(), StatusCode::BAD_REQUEST);
        assert_eq!(
            ApiError::UpstreamUnavailable.status_code(),
            StatusCode::INTERNAL_SERVER_ERROR
        );
    }
}
