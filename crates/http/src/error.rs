//! API error type and its JSON response mapping.
//!
//! Every failure is rendered as `{ "message": "..." }` with a status code. Internal
//! faults are logged with their detail and returned with a generic message.

use axum::{
    http::{header, HeaderValue, StatusCode},
    response::{IntoResponse, Response},
    Json,
};
use tracing::{error, warn};

use atlas_core::error::{AuthError, SearchError};

#[derive(Debug)]
pub enum ApiError {
    /// Client sent something we cannot act on (400).
    BadRequest(String),
    /// Missing or unknown bearer token (401).
    Unauthorized,
    NotFound(&'static str),
    /// Unexpected server-side fault (500). The detail is logged, not returned.
    Internal(String),
}

impl ApiError {
    fn status(&self) -> StatusCode {
        match self {
            ApiError::BadRequest(_) => StatusCode::BAD_REQUEST,
            ApiError::Unauthorized => StatusCode::UNAUTHORIZED,
            ApiError::NotFound(_) => StatusCode::NOT_FOUND,
            ApiError::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = self.status();
        let message = match &self {
            ApiError::BadRequest(msg) => {
                warn!(status = status.as_u16(), message = msg.as_str(), "Rejected request");
                msg.clone()
            }
            ApiError::Unauthorized => "Unauthorized".to_string(),
            ApiError::NotFound(what) => what.to_string(),
            ApiError::Internal(detail) => {
                error!(detail = detail.as_str(), "Internal server error");
                "Internal server error".to_string()
            }
        };

        let mut response = (status, Json(serde_json::json!({ "message": message }))).into_response();
        if matches!(self, ApiError::Unauthorized) {
            response
                .headers_mut()
                .insert(header::WWW_AUTHENTICATE, HeaderValue::from_static("Bearer"));
        }
        response
    }
}

impl From<SearchError> for ApiError {
    fn from(e: SearchError) -> Self {
        match e {
            SearchError::Malformed(msg) => ApiError::BadRequest(format!("Invalid search request: {msg}")),
            SearchError::Internal(detail) => ApiError::Internal(detail),
        }
    }
}

impl From<AuthError> for ApiError {
    fn from(e: AuthError) -> Self {
        match e {
            AuthError::Unauthorized => ApiError::Unauthorized,
            other => ApiError::BadRequest(other.to_string()),
        }
    }
}
