//! JSON error responses for the web API.

use axum::Json;
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use serde_json::json;
use tower::BoxError;
use tracing::{error, warn};

use crate::search::SearchError;

pub const USAGE_MESSAGE: &str = "Use GET /search?q=...";
pub const MISSING_QUERY_MESSAGE: &str = "Missing query parameter 'q'.";
pub const NO_BOOKS_MESSAGE: &str = "No books found.";
pub const TIMEOUT_MESSAGE: &str = "Request timed out.";

/// Machine-level classification of an API error; determines the status code.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ApiErrorCode {
    BadRequest,
    MissingQuery,
    RouteNotFound,
    MethodNotAllowed,
    NoResults,
    /// Upstream failure, answered with the given status.
    Upstream(StatusCode),
    Timeout,
    Internal,
}

impl ApiErrorCode {
    pub fn status(self) -> StatusCode {
        match self {
            ApiErrorCode::BadRequest | ApiErrorCode::MissingQuery => StatusCode::BAD_REQUEST,
            ApiErrorCode::RouteNotFound | ApiErrorCode::NoResults => StatusCode::NOT_FOUND,
            ApiErrorCode::MethodNotAllowed => StatusCode::METHOD_NOT_ALLOWED,
            ApiErrorCode::Upstream(status) => status,
            ApiErrorCode::Timeout => StatusCode::GATEWAY_TIMEOUT,
            ApiErrorCode::Internal => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

/// Error response rendered as `{"error": "<message>"}`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ApiError {
    pub code: ApiErrorCode,
    pub message: String,
}

impl ApiError {
    pub fn new(code: ApiErrorCode, message: impl Into<String>) -> Self {
        Self {
            code,
            message: message.into(),
        }
    }

    pub fn bad_request(message: impl Into<String>) -> Self {
        Self::new(ApiErrorCode::BadRequest, message)
    }

    pub fn missing_query() -> Self {
        Self::new(ApiErrorCode::MissingQuery, MISSING_QUERY_MESSAGE)
    }

    pub fn route_not_found() -> Self {
        Self::new(ApiErrorCode::RouteNotFound, USAGE_MESSAGE)
    }

    pub fn method_not_allowed() -> Self {
        Self::new(ApiErrorCode::MethodNotAllowed, USAGE_MESSAGE)
    }

    pub fn internal_error(message: impl Into<String>) -> Self {
        Self::new(ApiErrorCode::Internal, message)
    }
}

/// Status used for an upstream non-success response: the upstream's own status
/// when it is an error status, otherwise 502.
fn upstream_status(status: u16) -> StatusCode {
    StatusCode::from_u16(status)
        .ok()
        .filter(|s| s.is_client_error() || s.is_server_error())
        .unwrap_or(StatusCode::BAD_GATEWAY)
}

impl From<SearchError> for ApiError {
    fn from(err: SearchError) -> Self {
        match err {
            SearchError::NoItemsFound => ApiError::new(ApiErrorCode::NoResults, NO_BOOKS_MESSAGE),
            SearchError::UpstreamUnavailable(reason) => ApiError::new(
                ApiErrorCode::Upstream(StatusCode::BAD_GATEWAY),
                format!("Books API unavailable: {reason}"),
            ),
            SearchError::UpstreamStatus(status) => ApiError::new(
                ApiErrorCode::Upstream(upstream_status(status)),
                format!("Books API responded with status {status}"),
            ),
            SearchError::MalformedResponse(detail) => {
                error!(detail = %detail, "upstream payload could not be parsed");
                ApiError::internal_error("Books API returned a malformed response")
            }
            SearchError::Internal(message) => {
                error!(message = %message, "internal search failure");
                ApiError::internal_error(message)
            }
        }
    }
}

/// Converts errors raised by the router's tower layers into JSON responses.
pub async fn handle_layer_error(err: BoxError) -> ApiError {
    if err.is::<tower::timeout::error::Elapsed>() {
        warn!("request exceeded the configured timeout");
        ApiError::new(ApiErrorCode::Timeout, TIMEOUT_MESSAGE)
    } else {
        error!(error = %err, "unhandled middleware error");
        ApiError::internal_error("Internal server error")
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        (self.code.status(), Json(json!({ "error": self.message }))).into_response()
    }
}
