use axum::{http::StatusCode, response::Response};

use super::{ErrorCode, error_response};

/// Handler for 404 Not Found errors.
///
/// Use as the router fallback so unmatched paths get the standard JSON body.
pub async fn not_found() -> Response {
    error_response(
        StatusCode::NOT_FOUND,
        "The requested resource was not found".to_string(),
        ErrorCode::NotFound,
    )
}

/// Handler for 405 Method Not Allowed errors.
///
/// Install with `Router::method_not_allowed_fallback` after the routes are added.
pub async fn method_not_allowed() -> Response {
    error_response(
        StatusCode::METHOD_NOT_ALLOWED,
        ErrorCode::MethodNotAllowed.default_message().to_string(),
        ErrorCode::MethodNotAllowed,
    )
}
