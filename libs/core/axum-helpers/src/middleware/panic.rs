//! Panic recovery for request handlers.

use crate::errors::{ErrorCode, error_response};
use axum::{http::StatusCode, response::Response};
use std::any::Any;
use std::backtrace::Backtrace;
use tower_http::catch_panic::CatchPanicLayer;

type PanicHandler = fn(Box<dyn Any + Send + 'static>) -> Response;

/// Layer that turns a handler panic into a `500 INTERNAL_ERROR` response.
pub fn catch_panic_layer() -> CatchPanicLayer<PanicHandler> {
    CatchPanicLayer::custom(handle_panic as PanicHandler)
}

/// Logs the panic payload with a stack trace and renders the generic
/// internal error body. The cause never reaches the client.
pub fn handle_panic(payload: Box<dyn Any + Send + 'static>) -> Response {
    let detail = if let Some(s) = payload.downcast_ref::<String>() {
        s.clone()
    } else if let Some(s) = payload.downcast_ref::<&str>() {
        (*s).to_string()
    } else {
        "unknown panic payload".to_string()
    };

    tracing::error!(
        error_code = ErrorCode::InternalError.code(),
        panic = %detail,
        backtrace = %Backtrace::force_capture(),
        "Request handler panicked"
    );
    error_response(
        StatusCode::INTERNAL_SERVER_ERROR,
        ErrorCode::InternalError.default_message().to_string(),
        ErrorCode::InternalError,
    )
}
