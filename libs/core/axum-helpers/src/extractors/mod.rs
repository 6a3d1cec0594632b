//! Custom extractors for Axum handlers.
//!
//! Both extractors reject with the standard [`ErrorResponse`](crate::ErrorResponse)
//! body and a 400 status.

pub mod json_body;
pub mod uuid_path;

pub use json_body::JsonBody;
pub use uuid_path::UuidPath;
