//! HTTP middleware shared by every service.

pub mod cors;
pub mod panic;

pub use cors::{cors_layer_from_env, create_cors_layer};
pub use panic::{catch_panic_layer, handle_panic};
