//! API routes module

pub mod health;
pub mod products;

use axum::Router;
use axum_helpers::server::{create_router, health_router};
use core_config::{AppInfo, server::ServerConfig};
use std::io;

use crate::openapi::ApiDoc;
use crate::state::AppState;

/// Domain routes
pub fn routes(state: &AppState) -> Router {
    Router::new()
        .nest("/products", products::router(state))
        .merge(health::router(state.clone()))
}

/// Full application: domain routes, docs, middleware and `/health`
pub fn app(state: &AppState, app_info: AppInfo, server: &ServerConfig) -> io::Result<Router> {
    let router = create_router::<ApiDoc>(routes(state), server)?;
    Ok(router.merge(health_router(app_info)))
}
