//! Products API routes

use axum::Router;
use domain_products::{InMemoryProductRepository, PgProductRepository, ProductService, handlers};

use crate::state::AppState;

/// Create products router over whichever store the state carries
pub fn router(state: &AppState) -> Router {
    match &state.db {
        Some(db) => handlers::router(ProductService::new(PgProductRepository::new(db.clone()))),
        None => handlers::router(ProductService::new(InMemoryProductRepository::new())),
    }
}
