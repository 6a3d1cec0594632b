//! Application state management

use database::postgres::DatabaseConnection;

/// Shared application state
#[derive(Clone, Default)]
pub struct AppState {
    /// Pool handle; `None` when products live in memory
    pub db: Option<DatabaseConnection>,
}
