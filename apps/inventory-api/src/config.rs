//! Configuration for Inventory API

use core_config::{AppInfo, ConfigError, FromEnv, app_info, env_or_default, server::ServerConfig};
use database::postgres::PostgresConfig;
use strum::{Display, EnumString};

pub use core_config::Environment;

/// Where products are stored
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Display, EnumString)]
#[strum(serialize_all = "lowercase", ascii_case_insensitive)]
pub enum StorageBackend {
    #[default]
    Postgres,
    Memory,
}

impl FromEnv for StorageBackend {
    /// Reads `STORAGE_BACKEND` (`postgres` or `memory`, default `postgres`)
    fn from_env() -> Result<Self, ConfigError> {
        let raw = env_or_default("STORAGE_BACKEND", "postgres");
        raw.parse().map_err(|_| ConfigError::ParseError {
            key: "STORAGE_BACKEND".to_string(),
            details: format!("expected 'postgres' or 'memory', got '{}'", raw),
        })
    }
}

/// Application configuration
#[derive(Clone, Debug)]
pub struct Config {
    pub app: AppInfo,
    pub server: ServerConfig,
    pub environment: Environment,
    pub storage: StorageBackend,
    /// Present only when `storage` is `Postgres`
    pub postgres: Option<PostgresConfig>,
}

impl Config {
    pub fn from_env() -> eyre::Result<Self> {
        let environment = Environment::from_env();
        let server = ServerConfig::from_env()?;
        let storage = StorageBackend::from_env()?;
        let postgres = match storage {
            StorageBackend::Postgres => Some(PostgresConfig::from_env()?),
            StorageBackend::Memory => None,
        };

        Ok(Self {
            app: app_info!(),
            server,
            environment,
            storage,
            postgres,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_storage_backend_defaults_to_postgres() {
        temp_env::with_var_unset("STORAGE_BACKEND", || {
            assert_eq!(StorageBackend::from_env().unwrap(), StorageBackend::Postgres);
        });
    }

    #[test]
    fn test_storage_backend_is_case_insensitive() {
        temp_env::with_var("STORAGE_BACKEND", Some("Memory"), || {
            assert_eq!(StorageBackend::from_env().unwrap(), StorageBackend::Memory);
        });
    }

    #[test]
    fn test_unknown_storage_backend_is_rejected() {
        temp_env::with_var("STORAGE_BACKEND", Some("mongodb"), || {
            let err = StorageBackend::from_env().unwrap_err();
            assert!(matches!(err, ConfigError::ParseError { ref key, .. } if key == "STORAGE_BACKEND"));
        });
    }

    #[test]
    fn test_memory_backend_skips_database_config() {
        temp_env::with_vars(
            [
                ("STORAGE_BACKEND", Some("memory")),
                ("DATABASE_URL", None),
                ("PORT", Some("9090")),
                ("HTTP_PORT", None),
            ],
            || {
                let config = Config::from_env().unwrap();
                assert_eq!(config.storage, StorageBackend::Memory);
                assert!(config.postgres.is_none());
                assert_eq!(config.server.port, 9090);
                assert_eq!(config.app.name, "inventory_api");
            },
        );
    }

    #[test]
    fn test_postgres_backend_reads_database_url() {
        temp_env::with_vars(
            [
                ("STORAGE_BACKEND", None),
                (
                    "DATABASE_URL",
                    Some("postgres://inventory:secret@db:5432/inventory"),
                ),
            ],
            || {
                let config = Config::from_env().unwrap();
                let postgres = config.postgres.unwrap();
                assert_eq!(postgres.url(), "postgres://inventory:secret@db:5432/inventory");
            },
        );
    }
}
