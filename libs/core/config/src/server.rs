use crate::{env_or_default, ConfigError, FromEnv};
use std::net::Ipv4Addr;
use std::time::Duration;

const DEFAULT_PORT: u16 = 8080;
const DEFAULT_REQUEST_TIMEOUT: Duration = Duration::from_secs(10);

/// Server configuration for HTTP APIs
#[derive(Clone, Debug)]
pub struct ServerConfig {
    pub host: String,
    pub port: u16,
    /// Upper bound on the time spent handling a single request
    pub request_timeout: Duration,
}

impl ServerConfig {
    pub fn new(host: String, port: u16) -> Self {
        Self {
            host,
            port,
            request_timeout: DEFAULT_REQUEST_TIMEOUT,
        }
    }

    /// Get the server address as "host:port"
    pub fn address(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }
}

impl FromEnv for ServerConfig {
    /// Reads from environment variables:
    /// - HOST: defaults to 0.0.0.0
    /// - HTTP_PORT, then PORT: defaults to 8080
    /// - HTTP_TIMEOUT: whole seconds, optionally suffixed with `s` (default 10)
    fn from_env() -> Result<Self, ConfigError> {
        let host = env_or_default("HOST", &Ipv4Addr::UNSPECIFIED.to_string());

        let (port_key, port_raw) = match std::env::var("HTTP_PORT") {
            Ok(value) => ("HTTP_PORT", value),
            Err(_) => ("PORT", env_or_default("PORT", &DEFAULT_PORT.to_string())),
        };
        let port = port_raw.parse().map_err(|e| ConfigError::ParseError {
            key: port_key.to_string(),
            details: format!("{}", e),
        })?;

        let request_timeout = parse_timeout(&env_or_default("HTTP_TIMEOUT", "10s"))?;

        Ok(Self {
            host,
            port,
            request_timeout,
        })
    }
}

fn parse_timeout(raw: &str) -> Result<Duration, ConfigError> {
    let trimmed = raw.trim();
    let secs = trimmed.strip_suffix('s').unwrap_or(trimmed);

    secs.parse::<u64>()
        .map(Duration::from_secs)
        .map_err(|e| ConfigError::ParseError {
            key: "HTTP_TIMEOUT".to_string(),
            details: format!("'{}': {}", raw, e),
        })
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self::new(Ipv4Addr::UNSPECIFIED.to_string(), DEFAULT_PORT)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const SERVER_VARS: [&str; 4] = ["HOST", "PORT", "HTTP_PORT", "HTTP_TIMEOUT"];

    fn unset_all() -> Vec<(&'static str, Option<&'static str>)> {
        SERVER_VARS.iter().map(|k| (*k, None)).collect()
    }

    #[test]
    fn test_server_config_from_env_with_defaults() {
        temp_env::with_vars(unset_all(), || {
            let config = ServerConfig::from_env().unwrap();
            assert_eq!(config.host, "0.0.0.0");
            assert_eq!(config.port, 8080);
            assert_eq!(config.address(), "0.0.0.0:8080");
            assert_eq!(config.request_timeout, Duration::from_secs(10));
        });
    }

    #[test]
    fn test_server_config_from_env_with_custom_values() {
        temp_env::with_vars(
            [
                ("HOST", Some("127.0.0.1")),
                ("PORT", Some("3000")),
                ("HTTP_PORT", None),
                ("HTTP_TIMEOUT", Some("3")),
            ],
            || {
                let config = ServerConfig::from_env().unwrap();
                assert_eq!(config.address(), "127.0.0.1:3000");
                assert_eq!(config.request_timeout, Duration::from_secs(3));
            },
        );
    }

    #[test]
    fn test_http_port_takes_precedence_over_port() {
        temp_env::with_vars(
            [
                ("HOST", None),
                ("PORT", Some("3000")),
                ("HTTP_PORT", Some("9090")),
                ("HTTP_TIMEOUT", None),
            ],
            || {
                let config = ServerConfig::from_env().unwrap();
                assert_eq!(config.port, 9090);
            },
        );
    }

    #[test]
    fn test_server_config_from_env_invalid_port() {
        temp_env::with_vars(
            [("HTTP_PORT", Some("not_a_number")), ("PORT", None)],
            || {
                let err = ServerConfig::from_env().unwrap_err();
                assert!(err.to_string().contains("HTTP_PORT"));
            },
        );
    }

    #[test]
    fn test_server_config_from_env_port_out_of_range() {
        temp_env::with_vars([("PORT", Some("99999")), ("HTTP_PORT", None)], || {
            let err = ServerConfig::from_env().unwrap_err();
            assert!(err.to_string().contains("PORT"));
        });
    }

    #[test]
    fn test_parse_timeout_accepts_suffix() {
        assert_eq!(parse_timeout("10s").unwrap(), Duration::from_secs(10));
        assert_eq!(parse_timeout(" 7 ").unwrap(), Duration::from_secs(7));
        assert!(parse_timeout("ten").is_err());
    }

    #[test]
    fn test_server_config_default() {
        let config = ServerConfig::default();
        assert_eq!(config.host, Ipv4Addr::UNSPECIFIED.to_string());
        assert_eq!(config.port, 8080);
        assert_eq!(config.request_timeout, DEFAULT_REQUEST_TIMEOUT);
    }
}
