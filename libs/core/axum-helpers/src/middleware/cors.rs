use axum::http::{HeaderValue, Method, header};
use std::io;
use std::time::Duration;
use tower_http::cors::{AllowOrigin, CorsLayer};
use tracing::info;

/// Environment variable holding comma-separated allowed origins.
pub const CORS_ALLOWED_ORIGIN: &str = "CORS_ALLOWED_ORIGIN";

/// Creates a CORS layer for the given origins.
///
/// Allows the methods the inventory API serves plus `OPTIONS`, the
/// `Content-Type` and `Accept` headers, and caches preflight results for
/// one hour.
pub fn create_cors_layer(origins: Vec<HeaderValue>) -> CorsLayer {
    CorsLayer::new()
        .allow_origin(AllowOrigin::list(origins))
        .allow_methods([
            Method::GET,
            Method::POST,
            Method::PATCH,
            Method::DELETE,
            Method::OPTIONS,
        ])
        .allow_headers([header::CONTENT_TYPE, header::ACCEPT])
        .max_age(Duration::from_secs(3600))
}

/// Builds the CORS layer from `CORS_ALLOWED_ORIGIN`.
///
/// Returns `Ok(None)` when the variable is unset or blank, in which case no
/// CORS headers are emitted.
///
/// # Errors
/// Returns `InvalidInput` if any origin is not a valid header value.
pub fn cors_layer_from_env() -> io::Result<Option<CorsLayer>> {
    let raw = match std::env::var(CORS_ALLOWED_ORIGIN) {
        Ok(value) => value,
        Err(_) => return Ok(None),
    };

    let origins = parse_origins(&raw)?;
    if origins.is_empty() {
        return Ok(None);
    }

    info!("CORS configured with allowed origins: {}", raw);
    Ok(Some(create_cors_layer(origins)))
}

fn parse_origins(raw: &str) -> io::Result<Vec<HeaderValue>> {
    raw.split(',')
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .map(HeaderValue::from_str)
        .collect::<Result<Vec<_>, _>>()
        .map_err(|e| {
            io::Error::new(
                io::ErrorKind::InvalidInput,
                format!("Invalid {} value: {}", CORS_ALLOWED_ORIGIN, e),
            )
        })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_origins_trims_and_skips_empty() {
        let origins = parse_origins(" http://localhost:3000, ,https://example.com").unwrap();
        assert_eq!(origins.len(), 2);
        assert_eq!(origins[0], "http://localhost:3000");
        assert_eq!(origins[1], "https://example.com");
    }

    #[test]
    fn test_parse_origins_rejects_invalid_header() {
        let err = parse_origins("http://bad\norigin").unwrap_err();
        assert_eq!(err.kind(), io::ErrorKind::InvalidInput);
    }

    #[test]
    fn test_unset_variable_disables_cors() {
        temp_env::with_var_unset(CORS_ALLOWED_ORIGIN, || {
            assert!(cors_layer_from_env().unwrap().is_none());
        });
    }

    #[test]
    fn test_configured_variable_enables_cors() {
        temp_env::with_var(CORS_ALLOWED_ORIGIN, Some("http://localhost:5173"), || {
            assert!(cors_layer_from_env().unwrap().is_some());
        });
    }
}
