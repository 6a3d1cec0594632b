use crate::{env_or_default, Environment};
use tracing::{debug, info};
use tracing_subscriber::{prelude::*, EnvFilter};

/// Install color-eyre with a project-standard configuration.
///
/// Call this early in main() before any fallible operations. Safe to call
/// multiple times.
///
/// Configuration:
/// - Shows file:line where errors occur
/// - Hides environment variables (less noise)
/// - Panics are rendered without ANSI colours and emitted through
///   `tracing::error!` with a captured backtrace, so they land in the same
///   sink (JSON in production) as every other event
pub fn install_color_eyre() {
    let (panic_hook, eyre_hook) = color_eyre::config::HookBuilder::default()
        .theme(color_eyre::config::Theme::new())
        .display_location_section(true)
        .display_env_section(false)
        .into_hooks();

    if eyre_hook.install().is_err() {
        debug!("color-eyre already installed, keeping existing hook");
        return;
    }

    std::panic::set_hook(Box::new(move |info| {
        let report = panic_hook.panic_report(info);
        tracing::error!(
            backtrace = %std::backtrace::Backtrace::force_capture(),
            "{}",
            report
        );
    }));
}

/// Resolve the log filter: `RUST_LOG` wins, then `LOG_LEVEL`, then `info`.
pub fn log_filter() -> EnvFilter {
    EnvFilter::try_from_default_env().unwrap_or_else(|_| {
        let level = env_or_default("LOG_LEVEL", "info");
        EnvFilter::try_new(&level).unwrap_or_else(|_| EnvFilter::new("info"))
    })
}

/// Initialize tracing with environment-aware configuration and error span capture.
///
/// - **Production** (`APP_ENV=production`): flattened JSON events, no module targets
/// - **Development** (default): pretty-printed, human-readable output
///
/// Both include `tracing_error::ErrorLayer` so eyre reports carry span traces.
///
/// Environment variables:
/// - `APP_ENV`: set to "production" for JSON logs
/// - `RUST_LOG`: full filter directive (e.g. "info,sea_orm=warn")
/// - `LOG_LEVEL`: plain level used when `RUST_LOG` is unset (default "info")
///
/// Safe to call multiple times; later calls are no-ops.
pub fn init_tracing(environment: &Environment) {
    let filter = log_filter();

    let result = if environment.is_production() {
        tracing_subscriber::registry()
            .with(
                tracing_subscriber::fmt::layer()
                    .json()
                    .with_target(false)
                    .flatten_event(true),
            )
            .with(tracing_error::ErrorLayer::default())
            .with(filter)
            .try_init()
    } else {
        tracing_subscriber::registry()
            .with(
                tracing_subscriber::fmt::layer()
                    .with_target(false)
                    .with_file(false)
                    .with_line_number(false)
                    .pretty(),
            )
            .with(tracing_error::ErrorLayer::default())
            .with(filter)
            .try_init()
    };

    match result {
        Ok(_) => {
            info!(
                "Tracing initialized with ErrorLayer. Environment: {:?}",
                environment
            );
        }
        Err(_) => {
            debug!("Tracing already initialized, skipping re-initialization");
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_log_filter_falls_back_to_log_level() {
        temp_env::with_vars(
            [("RUST_LOG", None), ("LOG_LEVEL", Some("warn"))],
            || {
                assert_eq!(log_filter().to_string(), "warn");
            },
        );
    }

    #[test]
    fn test_log_filter_prefers_rust_log() {
        temp_env::with_vars(
            [("RUST_LOG", Some("debug")), ("LOG_LEVEL", Some("warn"))],
            || {
                assert_eq!(log_filter().to_string(), "debug");
            },
        );
    }

    #[test]
    fn test_log_filter_defaults_to_info() {
        temp_env::with_vars([("RUST_LOG", None::<&str>), ("LOG_LEVEL", None)], || {
            assert_eq!(log_filter().to_string(), "info");
        });
    }

    #[test]
    fn test_init_tracing_multiple_calls() {
        init_tracing(&Environment::Development);
        init_tracing(&Environment::Production);
    }
}
