use super::shutdown::ShutdownCoordinator;
use crate::errors::handlers::not_found;
use crate::middleware::{catch_panic_layer, cors_layer_from_env};
use axum::Router;
use axum::http::StatusCode;
use core_config::server::ServerConfig;
use std::future::Future;
use std::io;
use std::time::Duration;
use tokio::net::TcpListener;
use tokio::task::JoinError;
use tower_http::compression::CompressionLayer;
use tower_http::timeout::TimeoutLayer;
use tower_http::trace::{DefaultMakeSpan, DefaultOnResponse, TraceLayer};
use tracing::{Level, info, warn};
use utoipa::OpenApi;

/// Creates the application router with documentation and shared middleware.
///
/// Sets up:
/// - OpenAPI JSON at `/api-docs/openapi.json` plus Swagger UI, ReDoc, RapiDoc and Scalar
/// - `apis` merged at the root (domain routers nest themselves, e.g. `/products`)
/// - JSON 404 fallback
/// - Panic recovery, per-request timeout (408), request tracing, optional CORS, compression
///
/// Health endpoints are merged by the app via `health_router()` and its own
/// ready handler.
///
/// # Errors
/// Returns `InvalidInput` if `CORS_ALLOWED_ORIGIN` holds an invalid origin.
///
/// # Example
/// ```ignore
/// use axum_helpers::server::create_router;
///
/// #[derive(OpenApi)]
/// #[openapi(paths(/* your paths */))]
/// struct ApiDoc;
///
/// let api_routes = Router::new().nest("/products", domain_products::handlers::router(service));
/// let router = create_router::<ApiDoc>(api_routes, &server_config)?;
/// ```
pub fn create_router<T>(apis: Router, server_config: &ServerConfig) -> io::Result<Router>
where
    T: OpenApi + 'static,
{
    use utoipa_rapidoc::RapiDoc;
    use utoipa_redoc::{Redoc, Servable as RedocServable};
    use utoipa_scalar::{Scalar, Servable as ScalarServable};
    use utoipa_swagger_ui::SwaggerUi;

    let cors = cors_layer_from_env()?;

    let router = Router::new()
        .merge(SwaggerUi::new("/swagger-ui").url("/api-docs/openapi.json", T::openapi()))
        .merge(Redoc::with_url("/redoc", T::openapi()))
        .merge(RapiDoc::new("/api-docs/openapi.json").path("/rapidoc"))
        .merge(Scalar::with_url("/scalar", T::openapi()))
        .merge(apis)
        .fallback(not_found)
        .layer(catch_panic_layer())
        .layer(TimeoutLayer::with_status_code(
            StatusCode::REQUEST_TIMEOUT,
            server_config.request_timeout,
        ))
        .layer(
            TraceLayer::new_for_http()
                .make_span_with(DefaultMakeSpan::new().level(Level::INFO))
                .on_response(
                    DefaultOnResponse::new()
                        .level(Level::INFO)
                        .latency_unit(tower_http::LatencyUnit::Millis),
                ),
        );

    let router = match cors {
        Some(cors) => router.layer(cors),
        None => router,
    };

    Ok(router.layer(CompressionLayer::new()))
}

/// Binds the configured address and serves until SIGTERM/SIGINT.
///
/// In-flight requests get `shutdown_timeout` to drain, then `cleanup` runs
/// (database pools, etc.) under the same bound.
///
/// # Example
/// ```ignore
/// use std::time::Duration;
/// use axum_helpers::server::create_production_app;
///
/// let cleanup = async move {
///     if let Err(e) = db.close().await {
///         tracing::warn!("Failed to close database pool: {}", e);
///     }
/// };
///
/// create_production_app(router, &config, Duration::from_secs(5), cleanup).await?;
/// ```
pub async fn create_production_app<F>(
    router: Router,
    server_config: &ServerConfig,
    shutdown_timeout: Duration,
    cleanup: F,
) -> io::Result<()>
where
    F: Future<Output = ()> + Send + 'static,
{
    let listener = TcpListener::bind(server_config.address()).await?;
    info!("Server starting on {}", listener.local_addr()?);

    let coordinator = ShutdownCoordinator::new();
    let signals = coordinator.clone();
    let signal_task = tokio::spawn(async move { signals.wait_for_signal().await });

    let result =
        serve_with_coordinator(listener, router, coordinator, shutdown_timeout, cleanup).await;
    signal_task.abort();
    result
}

/// Serves `router` on `listener` until `coordinator` initiates shutdown.
///
/// Connections still open after `shutdown_timeout` are dropped. `cleanup`
/// always runs before returning, bounded by the same timeout.
pub async fn serve_with_coordinator<F>(
    listener: TcpListener,
    router: Router,
    coordinator: ShutdownCoordinator,
    shutdown_timeout: Duration,
    cleanup: F,
) -> io::Result<()>
where
    F: Future<Output = ()> + Send + 'static,
{
    let graceful = coordinator.clone();
    let server = axum::serve(listener, router.into_make_service())
        .with_graceful_shutdown(async move { graceful.cancelled().await });
    let mut server_task = tokio::spawn(async move { server.await });

    let serve_result = tokio::select! {
        joined = &mut server_task => flatten(joined),
        _ = coordinator.cancelled() => {
            info!("Draining in-flight requests (timeout: {:?})", shutdown_timeout);
            match tokio::time::timeout(shutdown_timeout, &mut server_task).await {
                Ok(joined) => flatten(joined),
                Err(_) => {
                    warn!("Drain exceeded {:?}, dropping open connections", shutdown_timeout);
                    server_task.abort();
                    Ok(())
                }
            }
        }
    };

    if let Err(e) = &serve_result {
        tracing::error!("Server encountered an error: {:?}", e);
    }

    info!("Starting cleanup tasks (timeout: {:?})", shutdown_timeout);
    match tokio::time::timeout(shutdown_timeout, cleanup).await {
        Ok(()) => info!("Cleanup completed successfully"),
        Err(_) => warn!(
            "Cleanup exceeded timeout of {:?}, forcing shutdown",
            shutdown_timeout
        ),
    }

    serve_result
}

fn flatten(joined: Result<io::Result<()>, JoinError>) -> io::Result<()> {
    joined.map_err(io::Error::other)?
}
