use anyhow::Result;
use axum::{
    routing::{get, post},
    Router,
};
use metrics_exporter_prometheus::PrometheusHandle;
use std::{net::SocketAddr, sync::Arc};
use tower_http::trace::TraceLayer;
use tracing::{info, warn};

use crate::{artifacts::Artifacts, config::Config, handlers, metrics, signals::setup_signal_handlers};

/// Start the prediction server
///
/// This function:
/// 1. Initializes metrics (when enabled)
/// 2. Loads the dataset and model once
/// 3. Sets up signal handlers for graceful shutdown
/// 4. Binds to the configured address and serves until shutdown
pub async fn start_server(config: Config) -> Result<()> {
    let metrics_handle = if config.metrics.enabled {
        info!("Initializing Prometheus metrics...");
        Some(Arc::new(metrics::init_metrics()?))
    } else {
        None
    };

    let artifacts = Artifacts::load(&config.artifacts);
    if !artifacts.is_ready() {
        warn!("Serving with missing artifacts; affected features are disabled until restart");
    }
    let app_state = handlers::AppState::new(artifacts);

    let (shutdown_tx, signal_handle) = setup_signal_handlers();
    let mut shutdown_rx = shutdown_tx.subscribe();

    let app = create_router(app_state, metrics_handle.map(|h| (config.metrics.endpoint.clone(), h)));

    let addr = SocketAddr::from((
        config.server.host.parse::<std::net::IpAddr>()?,
        config.server.port,
    ));

    info!("Starting charges predictor on http://{}", addr);

    let listener = tokio::net::TcpListener::bind(addr).await?;

    axum::serve(listener, app)
        .with_graceful_shutdown(async move {
            let _ = shutdown_rx.recv().await;
            info!("Shutdown signal received, draining connections...");
        })
        .await?;

    signal_handle.await?;
    info!("Server stopped gracefully");

    Ok(())
}

/// Paths served by [`create_router`], in registration order. The metrics
/// endpoint must not reuse any of them.
pub const ROUTES: [&str; 12] = [
    "/",
    "/predict",
    "/basic",
    "/basic/predict",
    "/api/predict",
    "/api/form",
    "/api/panel",
    "/api/charts/univariate",
    "/api/charts/bivariate",
    "/api/charts/multivariate",
    "/health",
    "/ready",
];

/// Create the Axum router with all routes and middleware
pub fn create_router(
    app_state: handlers::AppState,
    metrics: Option<(String, Arc<PrometheusHandle>)>,
) -> Router {
    let app_routes = Router::new()
        // Front-ends
        .route(ROUTES[0], get(handlers::pages::explorer_page))
        .route(ROUTES[1], post(handlers::pages::explorer_submit))
        .route(ROUTES[2], get(handlers::pages::basic_page))
        .route(ROUTES[3], post(handlers::pages::basic_submit))
        // JSON API
        .route(ROUTES[4], post(handlers::predict::handle_predict))
        .route(ROUTES[5], get(handlers::charts::form_spec))
        .route(ROUTES[6], get(handlers::charts::panel_options))
        .route(ROUTES[7], get(handlers::charts::univariate))
        .route(ROUTES[8], get(handlers::charts::bivariate))
        .route(ROUTES[9], get(handlers::charts::multivariate))
        .route(ROUTES[10], get(handlers::health::health_check))
        .route(ROUTES[11], get(handlers::health::readiness_check))
        .with_state(app_state);

    let router = match metrics {
        Some((endpoint, handle)) => app_routes.merge(
            Router::new()
                .route(&endpoint, get(handlers::metrics_handler::metrics))
                .with_state(handle),
        ),
        None => app_routes,
    };

    router.layer(TraceLayer::new_for_http())
}
