use std::sync::Arc;

use axum::{routing::get, Router};
use axum_prometheus::PrometheusMetricLayer;
use tower_http::cors::CorsLayer;
use tower_http::services::{ServeDir, ServeFile};
use tower_http::trace::TraceLayer;
use tracing::info;
use tracing_subscriber::EnvFilter;

use preview_server::config::Config;
use preview_server::handlers;
use preview_server::preview::HttpFetcher;
use preview_server::state::AppState;

#[tokio::main]
async fn main() {
    // Load configuration first so APP_ENV from .env picks the log format.
    let config = Config::from_env();

    // Initialize tracing: JSON in production, human-readable in dev.
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new("preview_server=info,tower_http=info"));

    let is_production = config.as_ref().map(|c| c.is_production).unwrap_or(false);
    if is_production {
        tracing_subscriber::fmt()
            .json()
            .with_env_filter(filter)
            .init();
    } else {
        tracing_subscriber::fmt().with_env_filter(filter).init();
    }

    info!("🚀 Preview Server starting...");

    let config = config.expect("Failed to load configuration");
    info!("📝 Configuration loaded");

    let fetcher = HttpFetcher::with_options(config.fetch_timeout, config.block_private_addresses)
        .expect("Failed to build outbound HTTP client");
    info!(
        timeout_ms = config.fetch_timeout.as_millis() as u64,
        "🌐 Outbound fetcher ready"
    );

    if config.block_private_addresses {
        info!("🔒 Private address guard: enabled");
    } else {
        tracing::warn!(
            "🔓 Private address guard: disabled. \
             Previews may reach internal hosts. \
             Set BLOCK_PRIVATE_ADDRESSES=true when exposed publicly."
        );
    }

    let app_state = AppState {
        fetcher: Arc::new(fetcher),
        block_private_addresses: config.block_private_addresses,
    };

    // Built UI, with index.html answering every unknown path.
    let index = config.static_dir.join("index.html");
    let static_files = ServeDir::new(&config.static_dir).fallback(ServeFile::new(index));
    info!("📂 Static directory: {}", config.static_dir.display());

    // Prometheus metrics layer
    let (prometheus_layer, metric_handle) = PrometheusMetricLayer::pair();

    // Build router
    let app = Router::new()
        // Health check + metrics
        .route("/health", get(handlers::health_check))
        .route(
            "/metrics",
            get(move || async move { metric_handle.render() }),
        )
        // Preview API
        .route("/api/preview", get(handlers::preview::get_preview))
        // Single-page app
        .fallback_service(static_files)
        // Middleware
        .layer(prometheus_layer)
        .layer(TraceLayer::new_for_http())
        .layer(CorsLayer::permissive())
        .with_state(app_state);

    let addr = config.server_addr();
    info!("🎧 Server listening on http://{}", addr);

    let listener = tokio::net::TcpListener::bind(&addr)
        .await
        .expect("Failed to bind to address");

    axum::serve(listener, app)
        .await
        .expect("Server failed to start");
}
