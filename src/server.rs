//! HTTP Server and Metrics Collection
//!
//! This module implements the Prometheus exporter HTTP server and the collection loop.
//!
//! # Architecture
//!
//! - **HTTP Server**: Axum-based server exposing `/metrics`, `/health`, and `/` endpoints
//! - **Collection Loop**: Background task that runs one collection pass per interval
//! - **State Management**: Shared state (metrics, client) using Arc for thread-safety
//!
//! # Endpoints
//!
//! - `GET /` - HTML landing page with links to metrics and health
//! - `GET /metrics` - Prometheus metrics in text format
//! - `GET /health` - Health check (200 if the last pass could read `meta`, 503 otherwise)
//!
//! # Metrics Collection
//!
//! The loop fires immediately at startup and then every `scrape_interval_ms`.
//! Passes never overlap: a pass that overruns the interval delays the next tick.
//! After each pass `fedi_exporter_up` records whether `meta` was readable.
//!
//! # Error Handling
//!
//! Individual endpoint failures are logged as warnings but don't stop the pass.
//! Scrapes read the registry directly and may observe a pass half way through.

use crate::collectors::run_collection_pass;
use crate::config::Config;
use crate::fedi::ApiClient;
use crate::metrics::MetricsCollector;
use axum::{
    extract::State,
    response::{IntoResponse, Response},
    routing::get,
    Router,
};
use std::sync::Arc;
use tokio::time::{interval, Duration, MissedTickBehavior};
use tracing::{error, info};

/// State shared by the handlers and the collection loop
#[derive(Clone)]
pub struct AppState {
    pub metrics: MetricsCollector,
    pub client: Arc<ApiClient>,
}

pub async fn start(config: Config) -> anyhow::Result<()> {
    let metrics = MetricsCollector::new()?;
    let client = Arc::new(ApiClient::new(&config.api)?);

    let state = AppState {
        metrics: metrics.clone(),
        client: client.clone(),
    };

    // Start background metrics collection
    let collection_state = state.clone();
    let period = Duration::from_millis(config.metrics.scrape_interval_ms);
    tokio::spawn(async move {
        collect_metrics_loop(collection_state, period).await;
    });

    let app = router(state);

    // Start the server
    let addr = format!("{}:{}", config.server.addr, config.server.port);
    let listener = tokio::net::TcpListener::bind(&addr).await?;

    info!("Metrics server listening on {}", addr);
    info!("Metrics available at http://{}/metrics", addr);

    axum::serve(listener, app).await?;

    Ok(())
}

/// Routes for `/`, `/metrics` and `/health`
pub fn router(state: AppState) -> Router {
    Router::new()
        .route("/", get(root_handler))
        .route("/metrics", get(metrics_handler))
        .route("/health", get(health_handler))
        .with_state(state)
}

async fn collect_metrics_loop(state: AppState, period: Duration) {
    let mut ticker = interval(period);
    ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);

    loop {
        ticker.tick().await;

        if let Err(e) = run_collection_pass(state.client.as_ref(), &state.metrics).await {
            error!("Failed to collect metrics: {:#}", e);
            state.metrics.up.set(0.0);
        } else {
            state.metrics.up.set(1.0);
        }
    }
}

async fn root_handler() -> impl IntoResponse {
    axum::response::Html(
        r#"<html>
<head><title>Fedi Exporter</title></head>
<body>
<h1>Misskey-family Prometheus Exporter</h1>
<p><a href="/metrics">Metrics</a></p>
<p><a href="/health">Health</a></p>
</body>
</html>"#,
    )
}

async fn metrics_handler(State(state): State<AppState>) -> Response {
    match state.metrics.render() {
        Ok(metrics) => metrics.into_response(),
        Err(e) => {
            error!("Failed to render metrics: {}", e);
            (
                axum::http::StatusCode::INTERNAL_SERVER_ERROR,
                format!("Error rendering metrics: {}", e),
            )
                .into_response()
        }
    }
}

async fn health_handler(State(state): State<AppState>) -> impl IntoResponse {
    let up_value = state.metrics.up.get();

    if up_value > 0.0 {
        (axum::http::StatusCode::OK, "OK")
    } else {
        (
            axum::http::StatusCode::SERVICE_UNAVAILABLE,
            "Instance API unreachable",
        )
    }
}
