//! HTTP Server configuration and startup.

use std::sync::Arc;

use axum::{
    Router,
    routing::{get, post},
};
use tower_http::{cors::CorsLayer, trace::TraceLayer};

use converter_types::{MetricsEmitter, RateProvider};

use super::handlers::{self, AppState};
use crate::ConversionService;

/// HTTP Server for the Converter API.
pub struct HttpServer<P: RateProvider, M: MetricsEmitter> {
    state: Arc<AppState<P, M>>,
    http_metrics: bool,
}

impl<P: RateProvider, M: MetricsEmitter> HttpServer<P, M> {
    /// Creates a new HTTP server with the given service.
    pub fn new(service: ConversionService<P, M>) -> Self {
        Self {
            state: Arc::new(AppState { service }),
            http_metrics: true,
        }
    }

    /// Turns the OpenTelemetry HTTP metrics layer on or off.
    pub fn with_http_metrics(mut self, enabled: bool) -> Self {
        self.http_metrics = enabled;
        self
    }

    /// Builds the Axum router with all routes.
    pub fn router(&self) -> Router {
        let router = Router::new()
            .route("/health", get(handlers::health))
            .route("/api/convert", post(handlers::convert::<P, M>))
            .route("/api/rates/{from}/{to}", get(handlers::get_rate::<P, M>))
            .route("/api-docs/openapi.json", get(handlers::openapi_json));

        let router = if self.http_metrics {
            // Uses the globally set MeterProvider
            router.layer(axum_otel_metrics::HttpMetricsLayerBuilder::new().build())
        } else {
            router
        };

        router
            .layer(CorsLayer::permissive())
            .layer(TraceLayer::new_for_http())
            .with_state(self.state.clone())
    }

    /// Runs the server on the given address with graceful shutdown.
    pub async fn run(self, addr: &str) -> anyhow::Result<()> {
        let listener = tokio::net::TcpListener::bind(addr).await?;
        tracing::info!("Server listening on {}", listener.local_addr()?);

        axum::serve(listener, self.router())
            .with_graceful_shutdown(shutdown_signal())
            .await?;

        Ok(())
    }
}

async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = tokio::signal::ctrl_c().await {
            tracing::error!(error = %e, "Failed to listen for Ctrl+C");
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate()) {
            Ok(mut signal) => {
                signal.recv().await;
            }
            Err(e) => {
                tracing::error!(error = %e, "Failed to install SIGTERM handler");
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {},
        _ = terminate => {},
    }

    tracing::info!("Shutdown signal received, starting graceful shutdown...");
}
