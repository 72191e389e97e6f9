//! # Converter Application
//!
//! Binary that wires together all the components:
//! - Load configuration from environment
//! - Build the rate provider, rate cache and metrics emitter
//! - Create the conversion service
//! - Start the HTTP server

mod config;

use std::sync::Arc;

use opentelemetry::global;
use opentelemetry_sdk::{propagation::TraceContextPropagator, trace as sdktrace};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use converter_hex::{ConversionService, inbound::HttpServer};
use converter_metrics::InfluxEmitter;
use converter_types::{ExchangeRate, MetricsEmitter, RateProvider};
use exchange_rates::{HttpRateProvider, RateCache, StaticRateProvider};

use config::{Config, ProviderKind};

fn init_tracer(endpoint: &str) -> anyhow::Result<(sdktrace::Tracer, sdktrace::SdkTracerProvider)> {
    use opentelemetry_otlp::WithExportConfig;

    global::set_text_map_propagator(TraceContextPropagator::new());

    // Use gRPC exporter with batch processing (non-blocking)
    let exporter = opentelemetry_otlp::SpanExporter::builder()
        .with_tonic()
        .with_endpoint(endpoint)
        .build()?;

    let provider = sdktrace::SdkTracerProvider::builder()
        .with_batch_exporter(exporter)
        .build();

    global::set_tracer_provider(provider.clone());

    use opentelemetry::trace::TracerProvider as _;
    Ok((provider.tracer("currency-converter"), provider))
}

async fn serve<P: RateProvider, M: MetricsEmitter>(
    config: &Config,
    provider: P,
    metrics: M,
) -> anyhow::Result<()> {
    let cache = Arc::new(RateCache::<ExchangeRate>::new(config.cache_ttl));
    let service = ConversionService::new(provider, cache, metrics);

    let server = HttpServer::new(service);
    let addr = format!("0.0.0.0:{}", config.port);

    server.run(&addr).await
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Load environment variables
    dotenvy::dotenv().ok();

    let config = Config::from_env()?;

    let otel = config
        .otlp_endpoint
        .as_deref()
        .map(init_tracer)
        .transpose()?;
    let telemetry = otel
        .as_ref()
        .map(|(tracer, _)| tracing_opentelemetry::layer().with_tracer(tracer.clone()));

    // Initialize tracing subscriber
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "info,converter_app=debug,converter_hex=debug".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .with(telemetry)
        .init();

    tracing::info!("Starting currency converter on port {}", config.port);
    tracing::info!(
        provider = ?config.provider,
        base_url = %config.rates.base_url,
        rate_field = %config.rates.rate_field,
        cache_ttl_secs = config.cache_ttl.as_secs(),
        "Rate pipeline configured"
    );

    let metrics = InfluxEmitter::new(config.influx.clone());

    match config.provider {
        ProviderKind::Http => {
            let provider = HttpRateProvider::new(config.rates.clone())?;
            serve(&config, provider, metrics).await?;
        }
        ProviderKind::Static => {
            tracing::warn!("Using the static development rate table");
            serve(&config, StaticRateProvider::new(), metrics).await?;
        }
    }

    // Ensure traces are flushed before exit
    if let Some((_, provider)) = otel {
        let _ = provider.shutdown();
    }
    Ok(())
}
