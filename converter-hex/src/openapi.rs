//! OpenAPI document for the HTTP API.

#![allow(dead_code)] // Path functions are only used by utoipa for documentation generation

use converter_types::domain::{ConversionResult, ExchangeRate};
use converter_types::dto::{ConvertRequest, ErrorResponse, HealthResponse};
use utoipa::OpenApi;

// Dummy functions to generate path documentation
// These are not the actual handlers, just for OpenAPI path generation

/// Health check endpoint
#[utoipa::path(
    get,
    path = "/health",
    tag = "health",
    responses(
        (status = 200, description = "Service is up", body = HealthResponse, example = json!({"status": "OK"}))
    )
)]
async fn health() {}

/// Convert an amount between two currencies
#[utoipa::path(
    post,
    path = "/api/convert",
    tag = "conversion",
    request_body = ConvertRequest,
    responses(
        (status = 200, description = "Conversion result", body = inline(serde_json::Value), example = json!({
            "success": true,
            "data": {
                "amount": 100.0,
                "from_currency": "USD",
                "to_currency": "EUR",
                "exchange_rate": 0.85,
                "converted_amount": 85.0
            }
        })),
        (status = 422, description = "Invalid amount or currency code", body = ErrorResponse),
        (status = 500, description = "Exchange rate could not be fetched", body = ErrorResponse)
    )
)]
async fn convert() {}

/// Current exchange rate for a currency pair
#[utoipa::path(
    get,
    path = "/api/rates/{from}/{to}",
    tag = "conversion",
    params(
        ("from" = String, Path, description = "Source currency code", example = "USD"),
        ("to" = String, Path, description = "Target currency code", example = "EUR")
    ),
    responses(
        (status = 200, description = "Exchange rate", body = inline(serde_json::Value)),
        (status = 422, description = "Invalid currency code", body = ErrorResponse),
        (status = 500, description = "Exchange rate could not be fetched", body = ErrorResponse)
    )
)]
async fn get_rate() {}

/// OpenAPI documentation for the Currency Converter API.
#[derive(OpenApi)]
#[openapi(
    info(
        title = "Currency Converter API",
        version = "1.0.0",
        description = "Converts amounts between currencies using live exchange rates.\n\nRates are cached per currency pair for an hour. Converted amounts are rounded half-up to two decimal places.",
        license(name = "MIT"),
    ),
    paths(health, convert, get_rate),
    components(
        schemas(
            ConvertRequest,
            ConversionResult,
            ExchangeRate,
            ErrorResponse,
            HealthResponse,
        )
    ),
    tags(
        (name = "health", description = "Health check endpoints"),
        (name = "conversion", description = "Currency conversion and rate lookup"),
    )
)]
pub struct ApiDoc;
