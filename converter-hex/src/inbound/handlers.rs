//! HTTP request handlers.

use std::sync::Arc;

use axum::{
    Json,
    extract::{Path, State, rejection::JsonRejection},
    http::StatusCode,
    response::{IntoResponse, Response},
};
use utoipa::OpenApi;

use converter_types::{
    ApiResponse, ConversionError, ConvertRequest, ErrorResponse, HealthResponse, MetricsEmitter,
    RateProvider,
};

use crate::ConversionService;
use crate::openapi::ApiDoc;

/// Message returned for failures that carry nothing useful for the caller.
pub const GENERIC_ERROR_MESSAGE: &str = "An unexpected error occurred";

/// Application state shared across handlers.
pub struct AppState<P: RateProvider, M: MetricsEmitter> {
    pub service: ConversionService<P, M>,
}

/// Error wrapper that renders the `{success: false, message}` envelope.
#[derive(Debug)]
pub enum ApiError {
    Conversion(ConversionError),
    /// Request body was missing, not JSON, or of the wrong shape.
    InvalidBody(String),
}

impl From<ConversionError> for ApiError {
    fn from(err: ConversionError) -> Self {
        ApiError::Conversion(err)
    }
}

impl From<JsonRejection> for ApiError {
    fn from(rejection: JsonRejection) -> Self {
        ApiError::InvalidBody(rejection.body_text())
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let (status, message) = match self {
            ApiError::InvalidBody(msg) => (StatusCode::UNPROCESSABLE_ENTITY, msg),
            ApiError::Conversion(err) => match &err {
                ConversionError::Validation(e) => (StatusCode::UNPROCESSABLE_ENTITY, e.to_string()),
                ConversionError::RateUnavailable(_) => {
                    (StatusCode::INTERNAL_SERVER_ERROR, err.to_string())
                }
                ConversionError::Internal(_) => (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    GENERIC_ERROR_MESSAGE.to_string(),
                ),
            },
        };

        (status, Json(ErrorResponse::new(message))).into_response()
    }
}

/// Health check endpoint.
pub async fn health() -> impl IntoResponse {
    Json(HealthResponse {
        status: "OK".into(),
    })
}

/// Convert an amount between two currencies.
#[tracing::instrument(skip_all)]
pub async fn convert<P: RateProvider, M: MetricsEmitter>(
    State(state): State<Arc<AppState<P, M>>>,
    body: Result<Json<ConvertRequest>, JsonRejection>,
) -> Result<impl IntoResponse, ApiError> {
    let Json(req) = body?;
    tracing::debug!(
        amount = %req.amount,
        from = %req.from_currency,
        to = %req.to_currency,
        "Conversion requested"
    );

    let result = state
        .service
        .convert(req.amount, &req.from_currency, &req.to_currency)
        .await?;
    Ok(Json(ApiResponse::ok(result)))
}

/// Current rate for a currency pair.
#[tracing::instrument(skip(state))]
pub async fn get_rate<P: RateProvider, M: MetricsEmitter>(
    State(state): State<Arc<AppState<P, M>>>,
    Path((from, to)): Path<(String, String)>,
) -> Result<impl IntoResponse, ApiError> {
    let rate = state.service.get_exchange_rate(&from, &to).await?;
    Ok(Json(ApiResponse::ok(rate)))
}

/// Serves the OpenAPI document.
pub async fn openapi_json() -> impl IntoResponse {
    Json(ApiDoc::openapi())
}
