//! HTTP request handlers.

use std::sync::Arc;

use axum::{
    Json,
    extract::{OriginalUri, Path, Query, State},
    http::StatusCode,
    response::{IntoResponse, Response},
};
use serde::Deserialize;

use rates_types::{
    AppError, CurrencyCode, ErrorBody, RateProvider, RateStore, RatesResponse, parse_rate_day,
    parse_symbol_list,
};

use crate::service::{RatesRequest, RatesService};

/// Symbols used when the caller does not name any.
pub const DEFAULT_SYMBOLS: &str = "USD,GBP,CAD";
/// Base currency used when the caller does not name one. This service's
/// own default; callers should not assume it matches the upstream's.
pub const DEFAULT_BASE: &str = "EUR";

/// Application state shared across handlers.
pub struct AppState<S: RateStore, P: RateProvider> {
    pub service: RatesService<S, P>,
}

/// An application error bound to the request path, so the structured
/// error body can report where it happened.
pub struct ApiError {
    error: AppError,
    path: String,
}

impl ApiError {
    pub fn new(error: impl Into<AppError>, path: &str) -> Self {
        Self {
            error: error.into(),
            path: path.to_string(),
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let (status, error_code, message, description) = match self.error {
            AppError::BadRequest {
                code,
                message,
                description,
            } => (StatusCode::BAD_REQUEST, code, message, description),
            AppError::NotFound(message) => (
                StatusCode::NOT_FOUND,
                "NOT_FOUND",
                message,
                "The requested resource does not exist".to_string(),
            ),
            AppError::UpstreamUnavailable(message) => (
                StatusCode::BAD_GATEWAY,
                "UPSTREAM_FAILURE",
                "Failed to fetch exchange rates from the upstream provider".to_string(),
                message,
            ),
            AppError::Internal(message) => (
                StatusCode::INTERNAL_SERVER_ERROR,
                "INTERNAL_ERROR",
                "An unexpected error occurred".to_string(),
                message,
            ),
        };

        let body = ErrorBody::new(
            status.as_u16(),
            status.canonical_reason().unwrap_or("Error"),
            error_code,
            message,
            description,
            self.path,
        );

        (status, Json(body)).into_response()
    }
}

/// Health check endpoint.
pub async fn health() -> impl IntoResponse {
    Json(serde_json::json!({ "status": "healthy" }))
}

#[derive(Debug, Deserialize)]
pub struct RatesParams {
    pub symbols: Option<String>,
    pub access_key: Option<String>,
    pub base: Option<String>,
}

/// Get exchange rates for a specific day.
///
/// Example: `GET /api/v1/rates/2024-01-15?access_key=KEY&symbols=USD,GBP`
#[tracing::instrument(skip(state, params), fields(day = %day))]
pub async fn get_rates<S: RateStore, P: RateProvider>(
    State(state): State<Arc<AppState<S, P>>>,
    OriginalUri(uri): OriginalUri,
    Path(day): Path<String>,
    Query(params): Query<RatesParams>,
) -> Result<Json<RatesResponse>, ApiError> {
    let path = uri.path();

    let access_key = params
        .access_key
        .filter(|key| !key.trim().is_empty())
        .ok_or_else(|| {
            ApiError::new(
                AppError::bad_request(
                    "MISSING_PARAMETER",
                    "API key is required",
                    "The 'access_key' query parameter is required. \
                     Example: /api/v1/rates/2024-01-15?access_key=YOUR_API_KEY",
                ),
                path,
            )
        })?;

    let date = parse_rate_day(&day).map_err(|e| ApiError::new(e, path))?;
    let base = CurrencyCode::parse(params.base.as_deref().unwrap_or(DEFAULT_BASE))
        .map_err(|e| ApiError::new(e, path))?;
    let symbols = parse_symbol_list(params.symbols.as_deref().unwrap_or(DEFAULT_SYMBOLS))
        .map_err(|e| ApiError::new(e, path))?;

    let response = state
        .service
        .get_rates(RatesRequest {
            date,
            base,
            symbols,
            access_key,
        })
        .await
        .map_err(|e| ApiError::new(e, path))?;

    Ok(Json(response))
}

#[derive(Debug, Deserialize)]
pub struct InvalidateParams {
    pub base: Option<String>,
}

/// Drop cached rates for a day and base currency.
#[tracing::instrument(skip(state, params), fields(day = %day))]
pub async fn invalidate<S: RateStore, P: RateProvider>(
    State(state): State<Arc<AppState<S, P>>>,
    OriginalUri(uri): OriginalUri,
    Path(day): Path<String>,
    Query(params): Query<InvalidateParams>,
) -> Result<StatusCode, ApiError> {
    let path = uri.path();

    let date = parse_rate_day(&day).map_err(|e| ApiError::new(e, path))?;
    let base = CurrencyCode::parse(params.base.as_deref().unwrap_or(DEFAULT_BASE))
        .map_err(|e| ApiError::new(e, path))?;

    let removed = state
        .service
        .invalidate(date, base)
        .await
        .map_err(|e| ApiError::new(e, path))?;

    if removed {
        Ok(StatusCode::NO_CONTENT)
    } else {
        Err(ApiError::new(
            AppError::NotFound(format!("No cached rates for {day} / {base}")),
            path,
        ))
    }
}
