//! OpenAPI specification and documentation.

#![allow(dead_code)] // Path functions are only used by utoipa for documentation generation

use rates_types::domain::CurrencyCode;
use rates_types::dto::{ErrorBody, RatesResponse};
use utoipa::OpenApi;

// Dummy functions to generate path documentation
// These are not the actual handlers, just for OpenAPI path generation

/// Health check endpoint
#[utoipa::path(
    get,
    path = "/health",
    tag = "health",
    responses(
        (status = 200, description = "Service is healthy", body = inline(serde_json::Value), example = json!({"status": "healthy"}))
    )
)]
async fn health() {}

/// Get exchange rates for a specific day
#[utoipa::path(
    get,
    path = "/api/v1/rates/{day}",
    tag = "rates",
    params(
        ("day" = String, Path, description = "Calendar day in YYYY-MM-DD format"),
        ("access_key" = String, Query, description = "Provider API key"),
        ("symbols" = Option<String>, Query, description = "Comma-separated 3-letter currency codes (default: USD,GBP,CAD)"),
        ("base" = Option<String>, Query, description = "Base currency code (default: EUR)")
    ),
    responses(
        (status = 200, description = "Exchange rates for the day, served from cache where possible", body = RatesResponse),
        (status = 400, description = "Invalid date, symbol or missing access key", body = ErrorBody),
        (status = 502, description = "Upstream provider failure", body = ErrorBody)
    )
)]
async fn get_rates() {}

/// Drop cached rates for a day and base currency
#[utoipa::path(
    delete,
    path = "/api/v1/rates/{day}",
    tag = "rates",
    params(
        ("day" = String, Path, description = "Calendar day in YYYY-MM-DD format"),
        ("base" = Option<String>, Query, description = "Base currency code (default: EUR)")
    ),
    responses(
        (status = 204, description = "Cached rates removed"),
        (status = 404, description = "Nothing cached for the key", body = ErrorBody)
    )
)]
async fn invalidate() {}

/// OpenAPI documentation for the Rates API.
#[derive(OpenApi)]
#[openapi(
    info(
        title = "Exchange Rates Cache API",
        version = "1.0.0",
        description = "Serves daily currency exchange rates, caching upstream provider responses per (date, base currency) and fetching only missing symbols.",
    ),
    paths(
        health,
        get_rates,
        invalidate,
    ),
    components(
        schemas(
            RatesResponse,
            ErrorBody,
            CurrencyCode,
        )
    ),
    tags(
        (name = "health", description = "Health check endpoints"),
        (name = "rates", description = "Cached exchange-rate lookups and invalidation"),
    )
)]
pub struct ApiDoc;
