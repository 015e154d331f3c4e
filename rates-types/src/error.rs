//! Error types for the exchange-rate cache service.

use rust_decimal::Decimal;

use crate::domain::CurrencyCode;

/// Domain-level errors (validation and mapping failures).
///
/// Detected before any I/O and never retried.
#[derive(Debug, thiserror::Error)]
pub enum DomainError {
    #[error("Invalid currency code: '{0}'. Expected 3 letters (e.g., USD, EUR, GBP)")]
    InvalidCurrency(String),

    #[error("Invalid date: '{0}'. Expected format: YYYY-MM-DD (e.g., 2024-01-15)")]
    InvalidDate(String),

    #[error("Missing required field: {0}")]
    MissingField(&'static str),

    #[error("Rate for {target} must be positive, got {rate}")]
    NonPositiveRate { target: CurrencyCode, rate: Decimal },

    #[error("Unsuccessful provider payload cannot be converted")]
    UnsuccessfulPayload,

    #[error("Validation error: {0}")]
    Validation(String),
}

/// Store-level errors (data access failures).
#[derive(Debug, thiserror::Error)]
pub enum RepoError {
    #[error(transparent)]
    Domain(#[from] DomainError),

    #[error("Database error: {0}")]
    Database(String),

    #[error("Transaction error: {0}")]
    Transaction(String),

    #[error("Entity not found")]
    NotFound,
}

/// Provider-client errors.
///
/// Transient upstream failures are retried inside the client; callers
/// only ever observe the terminal variants below.
#[derive(Debug, thiserror::Error)]
pub enum ProviderError {
    #[error("Access key must not be empty")]
    InvalidKey,

    #[error("Provider rejected the request ({status:?}): {detail}")]
    Rejected { status: Option<u16>, detail: String },

    #[error("Provider unavailable after {attempts} attempts: {detail}")]
    Unavailable { attempts: u32, detail: String },

    #[error("Malformed provider response: {0}")]
    Malformed(String),
}

/// Application-level errors (for HTTP responses).
///
/// Maps cleanly to HTTP status codes and the structured error body: a
/// bad request is distinguishable from an upstream dependency failure.
#[derive(Debug, thiserror::Error)]
pub enum AppError {
    #[error("{message}")]
    BadRequest {
        code: &'static str,
        message: String,
        description: String,
    },

    #[error("Not found: {0}")]
    NotFound(String),

    #[error("Upstream provider failure: {0}")]
    UpstreamUnavailable(String),

    #[error("Internal error: {0}")]
    Internal(String),
}

impl AppError {
    /// Convenience constructor for client errors.
    pub fn bad_request(
        code: &'static str,
        message: impl Into<String>,
        description: impl Into<String>,
    ) -> Self {
        AppError::BadRequest {
            code,
            message: message.into(),
            description: description.into(),
        }
    }
}

impl From<DomainError> for AppError {
    fn from(err: DomainError) -> Self {
        let code = match &err {
            DomainError::InvalidCurrency(_) => "INVALID_CURRENCY",
            DomainError::InvalidDate(_) => "INVALID_DATE",
            DomainError::MissingField(_) => "MISSING_PARAMETER",
            DomainError::NonPositiveRate { .. } => "INVALID_RATE",
            DomainError::UnsuccessfulPayload => "INVALID_PAYLOAD",
            DomainError::Validation(_) => "INVALID_SYMBOL",
        };
        let message = err.to_string();
        AppError::BadRequest {
            code,
            message,
            description: "The provided argument is invalid or malformed".into(),
        }
    }
}

impl From<RepoError> for AppError {
    fn from(err: RepoError) -> Self {
        match err {
            RepoError::Domain(e) => e.into(),
            RepoError::NotFound => AppError::NotFound("Resource not found".into()),
            RepoError::Database(e) => AppError::Internal(e),
            RepoError::Transaction(e) => AppError::Internal(e),
        }
    }
}

impl From<ProviderError> for AppError {
    fn from(err: ProviderError) -> Self {
        match err {
            ProviderError::InvalidKey => AppError::bad_request(
                "MISSING_PARAMETER",
                "API key is required",
                "The 'access_key' parameter cannot be empty. Please provide a valid provider API key.",
            ),
            other => AppError::UpstreamUnavailable(other.to_string()),
        }
    }
}
