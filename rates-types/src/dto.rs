//! Wire-level payloads and their mapping to the domain.
//!
//! The success shape mirrors the upstream provider's historical-rates
//! JSON contract, and doubles as this service's own response body so the
//! externally visible format matches what the provider would have sent.

use std::collections::BTreeMap;

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use rust_decimal::prelude::{FromPrimitive, ToPrimitive};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

use crate::domain::{CurrencyCode, DATE_FORMAT, RateSnapshot, parse_rate_day};
use crate::error::DomainError;

// ─────────────────────────────────────────────────────────────────────────────
// Provider payloads
// ─────────────────────────────────────────────────────────────────────────────

/// Success body of a historical-rates lookup.
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct RatesResponse {
    pub success: bool,
    #[serde(default)]
    pub historical: bool,
    /// Calendar day in YYYY-MM-DD form.
    #[schema(example = "2024-01-15")]
    pub date: String,
    /// Unix seconds of the upstream quotation.
    pub timestamp: i64,
    /// Base currency the rates are quoted against.
    #[schema(example = "EUR")]
    pub base: String,
    /// Target currency code to rate.
    #[serde(default)]
    pub rates: BTreeMap<String, f64>,
}

/// Error body returned by the provider.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ProviderErrorResponse {
    pub success: bool,
    pub error: Option<ProviderErrorDetail>,
}

/// The provider's machine-readable error detail.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ProviderErrorDetail {
    pub code: u32,
    #[serde(rename = "type")]
    pub kind: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub info: Option<String>,
}

// ─────────────────────────────────────────────────────────────────────────────
// Assembly: provider payload <-> snapshot
// ─────────────────────────────────────────────────────────────────────────────

impl RateSnapshot {
    /// Builds a snapshot from a provider success payload.
    ///
    /// # Validation
    /// - `success` must be true
    /// - date and base must be present and well-formed
    ///
    /// Entries with a malformed currency code or a non-positive rate are
    /// skipped rather than failing the whole payload; rates are converted
    /// to their shortest exact decimal representation so no precision is
    /// lost against the upstream floating-point value.
    pub fn from_provider(
        payload: &RatesResponse,
        fetched_at: DateTime<Utc>,
    ) -> Result<Self, DomainError> {
        if !payload.success {
            return Err(DomainError::UnsuccessfulPayload);
        }
        if payload.date.trim().is_empty() {
            return Err(DomainError::MissingField("date"));
        }
        if payload.base.trim().is_empty() {
            return Err(DomainError::MissingField("base"));
        }

        let date = parse_rate_day(&payload.date)?;
        let base = CurrencyCode::parse(&payload.base)?;

        let mut snapshot = RateSnapshot::new(date, base).with_fetched_at(fetched_at);
        for (symbol, value) in &payload.rates {
            let Ok(code) = CurrencyCode::parse(symbol) else {
                tracing::warn!(symbol = %symbol, "skipping rate entry with malformed currency code");
                continue;
            };
            let Some(rate) = Decimal::from_f64(*value) else {
                tracing::warn!(symbol = %symbol, value = *value, "skipping rate entry with non-finite value");
                continue;
            };
            if snapshot.insert_rate(code, rate).is_err() {
                tracing::warn!(symbol = %symbol, value = *value, "skipping rate entry with non-positive value");
            }
        }
        Ok(snapshot)
    }
}

impl RatesResponse {
    /// Renders a cached snapshot in the provider's success shape.
    pub fn from_snapshot(snapshot: &RateSnapshot) -> Self {
        let rates = snapshot
            .rates()
            .iter()
            .filter_map(|(code, rate)| rate.to_f64().map(|v| (code.to_string(), v)))
            .collect();

        Self {
            success: true,
            historical: true,
            date: snapshot.date().format(DATE_FORMAT).to_string(),
            timestamp: snapshot
                .fetched_at()
                .map(|at| at.timestamp())
                .unwrap_or_else(|| Utc::now().timestamp()),
            base: snapshot.base().to_string(),
            rates,
        }
    }
}

// ─────────────────────────────────────────────────────────────────────────────
// Client-error body
// ─────────────────────────────────────────────────────────────────────────────

/// Structured error body returned to clients.
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct ErrorBody {
    /// Local time the error was produced, `YYYY-MM-DDTHH:MM:SS`.
    pub timestamp: String,
    pub status: u16,
    /// Short status label, e.g. "Bad Request".
    pub error: String,
    /// Machine-readable code, e.g. "INVALID_DATE".
    pub error_code: String,
    pub message: String,
    pub description: String,
    /// The request path that produced the error.
    pub path: String,
}

impl ErrorBody {
    pub fn new(
        status: u16,
        error: impl Into<String>,
        error_code: impl Into<String>,
        message: impl Into<String>,
        description: impl Into<String>,
        path: impl Into<String>,
    ) -> Self {
        Self {
            timestamp: Utc::now().format("%Y-%m-%dT%H:%M:%S").to_string(),
            status,
            error: error.into(),
            error_code: error_code.into(),
            message: message.into(),
            description: description.into(),
            path: path.into(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;

    fn payload(rates: &[(&str, f64)]) -> RatesResponse {
        RatesResponse {
            success: true,
            historical: true,
            date: "2024-01-15".into(),
            timestamp: 1_705_276_800,
            base: "EUR".into(),
            rates: rates.iter().map(|(c, v)| (c.to_string(), *v)).collect(),
        }
    }

    #[test]
    fn test_from_provider_builds_snapshot() {
        let snapshot = RateSnapshot::from_provider(
            &payload(&[("USD", 1.0876), ("GBP", 0.8551)]),
            Utc::now(),
        )
        .unwrap();

        assert_eq!(snapshot.base().as_str(), "EUR");
        assert_eq!(snapshot.len(), 2);
        assert_eq!(
            snapshot.rate(CurrencyCode::parse("USD").unwrap()),
            Some(dec!(1.0876))
        );
    }

    #[test]
    fn test_from_provider_rejects_unsuccessful_payload() {
        let mut bad = payload(&[("USD", 1.0876)]);
        bad.success = false;

        assert!(matches!(
            RateSnapshot::from_provider(&bad, Utc::now()),
            Err(DomainError::UnsuccessfulPayload)
        ));
    }

    #[test]
    fn test_from_provider_rejects_missing_date_and_base() {
        let mut no_date = payload(&[]);
        no_date.date = "".into();
        assert!(matches!(
            RateSnapshot::from_provider(&no_date, Utc::now()),
            Err(DomainError::MissingField("date"))
        ));

        let mut no_base = payload(&[]);
        no_base.base = "".into();
        assert!(matches!(
            RateSnapshot::from_provider(&no_base, Utc::now()),
            Err(DomainError::MissingField("base"))
        ));
    }

    #[test]
    fn test_from_provider_rejects_unparsable_date() {
        let mut bad = payload(&[]);
        bad.date = "2024-13-01".into();
        assert!(matches!(
            RateSnapshot::from_provider(&bad, Utc::now()),
            Err(DomainError::InvalidDate(_))
        ));
    }

    #[test]
    fn test_from_provider_skips_invalid_entries() {
        let snapshot = RateSnapshot::from_provider(
            &payload(&[("USD", 1.0876), ("BAD1", 2.0), ("JPY", -5.0), ("ZAR", 0.0)]),
            Utc::now(),
        )
        .unwrap();

        assert_eq!(snapshot.len(), 1);
        assert!(snapshot.rate(CurrencyCode::parse("USD").unwrap()).is_some());
    }

    #[test]
    fn test_round_trip_preserves_every_pair_exactly() {
        let original = payload(&[
            ("USD", 1.087654321),
            ("GBP", 0.8551),
            ("JPY", 161.23),
            ("CHF", 0.1),
        ]);

        let snapshot = RateSnapshot::from_provider(&original, Utc::now()).unwrap();
        let rendered = RatesResponse::from_snapshot(&snapshot);

        assert!(rendered.success);
        assert!(rendered.historical);
        assert_eq!(rendered.date, original.date);
        assert_eq!(rendered.base, original.base);
        assert_eq!(rendered.rates, original.rates);

        // Exact decimal equality as well, not just f64 round-trip.
        for (code, value) in &original.rates {
            let stored = snapshot.rate(CurrencyCode::parse(code).unwrap()).unwrap();
            assert_eq!(stored, Decimal::from_f64(*value).unwrap());
        }
    }

    #[test]
    fn test_shortest_representation_keeps_decimal_clean() {
        let snapshot =
            RateSnapshot::from_provider(&payload(&[("CHF", 0.1)]), Utc::now()).unwrap();

        let stored = snapshot.rate(CurrencyCode::parse("CHF").unwrap()).unwrap();
        assert_eq!(stored, dec!(0.1));
        assert_eq!(stored.to_string(), "0.1");
    }

    #[test]
    fn test_response_timestamp_uses_fetch_time() {
        let fetched_at = DateTime::from_timestamp(1_705_276_800, 0).unwrap();
        let snapshot =
            RateSnapshot::from_provider(&payload(&[("USD", 1.0876)]), fetched_at).unwrap();

        let rendered = RatesResponse::from_snapshot(&snapshot);
        assert_eq!(rendered.timestamp, 1_705_276_800);
    }
}
