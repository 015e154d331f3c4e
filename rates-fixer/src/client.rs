//! HTTP client for the Fixer.io historical-rates endpoint.

use std::time::Duration;

use dashmap::DashSet;
use reqwest::StatusCode;
use tracing::{debug, info, warn};

use rates_types::{
    CurrencyCode, FetchRequest, ProviderError, ProviderErrorDetail, ProviderErrorResponse,
    RateProvider, RatesResponse,
};

use crate::policy::{self, ErrorClass, FetchMode, Step};

/// Production endpoint for historical lookups.
pub const DEFAULT_BASE_URL: &str = "https://data.fixer.io/api";

const CONNECT_TIMEOUT: Duration = Duration::from_secs(5);
const REQUEST_TIMEOUT: Duration = Duration::from_secs(10);

/// Backoff configuration for transient failures.
#[derive(Debug, Clone)]
pub struct RetryPolicy {
    /// Retries after the first attempt; total attempts = max_retries + 1.
    pub max_retries: u32,
    pub initial_backoff: Duration,
    pub multiplier: f64,
    pub max_backoff: Duration,
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self {
            max_retries: 3,
            initial_backoff: Duration::from_millis(500),
            multiplier: 1.5,
            max_backoff: Duration::from_secs(15),
        }
    }
}

impl RetryPolicy {
    fn next_backoff(&self, current: Duration) -> Duration {
        current.mul_f64(self.multiplier).min(self.max_backoff)
    }
}

/// One failed HTTP attempt, classified.
struct AttemptFailure {
    class: ErrorClass,
    status: Option<StatusCode>,
    detail: String,
}

/// Client for the provider's `GET /{date}` endpoint.
///
/// Keys observed to hit the plan-restriction error are remembered in a
/// concurrent set for the life of the client; all later calls for such a
/// key go straight to restricted mode. Requests carry bounded connect and
/// response timeouts; exceeding either counts as a transient failure.
pub struct FixerClient {
    http: reqwest::Client,
    base_url: String,
    retry: RetryPolicy,
    restricted_keys: DashSet<String>,
}

impl FixerClient {
    /// Creates a client against the given endpoint root.
    pub fn new(base_url: impl Into<String>) -> anyhow::Result<Self> {
        let http = reqwest::Client::builder()
            .connect_timeout(CONNECT_TIMEOUT)
            .timeout(REQUEST_TIMEOUT)
            .build()?;

        Ok(Self {
            http,
            base_url: base_url.into().trim_end_matches('/').to_string(),
            retry: RetryPolicy::default(),
            restricted_keys: DashSet::new(),
        })
    }

    /// Overrides the retry policy.
    pub fn with_retry(mut self, retry: RetryPolicy) -> Self {
        self.retry = retry;
        self
    }

    /// Pre-marks a key as plan-restricted (e.g. a known free-plan key),
    /// so it never attempts full mode at all.
    pub fn with_restricted_key(self, key: impl Into<String>) -> Self {
        self.restricted_keys.insert(key.into());
        self
    }

    /// Whether the key is currently remembered as plan-restricted.
    pub fn is_restricted(&self, key: &str) -> bool {
        self.restricted_keys.contains(key)
    }

    async fn attempt(
        &self,
        req: &FetchRequest,
        mode: FetchMode,
    ) -> Result<RatesResponse, AttemptFailure> {
        let url = format!("{}/{}", self.base_url, req.date.format("%Y-%m-%d"));
        let mut query: Vec<(&str, String)> = vec![("access_key", req.access_key.clone())];
        if mode == FetchMode::Full {
            let symbols = req
                .symbols
                .iter()
                .map(CurrencyCode::as_str)
                .collect::<Vec<_>>()
                .join(",");
            query.push(("base", req.base.to_string()));
            query.push(("symbols", symbols));
        }

        // The access key never reaches the logs; log date and mode instead.
        let response = match self.http.get(&url).query(&query).send().await {
            Ok(response) => response,
            Err(err) => {
                return Err(AttemptFailure {
                    class: policy::classify(None, None),
                    status: None,
                    detail: format!("network error: {err}"),
                });
            }
        };

        let status = response.status();
        let body = match response.text().await {
            Ok(body) => body,
            Err(err) => {
                return Err(AttemptFailure {
                    class: policy::classify(None, None),
                    status: Some(status),
                    detail: format!("failed to read response body: {err}"),
                });
            }
        };

        if status.is_success() {
            if let Ok(payload) = serde_json::from_str::<RatesResponse>(&body) {
                if payload.success {
                    return Ok(payload);
                }
            }
        }

        // Either an HTTP error, or a 2xx body flagged unsuccessful; the
        // provider reports both through the same error envelope.
        let detail = serde_json::from_str::<ProviderErrorResponse>(&body)
            .ok()
            .and_then(|e| e.error);
        let class = policy::classify(Some(status), detail.as_ref());
        Err(AttemptFailure {
            class,
            status: Some(status),
            detail: describe_failure(status, detail.as_ref()),
        })
    }
}

fn describe_failure(status: StatusCode, detail: Option<&ProviderErrorDetail>) -> String {
    match detail {
        Some(d) => format!(
            "provider error [{}] {}: {} (HTTP {})",
            d.code,
            d.kind,
            d.info.as_deref().unwrap_or("no detail"),
            status.as_u16(),
        ),
        None => format!("unsuccessful provider response (HTTP {})", status.as_u16()),
    }
}

#[async_trait::async_trait]
impl RateProvider for FixerClient {
    async fn fetch_rates(&self, req: &FetchRequest) -> Result<RatesResponse, ProviderError> {
        if req.access_key.trim().is_empty() {
            return Err(ProviderError::InvalidKey);
        }

        let mut mode = if self.restricted_keys.contains(&req.access_key) {
            FetchMode::Restricted
        } else {
            FetchMode::Full
        };

        let mut retries_used = 0u32;
        let mut attempts = 0u32;
        let mut backoff = self.retry.initial_backoff;

        loop {
            attempts += 1;
            debug!(date = %req.date, ?mode, attempt = attempts, "requesting rates from provider");

            let failure = match self.attempt(req, mode).await {
                Ok(payload) => {
                    info!(date = %req.date, rates = payload.rates.len(), "fetched rates from provider");
                    return Ok(payload);
                }
                Err(failure) => failure,
            };

            let retries_left = self.retry.max_retries - retries_used;
            match policy::next_step(mode, failure.class, retries_left) {
                Step::SwitchToRestricted => {
                    warn!(
                        date = %req.date,
                        "plan does not allow a base currency; switching key to restricted mode"
                    );
                    self.restricted_keys.insert(req.access_key.clone());
                    mode = FetchMode::Restricted;
                    // The one-shot mode switch re-sends immediately and
                    // spends no retry budget.
                }
                Step::Retry => {
                    retries_used += 1;
                    warn!(
                        date = %req.date,
                        delay_ms = backoff.as_millis() as u64,
                        detail = %failure.detail,
                        "transient provider failure; backing off"
                    );
                    tokio::time::sleep(backoff).await;
                    backoff = self.retry.next_backoff(backoff);
                }
                Step::GiveUp => {
                    return Err(match failure.class {
                        ErrorClass::Transient => ProviderError::Unavailable {
                            attempts,
                            detail: failure.detail,
                        },
                        _ => ProviderError::Rejected {
                            status: failure.status.map(|s| s.as_u16()),
                            detail: failure.detail,
                        },
                    });
                }
            }
        }
    }
}
