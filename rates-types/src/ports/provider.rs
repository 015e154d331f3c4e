//! Upstream rate provider port.
//!
//! Implementations perform the outbound call to the exchange-rate
//! provider; retry and plan-fallback behavior live behind this trait.

use std::collections::BTreeSet;

use chrono::NaiveDate;

use crate::domain::CurrencyCode;
use crate::dto::RatesResponse;
use crate::error::ProviderError;

/// One upstream lookup: a day, a base currency, and the symbols wanted.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FetchRequest {
    pub date: NaiveDate,
    pub base: CurrencyCode,
    pub symbols: BTreeSet<CurrencyCode>,
    pub access_key: String,
}

/// Port trait for upstream rate providers.
///
/// Transient upstream failures are the implementation's problem; callers
/// observe either a success payload or a terminal [`ProviderError`].
#[async_trait::async_trait]
pub trait RateProvider: Send + Sync + 'static {
    /// Fetches rates for one day, limited to the requested symbols.
    async fn fetch_rates(&self, req: &FetchRequest) -> Result<RatesResponse, ProviderError>;
}
