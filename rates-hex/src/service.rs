//! Rates Application Service
//!
//! The cache-aside orchestrator: serves a (date, base, symbols) request
//! from the store where possible and calls the upstream provider only
//! for the symbol gap. Contains NO infrastructure logic - pure business
//! orchestration through the two ports.

use std::collections::BTreeSet;

use chrono::{NaiveDate, Utc};
use rust_decimal::Decimal;
use tracing::info;

use rates_types::{
    AppError, CurrencyCode, FetchRequest, RateProvider, RateSnapshot, RateStore, RatesResponse,
};

/// A validated rates request.
#[derive(Debug, Clone)]
pub struct RatesRequest {
    pub date: NaiveDate,
    pub base: CurrencyCode,
    pub symbols: BTreeSet<CurrencyCode>,
    pub access_key: String,
}

/// Application service for rate lookups.
///
/// Generic over `S: RateStore` and `P: RateProvider` - the adapters are
/// injected at compile time. This enables:
/// - Swapping the store or provider without code changes
/// - Testing with in-memory doubles
/// - Compile-time checks for port implementations
pub struct RatesService<S: RateStore, P: RateProvider> {
    store: S,
    provider: P,
}

impl<S: RateStore, P: RateProvider> RatesService<S, P> {
    /// Creates a new rates service with the given store and provider.
    pub fn new(store: S, provider: P) -> Self {
        Self { store, provider }
    }

    /// Returns a reference to the underlying store.
    pub fn store(&self) -> &S {
        &self.store
    }

    // ─────────────────────────────────────────────────────────────────────────────
    // Cache-aside retrieval
    // ─────────────────────────────────────────────────────────────────────────────

    /// Serves a rates request, fetching upstream only what the cache is
    /// missing.
    ///
    /// - No snapshot cached: fetch the full requested set, persist it,
    ///   return it.
    /// - Snapshot covers every requested symbol: return it as-is, zero
    ///   upstream calls.
    /// - Partial coverage: fetch exactly the missing symbols, merge into
    ///   the cached snapshot, persist the merge, return the combined
    ///   result.
    ///
    /// Provider failures propagate; no partial or stale data is returned
    /// on failure.
    pub async fn get_rates(&self, req: RatesRequest) -> Result<RatesResponse, AppError> {
        if req.symbols.is_empty() {
            return Err(AppError::bad_request(
                "INVALID_SYMBOL",
                "Symbols parameter cannot be empty",
                "Provide at least one 3-letter currency symbol, e.g. symbols=USD,GBP",
            ));
        }
        if req.access_key.trim().is_empty() {
            return Err(AppError::bad_request(
                "MISSING_PARAMETER",
                "API key is required",
                "The 'access_key' query parameter cannot be empty. Please provide a valid provider API key.",
            ));
        }

        match self.store.find(req.date, req.base).await? {
            None => {
                info!(date = %req.date, base = %req.base, "cache miss; fetching full symbol set");
                let snapshot = self.fetch_snapshot(&req, req.symbols.clone()).await?;
                self.store.save(&snapshot).await?;
                Ok(RatesResponse::from_snapshot(&snapshot))
            }
            Some(mut snapshot) => {
                let missing = snapshot.missing_symbols(&req.symbols);
                if missing.is_empty() {
                    info!(date = %req.date, base = %req.base, "cache hit; all requested symbols present");
                    return Ok(RatesResponse::from_snapshot(&snapshot));
                }

                info!(
                    date = %req.date,
                    base = %req.base,
                    missing = missing.len(),
                    "partial cache hit; fetching missing symbols"
                );
                let fetched = self.fetch_snapshot(&req, missing).await?;
                snapshot.merge(fetched);
                self.store.save(&snapshot).await?;
                Ok(RatesResponse::from_snapshot(&snapshot))
            }
        }
    }

    async fn fetch_snapshot(
        &self,
        req: &RatesRequest,
        symbols: BTreeSet<CurrencyCode>,
    ) -> Result<RateSnapshot, AppError> {
        let fetch = FetchRequest {
            date: req.date,
            base: req.base,
            symbols,
            access_key: req.access_key.clone(),
        };
        let payload = self.provider.fetch_rates(&fetch).await?;
        RateSnapshot::from_provider(&payload, Utc::now()).map_err(Into::into)
    }

    // ─────────────────────────────────────────────────────────────────────────────
    // Cache inspection & invalidation
    // ─────────────────────────────────────────────────────────────────────────────

    /// Looks up one cached rate without touching the provider.
    pub async fn rate_for(
        &self,
        date: NaiveDate,
        base: CurrencyCode,
        target: CurrencyCode,
    ) -> Result<Option<Decimal>, AppError> {
        self.store
            .find_rate(date, base, target)
            .await
            .map_err(Into::into)
    }

    /// Whether any snapshot is cached for the key.
    pub async fn is_cached(&self, date: NaiveDate, base: CurrencyCode) -> Result<bool, AppError> {
        self.store.exists(date, base).await.map_err(Into::into)
    }

    /// Number of entries cached under the key.
    pub async fn cached_count(
        &self,
        date: NaiveDate,
        base: CurrencyCode,
    ) -> Result<i64, AppError> {
        self.store.count_entries(date, base).await.map_err(Into::into)
    }

    /// Drops the snapshot and all of its entries.
    pub async fn invalidate(&self, date: NaiveDate, base: CurrencyCode) -> Result<bool, AppError> {
        info!(date = %date, base = %base, "invalidating cached rates");
        self.store.delete(date, base).await.map_err(Into::into)
    }
}
