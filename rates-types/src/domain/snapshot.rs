//! The cached rate aggregate.

use std::collections::{BTreeMap, BTreeSet};

use chrono::{DateTime, NaiveDate, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use super::currency::CurrencyCode;
use crate::error::DomainError;

/// All cached rates for one `(date, base currency)` pair.
///
/// The pair is the snapshot's identity: the store holds at most one
/// snapshot per pair. Each entry maps a target currency to its rate and
/// is owned exclusively by this snapshot — deleting the snapshot deletes
/// its entries.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RateSnapshot {
    date: NaiveDate,
    base: CurrencyCode,
    /// When the upstream fetch that populated this snapshot ran.
    fetched_at: Option<DateTime<Utc>>,
    rates: BTreeMap<CurrencyCode, Decimal>,
}

impl RateSnapshot {
    /// Creates an empty snapshot for the given identity.
    pub fn new(date: NaiveDate, base: CurrencyCode) -> Self {
        Self {
            date,
            base,
            fetched_at: None,
            rates: BTreeMap::new(),
        }
    }

    /// Reassembles a snapshot from stored parts.
    pub fn from_parts(
        date: NaiveDate,
        base: CurrencyCode,
        fetched_at: Option<DateTime<Utc>>,
        rates: BTreeMap<CurrencyCode, Decimal>,
    ) -> Self {
        Self {
            date,
            base,
            fetched_at,
            rates,
        }
    }

    /// Sets the execution timestamp.
    pub fn with_fetched_at(mut self, at: DateTime<Utc>) -> Self {
        self.fetched_at = Some(at);
        self
    }

    pub fn date(&self) -> NaiveDate {
        self.date
    }

    pub fn base(&self) -> CurrencyCode {
        self.base
    }

    pub fn fetched_at(&self) -> Option<DateTime<Utc>> {
        self.fetched_at
    }

    /// The entries as `(target currency, rate)` pairs, ordered by code.
    pub fn rates(&self) -> &BTreeMap<CurrencyCode, Decimal> {
        &self.rates
    }

    /// Adds one entry.
    ///
    /// # Validation
    /// - Rate must be strictly positive
    pub fn insert_rate(&mut self, target: CurrencyCode, rate: Decimal) -> Result<(), DomainError> {
        if rate <= Decimal::ZERO {
            return Err(DomainError::NonPositiveRate { target, rate });
        }
        self.rates.insert(target, rate);
        Ok(())
    }

    /// Looks up the rate for one target currency.
    pub fn rate(&self, target: CurrencyCode) -> Option<Decimal> {
        self.rates.get(&target).copied()
    }

    /// The set of target currencies present in this snapshot.
    pub fn symbols(&self) -> BTreeSet<CurrencyCode> {
        self.rates.keys().copied().collect()
    }

    /// Requested symbols not yet present: the gap to fetch upstream.
    pub fn missing_symbols(&self, requested: &BTreeSet<CurrencyCode>) -> BTreeSet<CurrencyCode> {
        requested
            .iter()
            .filter(|code| !self.rates.contains_key(code))
            .copied()
            .collect()
    }

    /// Merges another snapshot's entries into this one.
    ///
    /// Entries are only added or overwritten, never removed; on a shared
    /// target currency the incoming entry wins (last write wins). The
    /// incoming execution timestamp replaces the current one when set.
    pub fn merge(&mut self, other: RateSnapshot) {
        self.rates.extend(other.rates);
        if other.fetched_at.is_some() {
            self.fetched_at = other.fetched_at;
        }
    }

    pub fn len(&self) -> usize {
        self.rates.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rates.is_empty()
    }
}
