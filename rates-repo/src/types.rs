//! Shared database row types with feature-gated fields for SQLite and
//! PostgreSQL.

use std::collections::BTreeMap;
#[cfg(feature = "sqlite")]
use std::str::FromStr;

use sqlx::FromRow;

use rates_types::{CurrencyCode, RateSnapshot, RepoError};

// ─────────────────────────────────────────────────────────────────────────────
// Feature-gated imports
// ─────────────────────────────────────────────────────────────────────────────

#[cfg(feature = "sqlite")]
use chrono::DateTime;
#[cfg(not(feature = "sqlite"))]
use chrono::{DateTime, NaiveDate, Utc};
use rust_decimal::Decimal;

// ─────────────────────────────────────────────────────────────────────────────
// Database row structs (derive FromRow for automatic mapping)
// ─────────────────────────────────────────────────────────────────────────────

/// Snapshot row from database.
#[derive(FromRow)]
pub struct DbSnapshot {
    #[cfg(not(feature = "sqlite"))]
    pub rate_date: NaiveDate,
    #[cfg(feature = "sqlite")]
    pub rate_date: String,

    pub base_currency: String,

    #[cfg(not(feature = "sqlite"))]
    pub fetched_at: Option<DateTime<Utc>>,
    #[cfg(feature = "sqlite")]
    pub fetched_at: Option<String>,
}

/// Rate entry row from database.
#[derive(FromRow)]
pub struct DbRateEntry {
    pub target_currency: String,

    #[cfg(not(feature = "sqlite"))]
    pub rate: Decimal,
    #[cfg(feature = "sqlite")]
    pub rate: String,
}

// ─────────────────────────────────────────────────────────────────────────────
// Row -> domain conversions
// ─────────────────────────────────────────────────────────────────────────────

fn corrupt(what: &str, value: &str) -> RepoError {
    RepoError::Database(format!("corrupt {what} in row: '{value}'"))
}

impl DbSnapshot {
    /// Builds the domain snapshot from this row and its entry rows.
    pub fn into_domain(self, entries: Vec<DbRateEntry>) -> Result<RateSnapshot, RepoError> {
        let base = CurrencyCode::parse(&self.base_currency)
            .map_err(|_| corrupt("base currency", &self.base_currency))?;

        #[cfg(feature = "sqlite")]
        let date = rates_types::parse_rate_day(&self.rate_date)
            .map_err(|_| corrupt("date", &self.rate_date))?;
        #[cfg(not(feature = "sqlite"))]
        let date = self.rate_date;

        #[cfg(feature = "sqlite")]
        let fetched_at = self
            .fetched_at
            .as_deref()
            .map(|raw| {
                DateTime::parse_from_rfc3339(raw)
                    .map(|at| at.to_utc())
                    .map_err(|_| corrupt("fetch timestamp", raw))
            })
            .transpose()?;
        #[cfg(not(feature = "sqlite"))]
        let fetched_at = self.fetched_at;

        let mut rates = BTreeMap::new();
        for entry in entries {
            let target = CurrencyCode::parse(&entry.target_currency)
                .map_err(|_| corrupt("target currency", &entry.target_currency))?;

            #[cfg(feature = "sqlite")]
            let rate =
                Decimal::from_str(&entry.rate).map_err(|_| corrupt("rate", &entry.rate))?;
            #[cfg(not(feature = "sqlite"))]
            let rate = entry.rate;

            rates.insert(target, rate);
        }

        Ok(RateSnapshot::from_parts(date, base, fetched_at, rates))
    }
}
