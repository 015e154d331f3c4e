//! Rate store port trait.
//!
//! This is the primary persistence port. Adapters (Postgres, SQLite,
//! in-memory test doubles) implement this trait.

use chrono::NaiveDate;
use rust_decimal::Decimal;

use crate::domain::{CurrencyCode, RateSnapshot};
use crate::error::RepoError;

/// Durable storage of rate snapshots keyed by `(date, base currency)`.
///
/// `save` MUST be atomic as a unit: the snapshot row and all of its
/// entries either all land or none do. Implementations should use
/// database transactions to ensure consistency.
#[async_trait::async_trait]
pub trait RateStore: Send + Sync + 'static {
    /// Point lookup by composite key.
    async fn find(
        &self,
        date: NaiveDate,
        base: CurrencyCode,
    ) -> Result<Option<RateSnapshot>, RepoError>;

    /// Upserts the snapshot and all of its entries.
    ///
    /// An entry sharing an existing `(date, base, target)` identity is
    /// overwritten with the new rate (last write wins).
    async fn save(&self, snapshot: &RateSnapshot) -> Result<(), RepoError>;

    /// Whether a snapshot exists for the key.
    async fn exists(&self, date: NaiveDate, base: CurrencyCode) -> Result<bool, RepoError>;

    /// Removes the snapshot and, cascading, all of its entries.
    ///
    /// Returns whether anything was removed.
    async fn delete(&self, date: NaiveDate, base: CurrencyCode) -> Result<bool, RepoError>;

    /// Looks up a single cached rate.
    async fn find_rate(
        &self,
        date: NaiveDate,
        base: CurrencyCode,
        target: CurrencyCode,
    ) -> Result<Option<Decimal>, RepoError>;

    /// Number of entries cached under the key.
    async fn count_entries(&self, date: NaiveDate, base: CurrencyCode) -> Result<i64, RepoError>;
}
