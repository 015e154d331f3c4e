//! SQLite store adapter.

use async_trait::async_trait;
use chrono::NaiveDate;
use rust_decimal::Decimal;
use sqlx::SqlitePool;
use sqlx::sqlite::SqliteConnectOptions;
use std::str::FromStr;

use rates_types::{CurrencyCode, DATE_FORMAT, RateSnapshot, RateStore, RepoError};

use crate::types::{DbRateEntry, DbSnapshot};

// ─────────────────────────────────────────────────────────────────────────────
// SQLite Store
// ─────────────────────────────────────────────────────────────────────────────

/// SQLite store implementation.
///
/// Dates and timestamps are stored as TEXT; rates as exact decimal
/// strings, so no binary floating point is involved at rest.
pub struct SqliteStore {
    pool: SqlitePool,
}

impl SqliteStore {
    /// Creates a new SQLite store with automatic migration.
    ///
    /// Foreign keys are switched on so entry rows cascade with their
    /// snapshot.
    pub async fn new(database_url: &str) -> anyhow::Result<Self> {
        // Ensure on-disk SQLite target directory exists (no-op for in-memory).
        if let Some(path) = database_url.strip_prefix("sqlite://") {
            // Remove query parameters
            let path = path.split('?').next().unwrap_or(path);
            if path != ":memory:" {
                let p = std::path::Path::new(path);
                if let Some(parent) = p.parent() {
                    if !parent.as_os_str().is_empty() {
                        tokio::fs::create_dir_all(parent).await?;
                    }
                }
            }
        }

        let options = SqliteConnectOptions::from_str(database_url)?
            .create_if_missing(true)
            .foreign_keys(true);
        let pool = SqlitePool::connect_with(options).await?;

        // Run migration from migration file
        let ddl = include_str!("../migrations/0001_create_rates_tables.sql");
        sqlx::query(ddl).execute(&pool).await?;

        Ok(Self { pool })
    }

    /// Returns a reference to the connection pool.
    pub fn pool(&self) -> &SqlitePool {
        &self.pool
    }
}

fn key_strings(date: NaiveDate, base: CurrencyCode) -> (String, String) {
    (date.format(DATE_FORMAT).to_string(), base.to_string())
}

// ─────────────────────────────────────────────────────────────────────────────
// Store implementation
// ─────────────────────────────────────────────────────────────────────────────

#[async_trait]
impl RateStore for SqliteStore {
    async fn find(
        &self,
        date: NaiveDate,
        base: CurrencyCode,
    ) -> Result<Option<RateSnapshot>, RepoError> {
        let (date_str, base_str) = key_strings(date, base);

        let row: Option<DbSnapshot> = sqlx::query_as(
            r#"SELECT rate_date, base_currency, fetched_at FROM exchange_rate_snapshots
               WHERE rate_date = ? AND base_currency = ?"#,
        )
        .bind(&date_str)
        .bind(&base_str)
        .fetch_optional(&self.pool)
        .await
        .map_err(|e| RepoError::Database(e.to_string()))?;

        let Some(row) = row else {
            return Ok(None);
        };

        let entries: Vec<DbRateEntry> = sqlx::query_as(
            r#"SELECT target_currency, rate FROM exchange_rate_entries
               WHERE rate_date = ? AND base_currency = ?
               ORDER BY target_currency"#,
        )
        .bind(&date_str)
        .bind(&base_str)
        .fetch_all(&self.pool)
        .await
        .map_err(|e| RepoError::Database(e.to_string()))?;

        row.into_domain(entries).map(Some)
    }

    async fn save(&self, snapshot: &RateSnapshot) -> Result<(), RepoError> {
        let (date_str, base_str) = key_strings(snapshot.date(), snapshot.base());
        let fetched_at = snapshot.fetched_at().map(|at| at.to_rfc3339());

        let mut tx = self
            .pool
            .begin()
            .await
            .map_err(|e| RepoError::Transaction(e.to_string()))?;

        sqlx::query(
            r#"INSERT INTO exchange_rate_snapshots (rate_date, base_currency, fetched_at)
               VALUES (?, ?, ?)
               ON CONFLICT (rate_date, base_currency)
               DO UPDATE SET fetched_at = excluded.fetched_at"#,
        )
        .bind(&date_str)
        .bind(&base_str)
        .bind(&fetched_at)
        .execute(&mut *tx)
        .await
        .map_err(|e| RepoError::Database(e.to_string()))?;

        for (target, rate) in snapshot.rates() {
            sqlx::query(
                r#"INSERT INTO exchange_rate_entries (rate_date, base_currency, target_currency, rate)
                   VALUES (?, ?, ?, ?)
                   ON CONFLICT (rate_date, base_currency, target_currency)
                   DO UPDATE SET rate = excluded.rate"#,
            )
            .bind(&date_str)
            .bind(&base_str)
            .bind(target.as_str())
            .bind(rate.to_string())
            .execute(&mut *tx)
            .await
            .map_err(|e| RepoError::Database(e.to_string()))?;
        }

        tx.commit()
            .await
            .map_err(|e| RepoError::Transaction(e.to_string()))?;

        tracing::debug!(
            date = %date_str,
            base = %base_str,
            entries = snapshot.len(),
            "saved rate snapshot"
        );
        Ok(())
    }

    async fn exists(&self, date: NaiveDate, base: CurrencyCode) -> Result<bool, RepoError> {
        let (date_str, base_str) = key_strings(date, base);

        let found: i64 = sqlx::query_scalar(
            r#"SELECT EXISTS(
                 SELECT 1 FROM exchange_rate_snapshots
                 WHERE rate_date = ? AND base_currency = ?)"#,
        )
        .bind(&date_str)
        .bind(&base_str)
        .fetch_one(&self.pool)
        .await
        .map_err(|e| RepoError::Database(e.to_string()))?;

        Ok(found != 0)
    }

    async fn delete(&self, date: NaiveDate, base: CurrencyCode) -> Result<bool, RepoError> {
        let (date_str, base_str) = key_strings(date, base);

        let result = sqlx::query(
            r#"DELETE FROM exchange_rate_snapshots
               WHERE rate_date = ? AND base_currency = ?"#,
        )
        .bind(&date_str)
        .bind(&base_str)
        .execute(&self.pool)
        .await
        .map_err(|e| RepoError::Database(e.to_string()))?;

        Ok(result.rows_affected() > 0)
    }

    async fn find_rate(
        &self,
        date: NaiveDate,
        base: CurrencyCode,
        target: CurrencyCode,
    ) -> Result<Option<Decimal>, RepoError> {
        let (date_str, base_str) = key_strings(date, base);

        let raw: Option<String> = sqlx::query_scalar(
            r#"SELECT rate FROM exchange_rate_entries
               WHERE rate_date = ? AND base_currency = ? AND target_currency = ?"#,
        )
        .bind(&date_str)
        .bind(&base_str)
        .bind(target.as_str())
        .fetch_optional(&self.pool)
        .await
        .map_err(|e| RepoError::Database(e.to_string()))?;

        raw.map(|s| {
            Decimal::from_str(&s).map_err(|_| RepoError::Database(format!("corrupt rate: '{s}'")))
        })
        .transpose()
    }

    async fn count_entries(&self, date: NaiveDate, base: CurrencyCode) -> Result<i64, RepoError> {
        let (date_str, base_str) = key_strings(date, base);

        sqlx::query_scalar(
            r#"SELECT COUNT(*) FROM exchange_rate_entries
               WHERE rate_date = ? AND base_currency = ?"#,
        )
        .bind(&date_str)
        .bind(&base_str)
        .fetch_one(&self.pool)
        .await
        .map_err(|e| RepoError::Database(e.to_string()))
    }
}
