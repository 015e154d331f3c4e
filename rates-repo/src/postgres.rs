//! PostgreSQL store adapter.

use async_trait::async_trait;
use chrono::NaiveDate;
use rust_decimal::Decimal;
use sqlx::PgPool;

use rates_types::{CurrencyCode, RateSnapshot, RateStore, RepoError};

use crate::types::{DbRateEntry, DbSnapshot};

// ─────────────────────────────────────────────────────────────────────────────
// PostgreSQL Store
// ─────────────────────────────────────────────────────────────────────────────

/// PostgreSQL store implementation.
///
/// Rates are stored as NUMERIC, dates as DATE and fetch timestamps as
/// TIMESTAMPTZ; sqlx maps them to `Decimal`/`chrono` types directly.
pub struct PostgresStore {
    pool: PgPool,
}

/// Executes SQL statements from a migration file, splitting by semicolons.
async fn execute_migration(pool: &PgPool, sql: &str, name: &str) -> Result<(), anyhow::Error> {
    for statement in sql.split(';') {
        let stmt = statement.trim();
        if !stmt.is_empty() {
            sqlx::query(stmt)
                .execute(pool)
                .await
                .map_err(|e| anyhow::anyhow!("Migration {} failed: {}", name, e))?;
        }
    }
    Ok(())
}

impl PostgresStore {
    /// Creates a new PostgreSQL store with automatic migration.
    pub async fn new(database_url: &str) -> anyhow::Result<Self> {
        let pool = PgPool::connect(database_url).await?;

        execute_migration(
            &pool,
            include_str!("../migrations/0001_create_rates_tables_pg.sql"),
            "0001",
        )
        .await?;

        Ok(Self { pool })
    }

    /// Returns a reference to the connection pool.
    pub fn pool(&self) -> &PgPool {
        &self.pool
    }
}

// ─────────────────────────────────────────────────────────────────────────────
// Store implementation
// ─────────────────────────────────────────────────────────────────────────────

#[async_trait]
impl RateStore for PostgresStore {
    async fn find(
        &self,
        date: NaiveDate,
        base: CurrencyCode,
    ) -> Result<Option<RateSnapshot>, RepoError> {
        let row: Option<DbSnapshot> = sqlx::query_as(
            r#"SELECT rate_date, base_currency, fetched_at FROM exchange_rate_snapshots
               WHERE rate_date = $1 AND base_currency = $2"#,
        )
        .bind(date)
        .bind(base.as_str())
        .fetch_optional(&self.pool)
        .await
        .map_err(|e| RepoError::Database(e.to_string()))?;

        let Some(row) = row else {
            return Ok(None);
        };

        let entries: Vec<DbRateEntry> = sqlx::query_as(
            r#"SELECT target_currency, rate FROM exchange_rate_entries
               WHERE rate_date = $1 AND base_currency = $2
               ORDER BY target_currency"#,
        )
        .bind(date)
        .bind(base.as_str())
        .fetch_all(&self.pool)
        .await
        .map_err(|e| RepoError::Database(e.to_string()))?;

        row.into_domain(entries).map(Some)
    }

    async fn save(&self, snapshot: &RateSnapshot) -> Result<(), RepoError> {
        let mut tx = self
            .pool
            .begin()
            .await
            .map_err(|e| RepoError::Transaction(e.to_string()))?;

        sqlx::query(
            r#"INSERT INTO exchange_rate_snapshots (rate_date, base_currency, fetched_at)
               VALUES ($1, $2, $3)
               ON CONFLICT (rate_date, base_currency)
               DO UPDATE SET fetched_at = EXCLUDED.fetched_at"#,
        )
        .bind(snapshot.date())
        .bind(snapshot.base().as_str())
        .bind(snapshot.fetched_at())
        .execute(&mut *tx)
        .await
        .map_err(|e| RepoError::Database(e.to_string()))?;

        for (target, rate) in snapshot.rates() {
            sqlx::query(
                r#"INSERT INTO exchange_rate_entries (rate_date, base_currency, target_currency, rate)
                   VALUES ($1, $2, $3, $4)
                   ON CONFLICT (rate_date, base_currency, target_currency)
                   DO UPDATE SET rate = EXCLUDED.rate"#,
            )
            .bind(snapshot.date())
            .bind(snapshot.base().as_str())
            .bind(target.as_str())
            .bind(rate)
            .execute(&mut *tx)
            .await
            .map_err(|e| RepoError::Database(e.to_string()))?;
        }

        tx.commit()
            .await
            .map_err(|e| RepoError::Transaction(e.to_string()))?;

        tracing::debug!(
            date = %snapshot.date(),
            base = %snapshot.base(),
            entries = snapshot.len(),
            "saved rate snapshot"
        );
        Ok(())
    }

    async fn exists(&self, date: NaiveDate, base: CurrencyCode) -> Result<bool, RepoError> {
        sqlx::query_scalar(
            r#"SELECT EXISTS(
                 SELECT 1 FROM exchange_rate_snapshots
                 WHERE rate_date = $1 AND base_currency = $2)"#,
        )
        .bind(date)
        .bind(base.as_str())
        .fetch_one(&self.pool)
        .await
        .map_err(|e| RepoError::Database(e.to_string()))
    }

    async fn delete(&self, date: NaiveDate, base: CurrencyCode) -> Result<bool, RepoError> {
        let result = sqlx::query(
            r#"DELETE FROM exchange_rate_snapshots
               WHERE rate_date = $1 AND base_currency = $2"#,
        )
        .bind(date)
        .bind(base.as_str())
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
        sqlx::query_scalar(
            r#"SELECT rate FROM exchange_rate_entries
               WHERE rate_date = $1 AND base_currency = $2 AND target_currency = $3"#,
        )
        .bind(date)
        .bind(base.as_str())
        .bind(target.as_str())
        .fetch_optional(&self.pool)
        .await
        .map_err(|e| RepoError::Database(e.to_string()))
    }

    async fn count_entries(&self, date: NaiveDate, base: CurrencyCode) -> Result<i64, RepoError> {
        sqlx::query_scalar(
            r#"SELECT COUNT(*) FROM exchange_rate_entries
               WHERE rate_date = $1 AND base_currency = $2"#,
        )
        .bind(date)
        .bind(base.as_str())
        .fetch_one(&self.pool)
        .await
        .map_err(|e| RepoError::Database(e.to_string()))
    }
}
