//! PostgreSQL repository adapter.

use async_trait::async_trait;
use chrono::NaiveDate;
use sqlx::PgPool;
use tracing::{debug, instrument};

use fxrates_types::{RateMap, RatePoint, RateRecord, RateStore, StoreError};

use crate::types::{PgRatePoint, PgRateRecord, rates_to_json};

// ─────────────────────────────────────────────────────────────────────────────
// PostgreSQL Repository
// ─────────────────────────────────────────────────────────────────────────────

/// PostgreSQL repository storing rates in a `JSONB` column.
///
/// Merges are a single `INSERT ... ON CONFLICT DO UPDATE` using the `||` operator,
/// so concurrent writes to the same `(date, base_currency)` serialize on the row.
pub struct PostgresRepo {
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

/// Runs all database migrations.
async fn run_migrations(pool: &PgPool) -> Result<(), anyhow::Error> {
    execute_migration(
        pool,
        include_str!("../migrations/0001_create_exchange_rates_pg.sql"),
        "0001",
    )
    .await
}

impl PostgresRepo {
    /// Creates a new PostgreSQL repository with automatic migration.
    pub async fn new(database_url: &str) -> anyhow::Result<Self> {
        let repo = Self::from_pool(PgPool::connect(database_url).await?);
        repo.create_schema().await?;
        Ok(repo)
    }

    /// Wraps an established pool. The schema must already exist.
    pub fn from_pool(pool: PgPool) -> Self {
        Self { pool }
    }

    /// Creates the table and index if missing. Safe to call repeatedly.
    pub async fn create_schema(&self) -> Result<(), StoreError> {
        run_migrations(&self.pool)
            .await
            .map_err(|e| StoreError::Persistence(e.to_string()))
    }
}

// ─────────────────────────────────────────────────────────────────────────────
// Repository implementation
// ─────────────────────────────────────────────────────────────────────────────

#[async_trait]
impl RateStore for PostgresRepo {
    #[instrument(skip(self, rates), fields(currencies = rates.len()))]
    async fn upsert(
        &self,
        date: NaiveDate,
        base_currency: &str,
        rates: &RateMap,
    ) -> Result<(), StoreError> {
        let rates_json = rates_to_json(rates)?;

        sqlx::query(
            r#"INSERT INTO exchange_rates (date, base_currency, currency_rates)
               VALUES ($1, $2, $3)
               ON CONFLICT (date, base_currency)
               DO UPDATE SET currency_rates = exchange_rates.currency_rates || EXCLUDED.currency_rates"#,
        )
        .bind(date)
        .bind(base_currency)
        .bind(rates_json)
        .execute(&self.pool)
        .await
        .map_err(|e| StoreError::Persistence(e.to_string()))?;

        debug!("Upserted rate record");
        Ok(())
    }

    async fn query_range(
        &self,
        base_currency: &str,
        target_currency: &str,
        date_from: NaiveDate,
        date_to: NaiveDate,
    ) -> Result<Vec<RatePoint>, StoreError> {
        let rows: Vec<PgRatePoint> = sqlx::query_as(
            r#"SELECT date, (currency_rates ->> $1)::numeric AS rate
               FROM exchange_rates
               WHERE base_currency = $2
                 AND date BETWEEN $3 AND $4
                 AND currency_rates ->> $1 IS NOT NULL
               ORDER BY date ASC"#,
        )
        .bind(target_currency)
        .bind(base_currency)
        .bind(date_from)
        .bind(date_to)
        .fetch_all(&self.pool)
        .await
        .map_err(|e| StoreError::Query(e.to_string()))?;

        rows.into_iter().map(PgRatePoint::into_domain).collect()
    }

    async fn get_record(
        &self,
        date: NaiveDate,
        base_currency: &str,
    ) -> Result<Option<RateRecord>, StoreError> {
        let row: Option<PgRateRecord> = sqlx::query_as(
            r#"SELECT date, base_currency, currency_rates FROM exchange_rates
               WHERE date = $1 AND base_currency = $2"#,
        )
        .bind(date)
        .bind(base_currency)
        .fetch_optional(&self.pool)
        .await
        .map_err(|e| StoreError::Query(e.to_string()))?;

        row.map(PgRateRecord::into_domain).transpose()
    }
}
