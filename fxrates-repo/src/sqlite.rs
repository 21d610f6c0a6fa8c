//! SQLite repository adapter.
#![allow(clippy::collapsible_if)]

use async_trait::async_trait;
use chrono::NaiveDate;
use sqlx::SqlitePool;
use sqlx::sqlite::SqliteConnectOptions;
use std::str::FromStr;
use tracing::{debug, instrument};

use fxrates_types::{RateMap, RatePoint, RateRecord, RateStore, StoreError};

use crate::types::{SqliteRatePoint, SqliteRateRecord, format_date, rates_to_json};

// ─────────────────────────────────────────────────────────────────────────────
// SQLite Repository
// ─────────────────────────────────────────────────────────────────────────────

/// SQLite repository implementation.
///
/// Merges use `json_patch` inside a single upsert statement.
pub struct SqliteRepo {
    pool: SqlitePool,
}

/// Runs all database migrations.
async fn run_migrations(pool: &SqlitePool) -> Result<(), anyhow::Error> {
    let ddl = include_str!("../migrations/0001_create_exchange_rates.sql");
    for statement in ddl.split(';') {
        let stmt = statement.trim();
        if !stmt.is_empty() {
            sqlx::query(stmt)
                .execute(pool)
                .await
                .map_err(|e| anyhow::anyhow!("Migration 0001 failed: {}", e))?;
        }
    }
    Ok(())
}

impl SqliteRepo {
    /// Creates a new SQLite repository with automatic migration.
    pub async fn new(database_url: &str) -> anyhow::Result<Self> {
        // Ensure on-disk SQLite target directory exists (no-op for in-memory).
        if let Some(path) = database_url.strip_prefix("sqlite://") {
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

        let options = SqliteConnectOptions::from_str(database_url)?.create_if_missing(true);
        let repo = Self::from_pool(SqlitePool::connect_with(options).await?);
        repo.create_schema().await?;

        Ok(repo)
    }

    /// Wraps an established pool. The schema must already exist.
    pub fn from_pool(pool: SqlitePool) -> Self {
        Self { pool }
    }

    /// Returns a reference to the connection pool.
    pub fn pool(&self) -> &SqlitePool {
        &self.pool
    }

    /// Creates the table and index if missing. Safe to call repeatedly.
    pub async fn create_schema(&self) -> Result<(), StoreError> {
        run_migrations(&self.pool)
            .await
            .map_err(|e| StoreError::Persistence(e.to_string()))
    }
}

/// JSON path selecting one currency key. Only ASCII alphanumeric codes form a valid path.
fn currency_path(currency: &str) -> Result<String, StoreError> {
    if currency.is_empty() || !currency.chars().all(|c| c.is_ascii_alphanumeric()) {
        return Err(StoreError::Query(format!(
            "Invalid currency code {:?}: expected ASCII letters or digits",
            currency
        )));
    }
    Ok(format!("$.\"{}\"", currency))
}

// ─────────────────────────────────────────────────────────────────────────────
// Repository implementation
// ─────────────────────────────────────────────────────────────────────────────

#[async_trait]
impl RateStore for SqliteRepo {
    #[instrument(skip(self, rates), fields(currencies = rates.len()))]
    async fn upsert(
        &self,
        date: NaiveDate,
        base_currency: &str,
        rates: &RateMap,
    ) -> Result<(), StoreError> {
        let rates_json = rates_to_json(rates)?.to_string();

        sqlx::query(
            r#"INSERT INTO exchange_rates (date, base_currency, currency_rates)
               VALUES (?, ?, ?)
               ON CONFLICT (date, base_currency)
               DO UPDATE SET currency_rates = json_patch(exchange_rates.currency_rates, excluded.currency_rates)"#,
        )
        .bind(format_date(date))
        .bind(base_currency)
        .bind(&rates_json)
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
        let path = currency_path(target_currency)?;

        let rows: Vec<SqliteRatePoint> = sqlx::query_as(
            r#"SELECT date, CAST(json_extract(currency_rates, ?) AS TEXT) AS rate
               FROM exchange_rates
               WHERE base_currency = ?
                 AND date BETWEEN ? AND ?
                 AND json_extract(currency_rates, ?) IS NOT NULL
               ORDER BY date ASC"#,
        )
        .bind(&path)
        .bind(base_currency)
        .bind(format_date(date_from))
        .bind(format_date(date_to))
        .bind(&path)
        .fetch_all(&self.pool)
        .await
        .map_err(|e| StoreError::Query(e.to_string()))?;

        rows.into_iter().map(SqliteRatePoint::into_domain).collect()
    }

    async fn get_record(
        &self,
        date: NaiveDate,
        base_currency: &str,
    ) -> Result<Option<RateRecord>, StoreError> {
        let row: Option<SqliteRateRecord> = sqlx::query_as(
            r#"SELECT date, base_currency, currency_rates FROM exchange_rates
               WHERE date = ? AND base_currency = ?"#,
        )
        .bind(format_date(date))
        .bind(base_currency)
        .fetch_optional(&self.pool)
        .await
        .map_err(|e| StoreError::Query(e.to_string()))?;

        row.map(SqliteRateRecord::into_domain).transpose()
    }
}
