//! Rate store port.
//!
//! Adapters (Postgres, SQLite, in-memory) implement this trait.

use chrono::NaiveDate;

use crate::domain::{RateMap, RatePoint, RateRecord};
use crate::error::StoreError;

/// Persistent store of per-date rate records.
///
/// `upsert` MUST be atomic per `(date, base_currency)`: concurrent writes to the
/// same key serialize, writes to different keys do not interfere.
#[async_trait::async_trait]
pub trait RateStore: Send + Sync + 'static {
    /// Creates the record for `(date, base_currency)` or merges `rates` into it.
    ///
    /// Incoming keys overwrite stored ones; stored keys missing from `rates` are kept.
    async fn upsert(
        &self,
        date: NaiveDate,
        base_currency: &str,
        rates: &RateMap,
    ) -> Result<(), StoreError>;

    /// Returns `target_currency` rates for `base_currency` with `date_from <= date <= date_to`,
    /// ascending by date. Records without `target_currency` are skipped.
    async fn query_range(
        &self,
        base_currency: &str,
        target_currency: &str,
        date_from: NaiveDate,
        date_to: NaiveDate,
    ) -> Result<Vec<RatePoint>, StoreError>;

    /// Gets the full record for `(date, base_currency)`.
    async fn get_record(
        &self,
        date: NaiveDate,
        base_currency: &str,
    ) -> Result<Option<RateRecord>, StoreError>;
}
