//! In-memory repository adapter.

use async_trait::async_trait;
use chrono::NaiveDate;
use dashmap::DashMap;

use fxrates_types::{RateMap, RatePoint, RateRecord, RateStore, StoreError};

/// In-memory rate store keyed by `(base_currency, date)`.
///
/// Each upsert runs under the entry's shard lock, so writes to one key serialize.
#[derive(Default)]
pub struct MemoryRepo {
    records: DashMap<(String, NaiveDate), RateRecord>,
}

impl MemoryRepo {
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of stored records.
    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }
}

#[async_trait]
impl RateStore for MemoryRepo {
    async fn upsert(
        &self,
        date: NaiveDate,
        base_currency: &str,
        rates: &RateMap,
    ) -> Result<(), StoreError> {
        self.records
            .entry((base_currency.to_string(), date))
            .and_modify(|record| record.merge(rates))
            .or_insert_with(|| RateRecord::new(date, base_currency, rates.clone()));
        Ok(())
    }

    async fn query_range(
        &self,
        base_currency: &str,
        target_currency: &str,
        date_from: NaiveDate,
        date_to: NaiveDate,
    ) -> Result<Vec<RatePoint>, StoreError> {
        let mut points: Vec<RatePoint> = self
            .records
            .iter()
            .filter(|entry| {
                let (base, date) = entry.key();
                base == base_currency && *date >= date_from && *date <= date_to
            })
            .filter_map(|entry| entry.value().project(target_currency))
            .collect();

        points.sort_by_key(|point| point.date);
        Ok(points)
    }

    async fn get_record(
        &self,
        date: NaiveDate,
        base_currency: &str,
    ) -> Result<Option<RateRecord>, StoreError> {
        Ok(self
            .records
            .get(&(base_currency.to_string(), date))
            .map(|entry| entry.value().clone()))
    }
}
