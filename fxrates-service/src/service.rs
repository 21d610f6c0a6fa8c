//! Rate Application Service
//!
//! Orchestrates the write path (source → store) and the read path (store → series)
//! through the port traits. Contains NO infrastructure logic.

use chrono::NaiveDate;
use rust_decimal::Decimal;
use tracing::{debug, info, instrument};

use fxrates_types::{
    ExchangeRateRequest, IngestError, IngestSummary, RateMap, RatePoint, RateSeriesQuery,
    RateSource, RateStore,
};

/// Application service for rate ingestion and queries.
///
/// Generic over `S: RateSource` and `R: RateStore` - adapters are injected at compile time,
/// so tests can run against canned sources and the in-memory store.
pub struct RateService<S: RateSource, R: RateStore> {
    source: S,
    store: R,
}

impl<S: RateSource, R: RateStore> RateService<S, R> {
    /// Creates a new rate service with the given source and store.
    pub fn new(source: S, store: R) -> Self {
        Self { source, store }
    }

    /// Returns a reference to the underlying source.
    pub fn source(&self) -> &S {
        &self.source
    }

    /// Returns a reference to the underlying store.
    pub fn store(&self) -> &R {
        &self.store
    }

    // ─────────────────────────────────────────────────────────────────────────────
    // Write path
    // ─────────────────────────────────────────────────────────────────────────────

    /// Fetches and decodes observations for `req`, then stores them one date at a time.
    ///
    /// Each point becomes `{target_currency: value}` merged into the record for
    /// `(point.date, base_currency)`. The first failure aborts the run.
    #[instrument(skip(self, req), fields(request = %req))]
    pub async fn ingest(&self, req: &ExchangeRateRequest) -> Result<IngestSummary, IngestError> {
        let points = self.source.fetch_observations(req).await?;
        debug!(observations = points.len(), "Fetched observations");

        let mut stored = 0;
        for point in &points {
            let mut rates = RateMap::new();
            rates.insert(req.target_currency().to_string(), point.value);

            self.store
                .upsert(point.date, req.base_currency(), &rates)
                .await?;
            stored += 1;
        }

        info!(observations = points.len(), stored, "Ingested exchange rates");

        Ok(IngestSummary {
            base_currency: req.base_currency().to_string(),
            target_currency: req.target_currency().to_string(),
            observations: points.len(),
            stored,
        })
    }

    // ─────────────────────────────────────────────────────────────────────────────
    // Read path
    // ─────────────────────────────────────────────────────────────────────────────

    /// Returns the target currency's series over the inclusive date range, oldest first.
    #[instrument(skip(self))]
    pub async fn rate_series(&self, query: &RateSeriesQuery) -> Result<Vec<RatePoint>, IngestError> {
        let points = self
            .store
            .query_range(
                &query.base_currency.trim().to_uppercase(),
                &query.target_currency.trim().to_uppercase(),
                query.date_from,
                query.date_to,
            )
            .await?;

        debug!(points = points.len(), "Loaded rate series");
        Ok(points)
    }

    /// Returns the stored rate for one pair on one date, if any.
    pub async fn rate_on(
        &self,
        base_currency: &str,
        target_currency: &str,
        date: NaiveDate,
    ) -> Result<Option<Decimal>, IngestError> {
        let record = self
            .store
            .get_record(date, &base_currency.trim().to_uppercase())
            .await?;

        Ok(record.and_then(|r| r.rate(&target_currency.trim().to_uppercase())))
    }
}
