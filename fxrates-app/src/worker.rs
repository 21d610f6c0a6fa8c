//! Periodic ingestion loop.

use std::future::Future;
use std::time::Duration;

use chrono::{Days, NaiveDate, Utc};
use tokio::time::{MissedTickBehavior, interval};
use tracing::{error, info, instrument};

use fxrates_service::RateService;
use fxrates_types::{ExchangeRateRequest, IngestError, IngestSummary, RateSource, RateStore};

/// Ingests one currency pair on a fixed interval.
pub struct Worker<S: RateSource, R: RateStore> {
    service: RateService<S, R>,
    base_currency: String,
    target_currency: String,
    lookback_days: u32,
    period: Duration,
}

impl<S: RateSource, R: RateStore> Worker<S, R> {
    pub fn new(
        service: RateService<S, R>,
        base_currency: impl Into<String>,
        target_currency: impl Into<String>,
        lookback_days: u32,
        period: Duration,
    ) -> Self {
        Self {
            service,
            base_currency: base_currency.into(),
            target_currency: target_currency.into(),
            lookback_days,
            period,
        }
    }

    /// Builds the request covering `[today - lookback, today]`.
    pub fn request_for(&self, today: NaiveDate) -> Result<ExchangeRateRequest, IngestError> {
        let start = today
            .checked_sub_days(Days::new(self.lookback_days.into()))
            .unwrap_or(NaiveDate::MIN);

        Ok(ExchangeRateRequest::new(
            &self.base_currency,
            &self.target_currency,
            start,
            today,
        )?)
    }

    /// Runs one ingestion for the window ending at `today`.
    #[instrument(skip(self))]
    pub async fn run_once(&self, today: NaiveDate) -> Result<IngestSummary, IngestError> {
        let request = self.request_for(today)?;
        self.service.ingest(&request).await
    }

    /// Ticks until `shutdown` resolves. A failed tick is logged and the loop continues.
    pub async fn run<F>(&self, shutdown: F)
    where
        F: Future<Output = ()>,
    {
        let mut ticker = interval(self.period);
        ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);
        tokio::pin!(shutdown);

        info!(
            base = %self.base_currency,
            target = %self.target_currency,
            period_secs = self.period.as_secs(),
            "Worker started"
        );

        loop {
            tokio::select! {
                _ = &mut shutdown => {
                    info!("Shutdown requested, stopping worker");
                    break;
                }
                _ = ticker.tick() => {
                    let today = Utc::now().date_naive();
                    match self.run_once(today).await {
                        Ok(summary) => info!(
                            observations = summary.observations,
                            stored = summary.stored,
                            "Tick complete"
                        ),
                        Err(e) => error!(error = %e, "Tick failed"),
                    }
                }
            }
        }
    }

    #[cfg(test)]
    pub fn service(&self) -> &RateService<S, R> {
        &self.service
    }
}
