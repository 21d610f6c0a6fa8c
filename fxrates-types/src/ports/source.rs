//! Rate source port.
//!
//! Implementations fetch and decode observations for one currency pair,
//! e.g. the SDMX HTTP client or a canned source in tests.

use crate::domain::{ExchangeRateRequest, ObservationPoint};
use crate::error::SourceError;

/// Port trait for upstream rate providers.
#[async_trait::async_trait]
pub trait RateSource: Send + Sync {
    /// Returns the observations for `req` in upstream (chronological) order.
    async fn fetch_observations(
        &self,
        req: &ExchangeRateRequest,
    ) -> Result<Vec<ObservationPoint>, SourceError>;
}
