//! Data Transfer Objects for the read path and ingest results.

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

/// Query for one currency's rate series over an inclusive date range.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RateSeriesQuery {
    pub base_currency: String,
    pub target_currency: String,
    pub date_from: NaiveDate,
    pub date_to: NaiveDate,
}

/// Result of one ingest run.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct IngestSummary {
    pub base_currency: String,
    pub target_currency: String,
    /// Observation points decoded from the upstream payload
    pub observations: usize,
    /// Records written to the store
    pub stored: usize,
}
