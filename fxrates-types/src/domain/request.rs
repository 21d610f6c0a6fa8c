//! Exchange rate fetch request.

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use crate::error::RequestError;

/// Date format used on the wire and in stored keys.
pub const DATE_FORMAT: &str = "%Y-%m-%d";

/// A request for one currency pair over an inclusive date range.
///
/// Created per fetch call and never persisted.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ExchangeRateRequest {
    base_currency: String,
    target_currency: String,
    period_start: NaiveDate,
    period_end: NaiveDate,
}

impl ExchangeRateRequest {
    /// Creates a new request.
    ///
    /// # Validation
    /// - Currency codes cannot be empty
    /// - `period_start` must not be after `period_end`
    pub fn new(
        base_currency: impl Into<String>,
        target_currency: impl Into<String>,
        period_start: NaiveDate,
        period_end: NaiveDate,
    ) -> Result<Self, RequestError> {
        let base_currency = base_currency.into().trim().to_uppercase();
        let target_currency = target_currency.into().trim().to_uppercase();

        if base_currency.is_empty() {
            return Err(RequestError::InvalidRequest(
                "Base currency cannot be empty".into(),
            ));
        }
        if target_currency.is_empty() {
            return Err(RequestError::InvalidRequest(
                "Target currency cannot be empty".into(),
            ));
        }
        if period_start > period_end {
            return Err(RequestError::InvalidRequest(format!(
                "Period start {} is after period end {}",
                period_start, period_end
            )));
        }

        Ok(Self {
            base_currency,
            target_currency,
            period_start,
            period_end,
        })
    }

    pub fn base_currency(&self) -> &str {
        &self.base_currency
    }

    pub fn target_currency(&self) -> &str {
        &self.target_currency
    }

    pub fn period_start(&self) -> NaiveDate {
        self.period_start
    }

    pub fn period_end(&self) -> NaiveDate {
        self.period_end
    }
}

impl std::fmt::Display for ExchangeRateRequest {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "{}/{} {}..={}",
            self.base_currency, self.target_currency, self.period_start, self.period_end
        )
    }
}
