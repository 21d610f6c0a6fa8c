//! Query URL construction for the "exchange rate by date range" resource.

use fxrates_types::domain::request::DATE_FORMAT;
use fxrates_types::{ExchangeRateRequest, RequestError};

/// ECB exchange-rate dataflow.
pub const DEFAULT_BASE_URL: &str = "https://data-api.ecb.europa.eu/service/data/EXR";

/// Builds fully qualified query URLs against a configured upstream base.
#[derive(Debug, Clone)]
pub struct RequestBuilder {
    base_url: String,
}

impl RequestBuilder {
    pub fn new(base_url: impl Into<String>) -> Self {
        Self {
            base_url: base_url.into().trim_end_matches('/').to_string(),
        }
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    /// Substitutes the four parameters into the daily spot-rate series key.
    ///
    /// Only a request with all four inputs empty is rejected.
    pub fn build_url(
        &self,
        base_currency: &str,
        target_currency: &str,
        period_start: &str,
        period_end: &str,
    ) -> Result<String, RequestError> {
        if base_currency.is_empty()
            && target_currency.is_empty()
            && period_start.is_empty()
            && period_end.is_empty()
        {
            return Err(RequestError::InvalidRequest(
                "currency pair and period are all empty".into(),
            ));
        }

        Ok(format!(
            "{}/D.{}.{}.SP00.A?startPeriod={}&endPeriod={}",
            self.base_url, base_currency, target_currency, period_start, period_end
        ))
    }

    /// Builds the URL for a validated request.
    pub fn url_for(&self, req: &ExchangeRateRequest) -> Result<String, RequestError> {
        self.build_url(
            req.base_currency(),
            req.target_currency(),
            &req.period_start().format(DATE_FORMAT).to_string(),
            &req.period_end().format(DATE_FORMAT).to_string(),
        )
    }
}

impl Default for RequestBuilder {
    fn default() -> Self {
        Self::new(DEFAULT_BASE_URL)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;

    #[test]
    fn test_build_url_literal() {
        let url = RequestBuilder::default()
            .build_url("USD", "EUR", "2024-05-01", "2024-05-31")
            .unwrap();
        assert_eq!(
            url,
            "https://data-api.ecb.europa.eu/service/data/EXR/D.USD.EUR.SP00.A?startPeriod=2024-05-01&endPeriod=2024-05-31"
        );
    }

    #[test]
    fn test_url_for_typed_request() {
        let req = ExchangeRateRequest::new(
            "USD",
            "EUR",
            NaiveDate::from_ymd_opt(2024, 5, 1).unwrap(),
            NaiveDate::from_ymd_opt(2024, 5, 31).unwrap(),
        )
        .unwrap();

        let url = RequestBuilder::new("http://localhost:8080/EXR/")
            .url_for(&req)
            .unwrap();
        assert_eq!(
            url,
            "http://localhost:8080/EXR/D.USD.EUR.SP00.A?startPeriod=2024-05-01&endPeriod=2024-05-31"
        );
    }

    #[test]
    fn test_all_empty_is_rejected() {
        let result = RequestBuilder::default().build_url("", "", "", "");
        assert!(matches!(result, Err(RequestError::InvalidRequest(_))));
    }

    #[test]
    fn test_partially_empty_passes_through() {
        let url = RequestBuilder::default()
            .build_url("USD", "", "2024-05-01", "")
            .unwrap();
        assert!(url.ends_with("/D.USD..SP00.A?startPeriod=2024-05-01&endPeriod="));
    }
}
