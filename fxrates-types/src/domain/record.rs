//! Stored rate records and projected rate points.

use std::collections::BTreeMap;

use chrono::NaiveDate;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

/// Mapping from target-currency code to rate.
pub type RateMap = BTreeMap<String, Decimal>;

/// All known rates for one base currency on one date.
///
/// Unique per `(date, base_currency)`. The `rates` mapping only grows.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RateRecord {
    pub date: NaiveDate,
    pub base_currency: String,
    pub rates: RateMap,
}

impl RateRecord {
    /// Creates a record holding exactly `rates`.
    pub fn new(date: NaiveDate, base_currency: impl Into<String>, rates: RateMap) -> Self {
        Self {
            date,
            base_currency: base_currency.into(),
            rates,
        }
    }

    /// Merges incoming rates into this record.
    ///
    /// Incoming keys are inserted or overwritten; keys absent from `incoming` are kept.
    pub fn merge(&mut self, incoming: &RateMap) {
        for (currency, rate) in incoming {
            self.rates.insert(currency.clone(), *rate);
        }
    }

    /// Returns the rate for `target_currency`, if this record holds one.
    pub fn rate(&self, target_currency: &str) -> Option<Decimal> {
        self.rates.get(target_currency).copied()
    }

    /// Projects one target currency out of this record.
    pub fn project(&self, target_currency: &str) -> Option<RatePoint> {
        self.rate(target_currency).map(|rate| RatePoint {
            date: self.date,
            rate,
        })
    }
}

/// One point of a single currency's rate series.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct RatePoint {
    pub date: NaiveDate,
    pub rate: Decimal,
}
