//! Database row structs and conversion helpers shared by the SQL adapters.

use std::str::FromStr;

use chrono::NaiveDate;
use rust_decimal::Decimal;
use rust_decimal::prelude::ToPrimitive;
use serde_json::{Map, Number, Value};

#[cfg(feature = "sqlite")]
use fxrates_types::domain::request::DATE_FORMAT;
use fxrates_types::{RateMap, RatePoint, RateRecord, StoreError};

// ─────────────────────────────────────────────────────────────────────────────
// Database row structs (derive FromRow for automatic mapping)
// ─────────────────────────────────────────────────────────────────────────────

/// Full rate record row from PostgreSQL.
#[cfg(feature = "postgres")]
#[derive(sqlx::FromRow)]
pub struct PgRateRecord {
    pub date: NaiveDate,
    pub base_currency: String,
    pub currency_rates: Value,
}

/// Projected (date, rate) row from PostgreSQL.
#[cfg(feature = "postgres")]
#[derive(sqlx::FromRow)]
pub struct PgRatePoint {
    pub date: NaiveDate,
    pub rate: Decimal,
}

/// Full rate record row from SQLite. Dates and JSON are stored as text.
#[cfg(feature = "sqlite")]
#[derive(sqlx::FromRow)]
pub struct SqliteRateRecord {
    pub date: String,
    pub base_currency: String,
    pub currency_rates: String,
}

/// Projected (date, rate) row from SQLite.
#[cfg(feature = "sqlite")]
#[derive(sqlx::FromRow)]
pub struct SqliteRatePoint {
    pub date: String,
    pub rate: String,
}

// ─────────────────────────────────────────────────────────────────────────────
// Domain conversion (feature-gated implementations)
// ─────────────────────────────────────────────────────────────────────────────

#[cfg(feature = "postgres")]
impl PgRateRecord {
    /// Convert database row to domain RateRecord.
    pub fn into_domain(self) -> Result<RateRecord, StoreError> {
        let rates = rates_from_json(&self.currency_rates)?;
        Ok(RateRecord::new(self.date, self.base_currency, rates))
    }
}

#[cfg(feature = "postgres")]
impl PgRatePoint {
    pub fn into_domain(self) -> Result<RatePoint, StoreError> {
        Ok(RatePoint {
            date: self.date,
            rate: self.rate,
        })
    }
}

#[cfg(feature = "sqlite")]
impl SqliteRateRecord {
    /// Convert database row to domain RateRecord.
    pub fn into_domain(self) -> Result<RateRecord, StoreError> {
        let json: Value = serde_json::from_str(&self.currency_rates)
            .map_err(|e| StoreError::Query(format!("Invalid stored rates: {}", e)))?;

        Ok(RateRecord::new(
            parse_date(&self.date)?,
            self.base_currency,
            rates_from_json(&json)?,
        ))
    }
}

#[cfg(feature = "sqlite")]
impl SqliteRatePoint {
    pub fn into_domain(self) -> Result<RatePoint, StoreError> {
        Ok(RatePoint {
            date: parse_date(&self.date)?,
            rate: parse_rate(&self.rate)?,
        })
    }
}

// ─────────────────────────────────────────────────────────────────────────────
// Parsing helpers
// ─────────────────────────────────────────────────────────────────────────────

/// Encodes a rate mapping as a JSON object of numbers.
pub fn rates_to_json(rates: &RateMap) -> Result<Value, StoreError> {
    let mut object = Map::with_capacity(rates.len());
    for (currency, rate) in rates {
        let number = rate
            .to_f64()
            .and_then(Number::from_f64)
            .ok_or_else(|| {
                StoreError::Persistence(format!("Rate {} for {} is not representable", rate, currency))
            })?;
        object.insert(currency.clone(), Value::Number(number));
    }
    Ok(Value::Object(object))
}

/// Decodes a stored JSON object back into a rate mapping.
pub fn rates_from_json(value: &Value) -> Result<RateMap, StoreError> {
    let object = value
        .as_object()
        .ok_or_else(|| StoreError::Query(format!("Expected JSON object, got {}", value)))?;

    object
        .iter()
        .map(|(currency, rate)| -> Result<(String, Decimal), StoreError> {
            let raw = match rate {
                Value::Number(n) => n.to_string(),
                Value::String(s) => s.clone(),
                other => {
                    return Err(StoreError::Query(format!(
                        "Unexpected rate for {}: {}",
                        currency, other
                    )));
                }
            };
            Ok((currency.clone(), parse_rate(&raw)?))
        })
        .collect()
}

/// Parses a rate rendered by the database or by serde_json.
pub fn parse_rate(raw: &str) -> Result<Decimal, StoreError> {
    Decimal::from_str(raw)
        .or_else(|_| Decimal::from_scientific(raw))
        .map_err(|e| StoreError::Query(format!("Invalid stored rate {:?}: {}", raw, e)))
}

#[cfg(feature = "sqlite")]
pub fn parse_date(raw: &str) -> Result<NaiveDate, StoreError> {
    NaiveDate::parse_from_str(raw, DATE_FORMAT)
        .map_err(|e| StoreError::Query(format!("Invalid stored date {:?}: {}", raw, e)))
}

#[cfg(feature = "sqlite")]
pub fn format_date(date: NaiveDate) -> String {
    date.format(DATE_FORMAT).to_string()
}
