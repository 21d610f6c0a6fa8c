//! Structure-specific SDMX XML decoder.
//!
//! Expected shape (namespace prefixes are ignored):
//!
//! ```xml
//! <message:StructureSpecificData>
//!   <message:DataSet>
//!     <Series>
//!       <Obs TIME_PERIOD="2024-05-02" OBS_VALUE="1.0702"/>
//!     </Series>
//!   </message:DataSet>
//! </message:StructureSpecificData>
//! ```
//!
//! The whole document is deserialized before any observation is parsed, so a
//! document that is not well-formed is always reported as
//! [`DecodeError::MalformedDocument`].

use std::str::FromStr;

use chrono::NaiveDate;
use rust_decimal::Decimal;
use serde::Deserialize;
use tracing::debug;

use fxrates_types::DecodeError;
use fxrates_types::ObservationPoint;
use fxrates_types::domain::request::DATE_FORMAT;

#[derive(Debug, Deserialize)]
struct StructureSpecificData {
    #[serde(rename = "DataSet")]
    data_set: DataSet,
}

#[derive(Debug, Deserialize)]
struct DataSet {
    #[serde(rename = "Series", default)]
    series: Vec<Series>,
}

#[derive(Debug, Deserialize)]
struct Series {
    #[serde(rename = "Obs", default)]
    observations: Vec<RawObservation>,
}

/// Attributes of one `Obs` node as found in the document.
#[derive(Debug, Deserialize)]
struct RawObservation {
    #[serde(rename = "@TIME_PERIOD")]
    time_period: Option<String>,
    #[serde(rename = "@OBS_VALUE")]
    obs_value: Option<String>,
}

/// Decodes an SDMX structure-specific payload into observation points.
///
/// Observations with a missing or empty `TIME_PERIOD`/`OBS_VALUE` are skipped.
/// A non-empty attribute that fails to parse is a hard error and no points are returned.
pub fn decode_observations(payload: &[u8]) -> Result<Vec<ObservationPoint>, DecodeError> {
    let document: StructureSpecificData = quick_xml::de::from_reader(payload)
        .map_err(|e| DecodeError::MalformedDocument(e.to_string()))?;

    let raw: Vec<RawObservation> = document
        .data_set
        .series
        .into_iter()
        .flat_map(|series| series.observations)
        .collect();
    let total = raw.len();

    let mut points = Vec::with_capacity(total);
    for obs in raw {
        let (Some(time_period), Some(obs_value)) = (obs.time_period, obs.obs_value) else {
            continue;
        };
        if time_period.is_empty() || obs_value.is_empty() {
            continue;
        }

        points.push(ObservationPoint::new(
            parse_date(&time_period)?,
            parse_value(&obs_value)?,
        ));
    }

    debug!(
        observations = total,
        decoded = points.len(),
        skipped = total - points.len(),
        "Decoded SDMX payload"
    );

    Ok(points)
}

/// Parses a `YYYY-MM-DD` date. Unpadded fields, signs and surrounding spaces are rejected.
fn parse_date(raw: &str) -> Result<NaiveDate, DecodeError> {
    let invalid = |reason: String| DecodeError::MalformedObservation {
        raw: raw.to_string(),
        reason: format!("invalid TIME_PERIOD: {}", reason),
    };

    let bytes = raw.as_bytes();
    let shaped = bytes.len() == 10
        && bytes.iter().enumerate().all(|(i, b)| match i {
            4 | 7 => *b == b'-',
            _ => b.is_ascii_digit(),
        });
    if !shaped {
        return Err(invalid("expected YYYY-MM-DD".to_string()));
    }

    NaiveDate::parse_from_str(raw, DATE_FORMAT).map_err(|e| invalid(e.to_string()))
}

/// Parses a plain or exponent-notation decimal.
fn parse_value(raw: &str) -> Result<Decimal, DecodeError> {
    let invalid = |reason: String| DecodeError::MalformedObservation {
        raw: raw.to_string(),
        reason: format!("invalid OBS_VALUE: {}", reason),
    };

    if !raw
        .chars()
        .all(|c| c.is_ascii_digit() || matches!(c, '.' | '+' | '-' | 'e' | 'E'))
    {
        return Err(invalid("unexpected character".to_string()));
    }

    Decimal::from_str(raw)
        .or_else(|_| Decimal::from_scientific(raw))
        .map_err(|e| invalid(e.to_string()))
}
