//! Domain models for the rate pipeline.

pub mod observation;
pub mod record;
pub mod request;

pub use observation::ObservationPoint;
pub use record::{RateMap, RatePoint, RateRecord};
pub use request::ExchangeRateRequest;
