//! # FX Rates Types
//!
//! Domain types and port traits for the exchange-rate ingestion service.
//! This crate has no IO dependencies - only data structures, invariants,
//! and trait definitions.
//!
//! ## Architecture
//!
//! - `domain/` - Requests, decoded observations, and stored rate records
//! - `ports/` - Trait definitions that adapters must implement
//! - `dto/` - Read-path queries and ingest results
//! - `error/` - One error enum per pipeline stage

pub mod domain;
pub mod dto;
pub mod error;
pub mod ports;

// Re-export commonly used types
pub use domain::{ExchangeRateRequest, ObservationPoint, RateMap, RatePoint, RateRecord};
pub use dto::{IngestSummary, RateSeriesQuery};
pub use error::{DecodeError, FetchError, IngestError, RequestError, SourceError, StoreError};
pub use ports::{RateSource, RateStore};
