//! # FX Rates Service
//!
//! Application layer for the exchange-rate service.
//! Orchestrates a `RateSource` and a `RateStore` without knowing their adapters.

pub mod service;


pub use service::RateService;
