//! # FX Rates SDMX Client
//!
//! Fetches daily exchange rates from an SDMX REST service (the ECB `EXR` dataflow
//! by default) and decodes the structure-specific XML payload.
//!
//! ```ignore
//! let client = SdmxClient::new(ClientConfig::default())?;
//! let points = client.fetch_observations(&request).await?;
//! ```

pub mod client;
pub mod decode;
pub mod request;

pub use client::{ClientConfig, SDMX_ACCEPT, SdmxClient, parse_header};
pub use decode::decode_observations;
pub use request::{DEFAULT_BASE_URL, RequestBuilder};
