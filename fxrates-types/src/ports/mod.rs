//! Port traits (interfaces for adapters).
//!
//! The service layer depends on these traits, not on concrete HTTP clients or databases.

mod source;
mod store;

pub use source::RateSource;
pub use store::RateStore;
