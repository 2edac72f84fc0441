//! Pricing
//!
//! Read-side projections of catalog prices (fed by cache update events) and
//! the price computation that runs on top of them.

pub mod engine;
pub mod errors;
pub mod records;
mod repository;
pub mod service;

pub use errors::{PricingError, PricingLookupError, PricingServiceError};
pub use service::*;
