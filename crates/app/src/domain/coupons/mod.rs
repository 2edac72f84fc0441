//! Coupons
//!
//! Coupons are managed by the catalog side; this module only resolves them.

pub mod errors;
pub mod records;
mod repository;
pub mod service;

pub use errors::CouponsServiceError;
pub use service::*;
