//! Orders
//!
//! Idempotent order intake on top of the pricing caches, and the ledger that
//! makes it idempotent.

pub mod charges;
pub mod data;
pub mod errors;
pub mod ledger;
pub mod records;
mod repositories;
pub mod service;

pub use errors::{LedgerError, OrdersServiceError};
pub use ledger::*;
pub use service::*;
