//! Payments
//!
//! Only the session-creation contract of the external gateway lives here.

pub mod errors;
pub mod gateway;
mod http;

pub use errors::GatewayError;
pub use gateway::*;
pub use http::{HttpPaymentGateway, HttpPaymentGatewayConfig};
