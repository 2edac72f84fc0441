//! Payment gateway errors.

use thiserror::Error;

#[derive(Debug, Error)]
pub enum GatewayError {
    #[error("http error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("unexpected response from payment gateway: {0}")]
    UnexpectedResponse(String),
}
