//! Cache update errors.

use thiserror::Error;

use crate::domain::pricing::PricingServiceError;

#[derive(Debug, Error)]
pub enum CacheUpdateError {
    #[error("malformed payload: {0}")]
    Payload(#[from] serde_json::Error),

    #[error("failed to write pricing cache")]
    Cache(#[from] PricingServiceError),
}
