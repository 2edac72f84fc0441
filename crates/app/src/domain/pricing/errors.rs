//! Pricing errors.

use sqlx::Error;
use thiserror::Error;

/// The cart asked for a price the cached product does not have.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum PricingLookupError {
    #[error("product {product_id} has no option group {group}")]
    UnknownGroup { product_id: String, group: String },

    #[error("product {product_id} has no option {option} in group {group}")]
    UnknownOption {
        product_id: String,
        group: String,
        option: String,
    },

    #[error("cart total overflows at product {product_id}")]
    Overflow { product_id: String },
}

#[derive(Debug, Error)]
pub enum PricingServiceError {
    #[error("pricing cache entry not found")]
    NotFound,

    #[error("invalid pricing cache data")]
    InvalidData,

    #[error("storage error")]
    Sql(#[source] Error),
}

impl From<Error> for PricingServiceError {
    fn from(error: Error) -> Self {
        match error {
            Error::RowNotFound => Self::NotFound,
            Error::ColumnDecode { .. } | Error::Decode(_) => Self::InvalidData,
            _ => Self::Sql(error),
        }
    }
}

/// Errors raised while pricing a cart.
#[derive(Debug, Error)]
pub enum PricingError {
    #[error(transparent)]
    Lookup(#[from] PricingLookupError),

    #[error("failed to read pricing cache")]
    Cache(#[from] PricingServiceError),
}
