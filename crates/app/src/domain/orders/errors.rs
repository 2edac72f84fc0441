//! Order errors.

use sqlx::{
    Error,
    error::{DatabaseError, ErrorKind},
};
use thiserror::Error;

use crate::domain::{
    coupons::CouponsServiceError,
    orders::charges::ChargesError,
    pricing::{PricingError, PricingLookupError, PricingServiceError},
};

#[derive(Debug, Error)]
pub enum LedgerError {
    /// Another writer already bound this idempotency key.
    #[error("idempotency key already used")]
    DuplicateKey,

    #[error("order not found")]
    NotFound,

    #[error("related resource not found")]
    InvalidReference,

    #[error("invalid order data")]
    InvalidData,

    #[error("storage error")]
    Sql(#[source] Error),
}

impl From<Error> for LedgerError {
    fn from(error: Error) -> Self {
        if matches!(error, Error::RowNotFound) {
            return Self::NotFound;
        }

        if matches!(error, Error::ColumnDecode { .. } | Error::Decode(_)) {
            return Self::InvalidData;
        }

        match error.as_database_error().map(DatabaseError::kind) {
            Some(ErrorKind::UniqueViolation) => Self::DuplicateKey,
            Some(ErrorKind::ForeignKeyViolation) => Self::InvalidReference,
            Some(ErrorKind::CheckViolation | ErrorKind::NotNullViolation) => Self::InvalidData,
            Some(ErrorKind::Other | _) | None => Self::Sql(error),
        }
    }
}

impl From<serde_json::Error> for LedgerError {
    fn from(_: serde_json::Error) -> Self {
        Self::InvalidData
    }
}

#[derive(Debug, Error)]
pub enum OrdersServiceError {
    #[error("idempotency key is required")]
    MissingIdempotencyKey,

    #[error(transparent)]
    PricingLookup(#[from] PricingLookupError),

    #[error("failed to read pricing cache")]
    Pricing(#[source] PricingServiceError),

    #[error("failed to resolve coupon")]
    Coupons(#[from] CouponsServiceError),

    #[error("failed to calculate order charges")]
    Charges(#[from] ChargesError),

    #[error("order not found")]
    NotFound,

    #[error("order ledger error")]
    Ledger(#[source] LedgerError),
}

impl From<PricingError> for OrdersServiceError {
    fn from(error: PricingError) -> Self {
        match error {
            PricingError::Lookup(error) => Self::PricingLookup(error),
            PricingError::Cache(error) => Self::Pricing(error),
        }
    }
}

impl From<LedgerError> for OrdersServiceError {
    fn from(error: LedgerError) -> Self {
        match error {
            LedgerError::NotFound => Self::NotFound,
            _ => Self::Ledger(error),
        }
    }
}
