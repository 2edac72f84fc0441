//! Event transport errors.

use thiserror::Error;

#[derive(Debug, Error)]
pub enum BrokerError {
    #[error("consumer is not connected")]
    NotConnected,

    #[error("transport closed")]
    Closed,

    #[error("storage error")]
    Sql(#[from] sqlx::Error),
}
