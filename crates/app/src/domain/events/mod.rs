//! Events
//!
//! Topic-addressed messages with opaque string payloads, and the transports
//! that carry them between processes.

mod channel;
pub mod errors;
mod postgres;

use async_trait::async_trait;
use mockall::automock;

pub use channel::{ChannelConsumer, ChannelProducer, channel};
pub use errors::BrokerError;
pub use postgres::{PgNotifyConsumer, PgNotifyProducer};

/// Topic a new order snapshot is published on.
pub const ORDER_TOPIC: &str = "order";

/// A message received from or sent to a topic.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EventMessage {
    pub topic: String,
    pub payload: String,
}

impl EventMessage {
    #[must_use]
    pub fn new(topic: impl Into<String>, payload: impl Into<String>) -> Self {
        Self {
            topic: topic.into(),
            payload: payload.into(),
        }
    }
}

/// Receiving side of a transport.
///
/// A consumer is used by a single loop at a time; it is `Send` so that loop
/// can run on its own task.
#[automock]
#[async_trait]
pub trait EventConsumer: Send {
    /// Start receiving messages published on `topics`.
    async fn subscribe(&mut self, topics: Vec<String>) -> Result<(), BrokerError>;

    /// Next message, or `None` once the stream has closed.
    async fn recv(&mut self) -> Result<Option<EventMessage>, BrokerError>;

    /// Stop receiving and release the underlying connection.
    async fn disconnect(&mut self) -> Result<(), BrokerError>;
}

/// Sending side of a transport. Delivery is fire-and-forget.
#[automock]
#[async_trait]
pub trait EventProducer: Send + Sync {
    async fn send(&self, topic: String, payload: String) -> Result<(), BrokerError>;
}
