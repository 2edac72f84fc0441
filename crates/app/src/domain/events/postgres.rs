//! Postgres `LISTEN`/`NOTIFY` transport.
//!
//! Topics map one-to-one onto notification channels. Notifications are not
//! persisted: a consumer only sees messages sent while it is listening.

use std::fmt;

use async_trait::async_trait;
use sqlx::{PgPool, postgres::PgListener, query};
use tracing::{debug, info};

use crate::domain::events::{BrokerError, EventConsumer, EventMessage, EventProducer};

const NOTIFY_SQL: &str = "SELECT pg_notify($1, $2)";

/// Consumer holding a dedicated listener connection between `connect` and
/// `disconnect`.
pub struct PgNotifyConsumer {
    pool: PgPool,
    listener: Option<PgListener>,
}

impl PgNotifyConsumer {
    #[must_use]
    pub fn new(pool: PgPool) -> Self {
        Self {
            pool,
            listener: None,
        }
    }

    /// Open the listener connection. Calling it again while connected is a no-op.
    ///
    /// # Errors
    ///
    /// Returns an error when the connection cannot be established.
    pub async fn connect(&mut self) -> Result<(), BrokerError> {
        if self.listener.is_none() {
            self.listener = Some(PgListener::connect_with(&self.pool).await?);

            info!("event consumer connected");
        }

        Ok(())
    }

    fn listener(&mut self) -> Result<&mut PgListener, BrokerError> {
        self.listener.as_mut().ok_or(BrokerError::NotConnected)
    }
}

impl fmt::Debug for PgNotifyConsumer {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("PgNotifyConsumer")
            .field("connected", &self.listener.is_some())
            .finish_non_exhaustive()
    }
}

#[async_trait]
impl EventConsumer for PgNotifyConsumer {
    async fn subscribe(&mut self, topics: Vec<String>) -> Result<(), BrokerError> {
        self.connect().await?;

        self.listener()?
            .listen_all(topics.iter().map(String::as_str))
            .await?;

        debug!(?topics, "subscribed");

        Ok(())
    }

    async fn recv(&mut self) -> Result<Option<EventMessage>, BrokerError> {
        let Some(listener) = self.listener.as_mut() else {
            return Ok(None);
        };

        let notification = listener.recv().await?;

        Ok(Some(EventMessage::new(
            notification.channel(),
            notification.payload(),
        )))
    }

    async fn disconnect(&mut self) -> Result<(), BrokerError> {
        if let Some(mut listener) = self.listener.take() {
            listener.unlisten_all().await?;

            info!("event consumer disconnected");
        }

        Ok(())
    }
}

/// Producer sending notifications over the shared pool.
#[derive(Debug, Clone)]
pub struct PgNotifyProducer {
    pool: PgPool,
}

impl PgNotifyProducer {
    #[must_use]
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl EventProducer for PgNotifyProducer {
    async fn send(&self, topic: String, payload: String) -> Result<(), BrokerError> {
        query(NOTIFY_SQL)
            .bind(&topic)
            .bind(&payload)
            .execute(&self.pool)
            .await?;

        debug!(%topic, "event sent");

        Ok(())
    }
}
