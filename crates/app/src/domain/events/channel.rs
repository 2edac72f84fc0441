//! In-process transport over a tokio channel.

use std::collections::HashSet;

use async_trait::async_trait;
use tokio::sync::mpsc::{UnboundedReceiver, UnboundedSender, unbounded_channel};
use tracing::debug;

use crate::domain::events::{BrokerError, EventConsumer, EventMessage, EventProducer};

/// Create a connected producer/consumer pair.
#[must_use]
pub fn channel() -> (ChannelProducer, ChannelConsumer) {
    let (sender, receiver) = unbounded_channel();

    (
        ChannelProducer { sender },
        ChannelConsumer {
            receiver,
            topics: HashSet::new(),
        },
    )
}

#[derive(Debug, Clone)]
pub struct ChannelProducer {
    sender: UnboundedSender<EventMessage>,
}

#[async_trait]
impl EventProducer for ChannelProducer {
    async fn send(&self, topic: String, payload: String) -> Result<(), BrokerError> {
        self.sender
            .send(EventMessage { topic, payload })
            .map_err(|_| BrokerError::Closed)
    }
}

/// Consumer that drops messages on topics it has not subscribed to.
#[derive(Debug)]
pub struct ChannelConsumer {
    receiver: UnboundedReceiver<EventMessage>,
    topics: HashSet<String>,
}

#[async_trait]
impl EventConsumer for ChannelConsumer {
    async fn subscribe(&mut self, topics: Vec<String>) -> Result<(), BrokerError> {
        self.topics.extend(topics);

        Ok(())
    }

    async fn recv(&mut self) -> Result<Option<EventMessage>, BrokerError> {
        while let Some(message) = self.receiver.recv().await {
            if self.topics.contains(&message.topic) {
                return Ok(Some(message));
            }

            debug!(topic = %message.topic, "not subscribed, dropping message");
        }

        Ok(None)
    }

    async fn disconnect(&mut self) -> Result<(), BrokerError> {
        self.topics.clear();
        self.receiver.close();

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use testresult::TestResult;

    use super::*;

    #[tokio::test]
    async fn delivers_only_subscribed_topics_in_order() -> TestResult {
        let (producer, mut consumer) = channel();

        consumer.subscribe(vec!["product".to_string()]).await?;

        producer.send("order".to_string(), "a".to_string()).await?;
        producer.send("product".to_string(), "b".to_string()).await?;
        producer.send("product".to_string(), "c".to_string()).await?;
        drop(producer);

        assert_eq!(consumer.recv().await?, Some(EventMessage::new("product", "b")));
        assert_eq!(consumer.recv().await?, Some(EventMessage::new("product", "c")));
        assert_eq!(consumer.recv().await?, None);

        Ok(())
    }

    #[tokio::test]
    async fn send_after_disconnect_fails() -> TestResult {
        let (producer, mut consumer) = channel();

        consumer.disconnect().await?;

        let result = producer.send("product".to_string(), "x".to_string()).await;

        assert!(matches!(result, Err(BrokerError::Closed)), "got {result:?}");

        Ok(())
    }
}
