//! Cache update dispatcher.

use std::{collections::HashMap, fmt, sync::Arc};

use tokio_util::sync::CancellationToken;
use tracing::{debug, info, warn};

use crate::domain::{
    cache_updates::{errors::CacheUpdateError, handlers::TopicHandler},
    events::{BrokerError, EventConsumer, EventMessage},
};

/// What happened to a dispatched message.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DispatchOutcome {
    /// A registered handler applied it.
    Handled,

    /// No handler is registered for its topic.
    Ignored,
}

/// Routes consumed messages to the handler registered for their topic.
#[derive(Clone, Default)]
pub struct CacheUpdateDispatcher {
    handlers: HashMap<String, Arc<dyn TopicHandler>>,
}

impl CacheUpdateDispatcher {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a handler under its topic, replacing any previous one.
    #[must_use]
    pub fn register(mut self, handler: Arc<dyn TopicHandler>) -> Self {
        self.handlers.insert(handler.topic().to_string(), handler);
        self
    }

    /// Registered topics, sorted.
    #[must_use]
    pub fn topics(&self) -> Vec<String> {
        let mut topics: Vec<String> = self.handlers.keys().cloned().collect();
        topics.sort();
        topics
    }

    /// Apply a single message.
    ///
    /// # Errors
    ///
    /// Returns the handler's error when applying the message fails.
    #[tracing::instrument(
        name = "cache_updates.dispatch",
        skip(self, message),
        fields(topic = %message.topic),
        err(level = "warn")
    )]
    pub async fn dispatch(&self, message: &EventMessage) -> Result<DispatchOutcome, CacheUpdateError> {
        let Some(handler) = self.handlers.get(&message.topic) else {
            debug!(payload = %message.payload, "no handler for topic");

            return Ok(DispatchOutcome::Ignored);
        };

        handler.handle(&message.payload).await?;

        Ok(DispatchOutcome::Handled)
    }

    /// Consume until `shutdown` fires or the stream closes.
    ///
    /// A message that fails to apply is logged and skipped. The consumer is
    /// disconnected before returning, whatever the outcome, so the same
    /// consumer can be passed to `run` again.
    ///
    /// # Errors
    ///
    /// Returns an error when subscribing or receiving fails.
    pub async fn run(
        &self,
        consumer: &mut dyn EventConsumer,
        shutdown: CancellationToken,
    ) -> Result<(), BrokerError> {
        info!(topics = ?self.topics(), "cache update dispatcher started");

        let result = self.consume(consumer, &shutdown).await;

        if let Err(error) = consumer.disconnect().await {
            warn!(%error, "failed to disconnect event consumer");
        }

        info!("cache update dispatcher stopped");

        result
    }

    async fn consume(
        &self,
        consumer: &mut dyn EventConsumer,
        shutdown: &CancellationToken,
    ) -> Result<(), BrokerError> {
        consumer.subscribe(self.topics()).await?;

        loop {
            tokio::select! {
                biased;

                () = shutdown.cancelled() => {
                    info!("cache update dispatcher shutting down");

                    return Ok(());
                }

                received = consumer.recv() => {
                    let Some(message) = received? else {
                        info!("event stream closed");

                        return Ok(());
                    };

                    // Failures are already logged by `dispatch`.
                    let _outcome = self.dispatch(&message).await;
                }
            }
        }
    }
}

impl fmt::Debug for CacheUpdateDispatcher {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("CacheUpdateDispatcher")
            .field("topics", &self.topics())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use std::{collections::BTreeMap, time::Duration};

    use serde_json::json;
    use testresult::TestResult;
    use tokio::time::timeout;

    use crate::{
        domain::{
            cache_updates::{
                MockTopicHandler, PRODUCT_TOPIC, ProductPriceHandler, TOPPING_TOPIC,
                ToppingPriceHandler,
            },
            events::{EventProducer, MockEventConsumer, channel},
            pricing::{
                PricingCache,
                records::{PriceGroup, ProductPriceRecord},
            },
        },
        test::TestContext,
    };

    use super::*;

    fn recording_handler(topic: &'static str, expected_calls: usize) -> MockTopicHandler {
        let mut handler = MockTopicHandler::new();

        handler.expect_topic().return_const(topic);
        handler
            .expect_handle()
            .times(expected_calls)
            .returning(|payload| {
                if payload == "bad" {
                    Err(CacheUpdateError::Payload(
                        serde_json::from_str::<u8>("bad").unwrap_err(),
                    ))
                } else {
                    Ok(())
                }
            });

        handler
    }

    #[tokio::test]
    async fn unknown_topic_is_ignored() -> TestResult {
        let dispatcher =
            CacheUpdateDispatcher::new().register(Arc::new(recording_handler(PRODUCT_TOPIC, 0)));

        let outcome = dispatcher
            .dispatch(&EventMessage::new("inventory", "{}"))
            .await?;

        assert_eq!(outcome, DispatchOutcome::Ignored);

        Ok(())
    }

    #[tokio::test]
    async fn message_is_routed_by_topic() -> TestResult {
        let dispatcher = CacheUpdateDispatcher::new()
            .register(Arc::new(recording_handler(PRODUCT_TOPIC, 1)))
            .register(Arc::new(recording_handler(TOPPING_TOPIC, 0)));

        let outcome = dispatcher
            .dispatch(&EventMessage::new(PRODUCT_TOPIC, "{}"))
            .await?;

        assert_eq!(outcome, DispatchOutcome::Handled);
        assert_eq!(dispatcher.topics(), vec!["product", "topping"]);

        Ok(())
    }

    #[tokio::test]
    async fn failing_message_does_not_stop_the_loop() -> TestResult {
        let dispatcher =
            CacheUpdateDispatcher::new().register(Arc::new(recording_handler(PRODUCT_TOPIC, 3)));

        let (producer, mut consumer) = channel();

        for payload in ["ok-1", "bad", "ok-2"] {
            producer
                .send(PRODUCT_TOPIC.to_string(), payload.to_string())
                .await?;
        }
        drop(producer);

        timeout(
            Duration::from_secs(5),
            dispatcher.run(&mut consumer, CancellationToken::new()),
        )
        .await??;

        Ok(())
    }

    #[tokio::test]
    async fn shutdown_stops_a_busy_loop_and_disconnects() -> TestResult {
        let dispatcher =
            CacheUpdateDispatcher::new().register(Arc::new(recording_handler(PRODUCT_TOPIC, 0)));

        let mut consumer = MockEventConsumer::new();

        consumer
            .expect_subscribe()
            .once()
            .withf(|topics| *topics == ["product"])
            .returning(|_| Ok(()));
        consumer
            .expect_recv()
            .returning(|| Ok(Some(EventMessage::new(PRODUCT_TOPIC, "{}"))));
        consumer.expect_disconnect().once().returning(|| Ok(()));

        let shutdown = CancellationToken::new();
        shutdown.cancel();

        dispatcher.run(&mut consumer, shutdown).await?;

        Ok(())
    }

    #[tokio::test]
    async fn cancelling_a_running_dispatcher_returns() -> TestResult {
        let dispatcher =
            CacheUpdateDispatcher::new().register(Arc::new(recording_handler(PRODUCT_TOPIC, 1)));

        let (producer, mut consumer) = channel();
        let shutdown = CancellationToken::new();

        let task = tokio::spawn({
            let shutdown = shutdown.clone();

            async move { dispatcher.run(&mut consumer, shutdown).await }
        });

        producer
            .send(PRODUCT_TOPIC.to_string(), "ok".to_string())
            .await?;

        tokio::time::sleep(Duration::from_millis(100)).await;
        shutdown.cancel();

        timeout(Duration::from_secs(5), task).await???;

        Ok(())
    }

    #[tokio::test]
    async fn consumer_is_disconnected_when_subscribe_fails() {
        let dispatcher =
            CacheUpdateDispatcher::new().register(Arc::new(recording_handler(TOPPING_TOPIC, 0)));

        let mut consumer = MockEventConsumer::new();

        consumer
            .expect_subscribe()
            .once()
            .returning(|_| Err(BrokerError::NotConnected));
        consumer.expect_recv().never();
        consumer.expect_disconnect().once().returning(|| Ok(()));

        let result = dispatcher.run(&mut consumer, CancellationToken::new()).await;

        assert!(matches!(result, Err(BrokerError::NotConnected)), "got {result:?}");
    }

    #[tokio::test]
    async fn product_message_updates_only_the_addressed_product() -> TestResult {
        let ctx = TestContext::new().await;
        let cache: Arc<dyn PricingCache> = Arc::new(ctx.pricing.clone());

        let dispatcher = CacheUpdateDispatcher::new()
            .register(Arc::new(ProductPriceHandler::new(cache.clone())))
            .register(Arc::new(ToppingPriceHandler::new(cache.clone())));

        let untouched = ProductPriceRecord {
            product_id: "calzone".to_string(),
            tenant: ctx.tenant.clone(),
            price_configuration: BTreeMap::from([(
                "Size".to_string(),
                PriceGroup {
                    price_type: "base".to_string(),
                    available_options: BTreeMap::from([("Small".to_string(), 550)]),
                },
            )]),
        };

        cache.upsert_product_price(untouched.clone()).await?;

        let (producer, mut consumer) = channel();

        producer
            .send(
                PRODUCT_TOPIC.to_string(),
                json!({
                    "id": "margherita",
                    "tenantId": ctx.tenant.as_str(),
                    "priceConfiguration": {
                        "Size": { "priceType": "base", "availableOptions": { "Small": 400 } }
                    }
                })
                .to_string(),
            )
            .await?;
        producer
            .send(PRODUCT_TOPIC.to_string(), "not json".to_string())
            .await?;
        producer
            .send(
                TOPPING_TOPIC.to_string(),
                json!({ "id": "olives", "tenantId": ctx.tenant.as_str(), "price": 30 }).to_string(),
            )
            .await?;
        drop(producer);

        timeout(
            Duration::from_secs(10),
            dispatcher.run(&mut consumer, CancellationToken::new()),
        )
        .await??;

        let products = cache
            .product_prices(
                ctx.tenant.clone(),
                vec!["margherita".to_string(), "calzone".to_string()],
            )
            .await?;

        let margherita = products
            .iter()
            .find(|product| product.product_id == "margherita")
            .ok_or("margherita not cached")?;
        let calzone = products
            .iter()
            .find(|product| product.product_id == "calzone")
            .ok_or("calzone missing")?;

        assert_eq!(
            margherita.price_configuration["Size"].available_options["Small"],
            400
        );
        assert_eq!(*calzone, untouched);

        let toppings = cache
            .topping_prices(ctx.tenant.clone(), vec!["olives".to_string()])
            .await?;

        assert_eq!(toppings.len(), 1, "topping after malformed message was not applied");

        Ok(())
    }
}
