//! Cache update worker
//!
//! Runs the cache update dispatcher next to the HTTP server and restarts it
//! when the event stream fails, until shutdown.

use std::time::Duration;

use tokio::task::JoinHandle;
use tokio_util::sync::CancellationToken;
use tracing::{info, warn};

use forno_app::domain::{cache_updates::CacheUpdateDispatcher, events::EventConsumer};

pub(crate) fn spawn<C>(
    dispatcher: CacheUpdateDispatcher,
    mut consumer: C,
    shutdown: CancellationToken,
    restart_delay: Duration,
) -> JoinHandle<()>
where
    C: EventConsumer + 'static,
{
    tokio::spawn(async move {
        loop {
            match dispatcher.run(&mut consumer, shutdown.clone()).await {
                Ok(()) if shutdown.is_cancelled() => break,
                Ok(()) => warn!("event stream ended, restarting cache update dispatcher"),
                Err(error) => warn!(%error, "cache update dispatcher failed, restarting"),
            }

            tokio::select! {
                () = shutdown.cancelled() => break,
                () = tokio::time::sleep(restart_delay) => {}
            }
        }

        info!("cache update worker stopped");
    })
}

#[cfg(test)]
mod tests {
    use std::{
        collections::BTreeMap,
        sync::{
            Arc,
            atomic::{AtomicUsize, Ordering},
        },
    };

    use serde_json::json;
    use testresult::TestResult;
    use tokio::{sync::Notify, time::timeout};

    use forno_app::domain::{
        cache_updates::{PRODUCT_TOPIC, ProductPriceHandler},
        events::{BrokerError, EventProducer, MockEventConsumer, channel},
        pricing::MockPricingCache,
        tenants::TenantId,
    };

    use super::*;

    const WAIT: Duration = Duration::from_secs(2);

    #[tokio::test]
    async fn applies_published_updates_until_cancelled() -> TestResult {
        let applied = Arc::new(Notify::new());
        let notify = applied.clone();

        let mut cache = MockPricingCache::new();

        cache
            .expect_upsert_product_price()
            .once()
            .withf(|record| {
                record.product_id == "margherita" && record.tenant == TenantId::new("tenant-a")
            })
            .returning(move |_| {
                notify.notify_one();
                Ok(())
            });

        cache.expect_upsert_topping_price().never();

        let dispatcher =
            CacheUpdateDispatcher::new().register(Arc::new(ProductPriceHandler::new(Arc::new(cache))));

        let (producer, consumer) = channel();
        let shutdown = CancellationToken::new();

        let worker = spawn(dispatcher, consumer, shutdown.clone(), Duration::from_millis(10));

        producer
            .send(
                PRODUCT_TOPIC.to_string(),
                json!({
                    "id": "margherita",
                    "tenantId": "tenant-a",
                    "priceConfiguration": BTreeMap::from([(
                        "Size",
                        json!({ "priceType": "base", "availableOptions": { "Small": 400 } }),
                    )]),
                })
                .to_string(),
            )
            .await?;

        timeout(WAIT, applied.notified()).await?;

        shutdown.cancel();

        timeout(WAIT, worker).await??;

        Ok(())
    }

    #[tokio::test]
    async fn failed_dispatcher_is_restarted() -> TestResult {
        let attempts = Arc::new(AtomicUsize::new(0));
        let counter = attempts.clone();

        let mut consumer = MockEventConsumer::new();

        consumer.expect_subscribe().returning(move |_| {
            counter.fetch_add(1, Ordering::SeqCst);
            Err(BrokerError::NotConnected)
        });
        consumer.expect_recv().never();
        consumer.expect_disconnect().returning(|| Ok(()));

        let shutdown = CancellationToken::new();

        let worker = spawn(
            CacheUpdateDispatcher::new(),
            consumer,
            shutdown.clone(),
            Duration::from_millis(5),
        );

        timeout(WAIT, async {
            while attempts.load(Ordering::SeqCst) < 3 {
                tokio::time::sleep(Duration::from_millis(5)).await;
            }
        })
        .await?;

        shutdown.cancel();

        timeout(WAIT, worker).await??;

        Ok(())
    }
}
