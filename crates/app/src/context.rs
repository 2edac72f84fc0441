//! App Context

use std::{fmt, sync::Arc};

use thiserror::Error;
use tracing::warn;

use crate::{
    database::{self, Db},
    domain::{
        cache_updates::{
            CacheUpdateDispatcher, PRODUCT_TOPIC, ProductPriceHandler, TOPPING_TOPIC,
            ToppingPriceHandler,
        },
        coupons::PgCouponsService,
        events::{EventProducer, PgNotifyConsumer, PgNotifyProducer},
        orders::{
            IntakeDependencies, OrderIntakeService, OrdersService, PgOrderLedger,
            charges::IntakePolicy,
        },
        payments::{HttpPaymentGateway, HttpPaymentGatewayConfig, PaymentGateway},
        pricing::{PgPricingCache, PricingCache},
    },
};

#[derive(Debug, Error)]
pub enum AppInitError {
    #[error("failed to connect to database")]
    Database(#[source] sqlx::Error),
}

#[derive(Clone)]
pub struct AppContext {
    pub db: Db,
    pub pricing: Arc<dyn PricingCache>,
    pub orders: Arc<dyn OrdersService>,
}

impl AppContext {
    /// Build application context from a database URL.
    ///
    /// # Errors
    ///
    /// Returns an error when establishing a database connection fails.
    pub async fn from_database_url(
        url: &str,
        max_connections: u32,
        payments: HttpPaymentGatewayConfig,
        policy: IntakePolicy,
    ) -> Result<Self, AppInitError> {
        let pool = database::connect(url, max_connections)
            .await
            .map_err(AppInitError::Database)?;

        Ok(Self::new(
            Db::new(pool),
            Arc::new(HttpPaymentGateway::new(payments)),
            policy,
        ))
    }

    /// Wire the Postgres-backed services around an existing pool.
    #[must_use]
    pub fn new(db: Db, payments: Arc<dyn PaymentGateway>, policy: IntakePolicy) -> Self {
        let pricing: Arc<dyn PricingCache> = Arc::new(PgPricingCache::new(db.clone()));
        let events: Arc<dyn EventProducer> = Arc::new(PgNotifyProducer::new(db.pool().clone()));

        let orders = OrderIntakeService::new(IntakeDependencies {
            pricing: pricing.clone(),
            coupons: Arc::new(PgCouponsService::new(db.clone())),
            ledger: Arc::new(PgOrderLedger::new(db.clone())),
            payments,
            events,
            policy,
        });

        Self {
            db,
            pricing,
            orders: Arc::new(orders),
        }
    }

    /// Dispatcher with a handler registered for each of `topics` that has one.
    #[must_use]
    pub fn dispatcher(&self, topics: &[String]) -> CacheUpdateDispatcher {
        topics
            .iter()
            .fold(CacheUpdateDispatcher::new(), |dispatcher, topic| {
                match topic.as_str() {
                    PRODUCT_TOPIC => {
                        dispatcher.register(Arc::new(ProductPriceHandler::new(self.pricing.clone())))
                    }
                    TOPPING_TOPIC => {
                        dispatcher.register(Arc::new(ToppingPriceHandler::new(self.pricing.clone())))
                    }
                    _ => {
                        warn!(%topic, "no cache update handler for topic, not subscribing");
                        dispatcher
                    }
                }
            })
    }

    /// A new, unconnected consumer on the application's database.
    #[must_use]
    pub fn event_consumer(&self) -> PgNotifyConsumer {
        PgNotifyConsumer::new(self.db.pool().clone())
    }

    /// A producer on the application's database.
    #[must_use]
    pub fn event_producer(&self) -> PgNotifyProducer {
        PgNotifyProducer::new(self.db.pool().clone())
    }
}

impl fmt::Debug for AppContext {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("AppContext")
            .field("db", &self.db)
            .finish_non_exhaustive()
    }
}
