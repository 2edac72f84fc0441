//! Topic handlers.

use std::sync::Arc;

use async_trait::async_trait;
use mockall::automock;
use serde::{Deserialize, Serialize};

use crate::domain::{
    cache_updates::errors::CacheUpdateError,
    pricing::{
        PricingCache,
        records::{PriceConfiguration, ProductPriceRecord, ToppingPriceRecord},
    },
    tenants::TenantId,
};

pub const PRODUCT_TOPIC: &str = "product";
pub const TOPPING_TOPIC: &str = "topping";

/// Applies the messages of one topic.
///
/// Handlers must be idempotent: applying the same payload twice leaves the
/// same state as applying it once.
#[automock]
#[async_trait]
pub trait TopicHandler: Send + Sync {
    /// Topic this handler consumes.
    fn topic(&self) -> &'static str;

    async fn handle(&self, payload: &str) -> Result<(), CacheUpdateError>;
}

/// Full price snapshot of a product, as published by the catalog.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ProductPriceUpdate {
    pub id: String,
    pub tenant_id: String,
    pub price_configuration: PriceConfiguration,
}

/// Current price of a topping, as published by the catalog.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ToppingPriceUpdate {
    pub id: String,
    pub tenant_id: String,
    pub price: u64,
}

#[derive(Clone)]
pub struct ProductPriceHandler {
    cache: Arc<dyn PricingCache>,
}

impl ProductPriceHandler {
    #[must_use]
    pub fn new(cache: Arc<dyn PricingCache>) -> Self {
        Self { cache }
    }
}

impl std::fmt::Debug for ProductPriceHandler {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ProductPriceHandler").finish_non_exhaustive()
    }
}

#[async_trait]
impl TopicHandler for ProductPriceHandler {
    fn topic(&self) -> &'static str {
        PRODUCT_TOPIC
    }

    async fn handle(&self, payload: &str) -> Result<(), CacheUpdateError> {
        let update: ProductPriceUpdate = serde_json::from_str(payload)?;

        self.cache
            .upsert_product_price(ProductPriceRecord {
                product_id: update.id,
                tenant: TenantId::new(update.tenant_id),
                price_configuration: update.price_configuration,
            })
            .await?;

        Ok(())
    }
}

#[derive(Clone)]
pub struct ToppingPriceHandler {
    cache: Arc<dyn PricingCache>,
}

impl ToppingPriceHandler {
    #[must_use]
    pub fn new(cache: Arc<dyn PricingCache>) -> Self {
        Self { cache }
    }
}

impl std::fmt::Debug for ToppingPriceHandler {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ToppingPriceHandler").finish_non_exhaustive()
    }
}

#[async_trait]
impl TopicHandler for ToppingPriceHandler {
    fn topic(&self) -> &'static str {
        TOPPING_TOPIC
    }

    async fn handle(&self, payload: &str) -> Result<(), CacheUpdateError> {
        let update: ToppingPriceUpdate = serde_json::from_str(payload)?;

        self.cache
            .upsert_topping_price(ToppingPriceRecord {
                topping_id: update.id,
                tenant: TenantId::new(update.tenant_id),
                price: update.price,
            })
            .await?;

        Ok(())
    }
}
