//! Pricing cache service.

use async_trait::async_trait;
use mockall::automock;

use crate::{
    database::Db,
    domain::{
        pricing::{
            errors::PricingServiceError,
            records::{ProductPriceRecord, ToppingPriceRecord},
            repository::PgPricingCacheRepository,
        },
        tenants::TenantId,
    },
};

#[derive(Debug, Clone)]
pub struct PgPricingCache {
    db: Db,
    repository: PgPricingCacheRepository,
}

impl PgPricingCache {
    #[must_use]
    pub fn new(db: Db) -> Self {
        Self {
            db,
            repository: PgPricingCacheRepository::new(),
        }
    }
}

#[async_trait]
impl PricingCache for PgPricingCache {
    async fn product_prices(
        &self,
        tenant: TenantId,
        product_ids: Vec<String>,
    ) -> Result<Vec<ProductPriceRecord>, PricingServiceError> {
        let mut tx = self.db.begin().await?;

        let products = self
            .repository
            .find_product_prices(&mut tx, &tenant, &product_ids)
            .await?;

        tx.commit().await?;

        Ok(products)
    }

    async fn topping_prices(
        &self,
        tenant: TenantId,
        topping_ids: Vec<String>,
    ) -> Result<Vec<ToppingPriceRecord>, PricingServiceError> {
        let mut tx = self.db.begin().await?;

        let toppings = self
            .repository
            .find_topping_prices(&mut tx, &tenant, &topping_ids)
            .await?;

        tx.commit().await?;

        Ok(toppings)
    }

    #[tracing::instrument(
        name = "pricing.cache.upsert_product_price",
        skip(self, record),
        fields(product_id = %record.product_id, tenant = %record.tenant),
        err
    )]
    async fn upsert_product_price(
        &self,
        record: ProductPriceRecord,
    ) -> Result<(), PricingServiceError> {
        let mut tx = self.db.begin().await?;

        self.repository.upsert_product_price(&mut tx, &record).await?;

        tx.commit().await?;

        Ok(())
    }

    #[tracing::instrument(
        name = "pricing.cache.upsert_topping_price",
        skip(self, record),
        fields(topping_id = %record.topping_id, tenant = %record.tenant),
        err
    )]
    async fn upsert_topping_price(
        &self,
        record: ToppingPriceRecord,
    ) -> Result<(), PricingServiceError> {
        let mut tx = self.db.begin().await?;

        self.repository.upsert_topping_price(&mut tx, &record).await?;

        tx.commit().await?;

        Ok(())
    }
}

/// Product and topping price projections.
///
/// The cache update dispatcher is the only writer; order intake only reads,
/// and may observe any interleaving of updates.
#[automock]
#[async_trait]
pub trait PricingCache: Send + Sync {
    /// Cached prices for the given products of a tenant. Unknown ids are absent from the result.
    async fn product_prices(
        &self,
        tenant: TenantId,
        product_ids: Vec<String>,
    ) -> Result<Vec<ProductPriceRecord>, PricingServiceError>;

    /// Cached prices for the given toppings of a tenant. Unknown ids are absent from the result.
    async fn topping_prices(
        &self,
        tenant: TenantId,
        topping_ids: Vec<String>,
    ) -> Result<Vec<ToppingPriceRecord>, PricingServiceError>;

    /// Insert or overwrite the cached prices of a product.
    async fn upsert_product_price(
        &self,
        record: ProductPriceRecord,
    ) -> Result<(), PricingServiceError>;

    /// Insert or overwrite the cached price of a topping.
    async fn upsert_topping_price(
        &self,
        record: ToppingPriceRecord,
    ) -> Result<(), PricingServiceError>;
}
