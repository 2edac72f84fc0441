//! Pricing Cache Repository

use sqlx::{FromRow, Postgres, Row, Transaction, postgres::PgRow, query, query_as, types::Json};

use crate::{
    database::{to_db_amount, try_get_amount},
    domain::{
        pricing::records::{PriceConfiguration, ProductPriceRecord, ToppingPriceRecord},
        tenants::TenantId,
    },
};

const FIND_PRODUCT_PRICES_SQL: &str = include_str!("sql/find_product_prices.sql");
const FIND_TOPPING_PRICES_SQL: &str = include_str!("sql/find_topping_prices.sql");
const UPSERT_PRODUCT_PRICE_SQL: &str = include_str!("sql/upsert_product_price.sql");
const UPSERT_TOPPING_PRICE_SQL: &str = include_str!("sql/upsert_topping_price.sql");

#[derive(Debug, Clone, Default)]
pub(crate) struct PgPricingCacheRepository;

impl PgPricingCacheRepository {
    #[must_use]
    pub(crate) fn new() -> Self {
        Self
    }

    pub(crate) async fn find_product_prices(
        &self,
        tx: &mut Transaction<'_, Postgres>,
        tenant: &TenantId,
        product_ids: &[String],
    ) -> Result<Vec<ProductPriceRecord>, sqlx::Error> {
        query_as::<Postgres, ProductPriceRecord>(FIND_PRODUCT_PRICES_SQL)
            .bind(tenant.as_str())
            .bind(product_ids)
            .fetch_all(&mut **tx)
            .await
    }

    pub(crate) async fn find_topping_prices(
        &self,
        tx: &mut Transaction<'_, Postgres>,
        tenant: &TenantId,
        topping_ids: &[String],
    ) -> Result<Vec<ToppingPriceRecord>, sqlx::Error> {
        query_as::<Postgres, ToppingPriceRecord>(FIND_TOPPING_PRICES_SQL)
            .bind(tenant.as_str())
            .bind(topping_ids)
            .fetch_all(&mut **tx)
            .await
    }

    pub(crate) async fn upsert_product_price(
        &self,
        tx: &mut Transaction<'_, Postgres>,
        record: &ProductPriceRecord,
    ) -> Result<u64, sqlx::Error> {
        let rows_affected = query(UPSERT_PRODUCT_PRICE_SQL)
            .bind(&record.product_id)
            .bind(record.tenant.as_str())
            .bind(Json(&record.price_configuration))
            .execute(&mut **tx)
            .await?
            .rows_affected();

        Ok(rows_affected)
    }

    pub(crate) async fn upsert_topping_price(
        &self,
        tx: &mut Transaction<'_, Postgres>,
        record: &ToppingPriceRecord,
    ) -> Result<u64, sqlx::Error> {
        let price = to_db_amount(record.price)?;

        let rows_affected = query(UPSERT_TOPPING_PRICE_SQL)
            .bind(&record.topping_id)
            .bind(record.tenant.as_str())
            .bind(price)
            .execute(&mut **tx)
            .await?
            .rows_affected();

        Ok(rows_affected)
    }
}

impl<'r> FromRow<'r, PgRow> for ProductPriceRecord {
    fn from_row(row: &'r PgRow) -> sqlx::Result<Self> {
        let Json(price_configuration) =
            row.try_get::<Json<PriceConfiguration>, _>("price_configuration")?;

        Ok(Self {
            product_id: row.try_get("product_id")?,
            tenant: TenantId::new(row.try_get::<String, _>("tenant_id")?),
            price_configuration,
        })
    }
}

impl<'r> FromRow<'r, PgRow> for ToppingPriceRecord {
    fn from_row(row: &'r PgRow) -> sqlx::Result<Self> {
        Ok(Self {
            topping_id: row.try_get("topping_id")?,
            tenant: TenantId::new(row.try_get::<String, _>("tenant_id")?),
            price: try_get_amount(row, "price")?,
        })
    }
}
