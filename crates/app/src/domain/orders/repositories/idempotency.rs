//! Idempotency Keys Repository

use jiff_sqlx::Timestamp as SqlxTimestamp;
use sqlx::{FromRow, Postgres, Row, Transaction, postgres::PgRow, query_as, types::Json};

use crate::domain::{
    orders::records::{IdempotencyKey, IdempotencyRecord, OrderRecord, OrderUuid},
    tenants::TenantId,
};

const FIND_IDEMPOTENCY_KEY_SQL: &str = include_str!("../sql/find_idempotency_key.sql");
const INSERT_IDEMPOTENCY_KEY_SQL: &str = include_str!("../sql/insert_idempotency_key.sql");

#[derive(Debug, Clone, Default)]
pub(crate) struct PgIdempotencyRepository;

impl PgIdempotencyRepository {
    #[must_use]
    pub(crate) fn new() -> Self {
        Self
    }

    pub(crate) async fn find_key(
        &self,
        tx: &mut Transaction<'_, Postgres>,
        tenant: &TenantId,
        key: &IdempotencyKey,
    ) -> Result<Option<IdempotencyRecord>, sqlx::Error> {
        query_as::<Postgres, IdempotencyRecord>(FIND_IDEMPOTENCY_KEY_SQL)
            .bind(tenant.as_str())
            .bind(key.as_str())
            .fetch_optional(&mut **tx)
            .await
    }

    /// Bind `key` to `order` within the order's tenant. Fails with a unique
    /// violation if the tenant already used the key.
    pub(crate) async fn insert_key(
        &self,
        tx: &mut Transaction<'_, Postgres>,
        key: &IdempotencyKey,
        order: &OrderRecord,
    ) -> Result<IdempotencyRecord, sqlx::Error> {
        query_as::<Postgres, IdempotencyRecord>(INSERT_IDEMPOTENCY_KEY_SQL)
            .bind(order.tenant.as_str())
            .bind(key.as_str())
            .bind(order.uuid.into_uuid())
            .bind(Json(order))
            .fetch_one(&mut **tx)
            .await
    }
}

impl<'r> FromRow<'r, PgRow> for IdempotencyRecord {
    fn from_row(row: &'r PgRow) -> sqlx::Result<Self> {
        let raw_key: String = row.try_get("key")?;

        let key = IdempotencyKey::parse(&raw_key).ok_or_else(|| sqlx::Error::ColumnDecode {
            index: "key".to_string(),
            source: "blank idempotency key".into(),
        })?;

        let Json(response) = row.try_get::<Json<OrderRecord>, _>("response")?;

        Ok(Self {
            tenant: TenantId::new(row.try_get::<String, _>("tenant_id")?),
            key,
            order_uuid: OrderUuid::from_uuid(row.try_get("order_uuid")?),
            response,
            created_at: row.try_get::<SqlxTimestamp, _>("created_at")?.to_jiff(),
        })
    }
}
