//! Coupons Repository

use jiff_sqlx::Timestamp as SqlxTimestamp;
use sqlx::{FromRow, Postgres, Row, Transaction, postgres::PgRow, query_as};

use crate::domain::{
    coupons::records::{CouponRecord, CouponUuid},
    tenants::TenantId,
};

const FIND_COUPON_SQL: &str = include_str!("sql/find_coupon.sql");

#[derive(Debug, Clone, Default)]
pub(crate) struct PgCouponsRepository;

impl PgCouponsRepository {
    #[must_use]
    pub(crate) fn new() -> Self {
        Self
    }

    pub(crate) async fn find_coupon(
        &self,
        tx: &mut Transaction<'_, Postgres>,
        code: &str,
        tenant: &TenantId,
    ) -> Result<Option<CouponRecord>, sqlx::Error> {
        query_as::<Postgres, CouponRecord>(FIND_COUPON_SQL)
            .bind(code)
            .bind(tenant.as_str())
            .fetch_optional(&mut **tx)
            .await
    }
}

impl<'r> FromRow<'r, PgRow> for CouponRecord {
    fn from_row(row: &'r PgRow) -> sqlx::Result<Self> {
        let discount_i16: i16 = row.try_get("discount")?;

        let discount = u8::try_from(discount_i16).map_err(|e| sqlx::Error::ColumnDecode {
            index: "discount".to_string(),
            source: Box::new(e),
        })?;

        Ok(Self {
            uuid: CouponUuid::from_uuid(row.try_get("uuid")?),
            title: row.try_get("title")?,
            code: row.try_get("code")?,
            discount,
            valid_upto: row.try_get::<SqlxTimestamp, _>("valid_upto")?.to_jiff(),
            tenant: TenantId::new(row.try_get::<String, _>("tenant_id")?),
            created_at: row.try_get::<SqlxTimestamp, _>("created_at")?.to_jiff(),
            updated_at: row.try_get::<SqlxTimestamp, _>("updated_at")?.to_jiff(),
        })
    }
}
