//! Test Helpers
//!
//! Fixtures for rows this crate only ever reads.

use jiff::Timestamp;
use jiff_sqlx::Timestamp as SqlxTimestamp;
use uuid::Uuid;

use crate::{domain::tenants::TenantId, test::TestContext};

impl TestContext {
    pub(crate) async fn insert_coupon(
        &self,
        code: &str,
        tenant: &TenantId,
        discount: i16,
        valid_upto: Timestamp,
    ) {
        sqlx::query(
            "INSERT INTO coupons (uuid, title, code, discount, valid_upto, tenant_id) \
             VALUES ($1, $2, $3, $4, $5, $6)",
        )
        .bind(Uuid::now_v7())
        .bind(format!("{code} coupon"))
        .bind(code)
        .bind(discount)
        .bind(SqlxTimestamp::from(valid_upto))
        .bind(tenant.as_str())
        .execute(self.db.pool())
        .await
        .expect("Failed to insert coupon");
    }

    pub(crate) async fn count_orders(&self) -> i64 {
        sqlx::query_scalar("SELECT COUNT(*) FROM orders")
            .fetch_one(self.db.pool())
            .await
            .expect("Failed to count orders")
    }
}
