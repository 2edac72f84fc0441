//! Test context for service-level integration tests.

use crate::{
    database::Db,
    domain::{
        coupons::PgCouponsService, orders::PgOrderLedger, pricing::PgPricingCache,
        tenants::TenantId,
    },
};

use super::db::TestDb;

pub struct TestContext {
    pub db: TestDb,
    pub tenant: TenantId,
    pub pricing: PgPricingCache,
    pub coupons: PgCouponsService,
    pub ledger: PgOrderLedger,
}

impl TestContext {
    pub async fn new() -> Self {
        let test_db = TestDb::new().await;
        let db = Db::new(test_db.pool().clone());

        Self {
            tenant: TenantId::new("tenant-a"),
            pricing: PgPricingCache::new(db.clone()),
            coupons: PgCouponsService::new(db.clone()),
            ledger: PgOrderLedger::new(db),
            db: test_db,
        }
    }
}
