//! Coupons service.

use async_trait::async_trait;
use jiff::Timestamp;
use mockall::automock;
use tracing::debug;

use crate::{
    database::Db,
    domain::{
        coupons::{errors::CouponsServiceError, repository::PgCouponsRepository},
        tenants::TenantId,
    },
};

#[derive(Debug, Clone)]
pub struct PgCouponsService {
    db: Db,
    repository: PgCouponsRepository,
}

impl PgCouponsService {
    #[must_use]
    pub fn new(db: Db) -> Self {
        Self {
            db,
            repository: PgCouponsRepository::new(),
        }
    }
}

#[async_trait]
impl CouponsService for PgCouponsService {
    async fn resolve_discount(
        &self,
        code: String,
        tenant: TenantId,
        at: Timestamp,
    ) -> Result<u8, CouponsServiceError> {
        let mut tx = self.db.begin().await?;

        let coupon = self.repository.find_coupon(&mut tx, &code, &tenant).await?;

        tx.commit().await?;

        let Some(coupon) = coupon else {
            debug!(%code, %tenant, "coupon not found");

            return Ok(0);
        };

        if !coupon.is_valid_at(at) {
            debug!(%code, %tenant, valid_upto = %coupon.valid_upto, "coupon expired");

            return Ok(0);
        }

        Ok(coupon.discount.min(100))
    }
}

#[automock]
#[async_trait]
pub trait CouponsService: Send + Sync {
    /// Discount percentage granted by `code` for `tenant` at instant `at`.
    ///
    /// Unknown codes, codes of another tenant and expired codes all resolve
    /// to `0`; they are never an error.
    async fn resolve_discount(
        &self,
        code: String,
        tenant: TenantId,
        at: Timestamp,
    ) -> Result<u8, CouponsServiceError>;
}
