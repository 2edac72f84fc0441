//! Coupon Records

use jiff::Timestamp;

use crate::{domain::tenants::TenantId, uuids::TypedUuid};

/// Coupon UUID
pub type CouponUuid = TypedUuid<CouponRecord>;

/// Coupon Record
#[derive(Debug, Clone)]
pub struct CouponRecord {
    pub uuid: CouponUuid,
    pub title: String,
    pub code: String,

    /// Discount percentage, `0..=100`.
    pub discount: u8,

    /// Last instant at which the coupon may be redeemed.
    pub valid_upto: Timestamp,

    pub tenant: TenantId,
    pub created_at: Timestamp,
    pub updated_at: Timestamp,
}

impl CouponRecord {
    /// A coupon stops applying once `valid_upto` is strictly before `at`.
    #[must_use]
    pub fn is_valid_at(&self, at: Timestamp) -> bool {
        self.valid_upto >= at
    }
}
