//! Order Charges

use rust_decimal::{Decimal, RoundingStrategy, prelude::ToPrimitive};
use thiserror::Error;

/// Tenant-independent knobs of order intake.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct IntakePolicy {
    /// Tax rate applied to the discounted subtotal, in percent.
    pub tax_rate_percent: Decimal,

    /// Flat delivery charge in minor units.
    pub delivery_charge: u64,

    /// Currency passed to the payment gateway.
    pub currency: String,
}

impl Default for IntakePolicy {
    fn default() -> Self {
        Self {
            tax_rate_percent: Decimal::from(18),
            delivery_charge: 100,
            currency: "inr".to_string(),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum ChargesError {
    #[error("order amount overflowed")]
    Overflow,
}

/// Amounts charged on top of (or off) a cart subtotal, in minor units.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct OrderCharges {
    pub subtotal: u64,
    pub discount: u64,
    pub taxes: u64,
    pub delivery_charges: u64,
    pub total: u64,
}

impl OrderCharges {
    /// Apply a discount percentage, then tax, then the delivery charge.
    ///
    /// # Errors
    ///
    /// Returns an error when an intermediate amount does not fit in `u64`.
    pub fn calculate(
        subtotal: u64,
        discount_percent: u8,
        policy: &IntakePolicy,
    ) -> Result<Self, ChargesError> {
        let discount = percent_of_minor(Decimal::from(discount_percent.min(100)), subtotal)?;
        let taxable = subtotal.saturating_sub(discount);
        let taxes = percent_of_minor(policy.tax_rate_percent, taxable)?;

        let total = taxable
            .checked_add(taxes)
            .and_then(|amount| amount.checked_add(policy.delivery_charge))
            .ok_or(ChargesError::Overflow)?;

        Ok(Self {
            subtotal,
            discount,
            taxes,
            delivery_charges: policy.delivery_charge,
            total,
        })
    }
}

/// `round(minor × percent / 100)`, halves rounded away from zero.
fn percent_of_minor(percent: Decimal, minor: u64) -> Result<u64, ChargesError> {
    let applied = Decimal::from(minor)
        .checked_mul(percent)
        .and_then(|amount| amount.checked_div(Decimal::ONE_HUNDRED))
        .ok_or(ChargesError::Overflow)?;

    applied
        .round_dp_with_strategy(0, RoundingStrategy::MidpointAwayFromZero)
        .to_u64()
        .ok_or(ChargesError::Overflow)
}
