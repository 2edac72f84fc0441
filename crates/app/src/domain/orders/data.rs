//! Order Data

use crate::domain::{
    carts::CartItem,
    orders::records::{OrderUuid, PaymentMode},
    tenants::TenantId,
};

/// Order request as received from a client, after validation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OrderRequest {
    pub cart: Vec<CartItem>,
    pub coupon_code: Option<String>,
    pub tenant: TenantId,
    pub payment_mode: PaymentMode,
    pub customer_id: String,
    pub comment: Option<String>,
    pub address: String,
}

/// New Order Data
///
/// A fully priced order ready to be recorded. Status fields are not part of
/// it: new orders are always received and pending.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewOrder {
    pub uuid: OrderUuid,
    pub tenant: TenantId,
    pub customer_id: String,
    pub cart: Vec<CartItem>,
    pub address: String,
    pub comment: Option<String>,
    pub delivery_charges: u64,
    pub discount: u64,
    pub taxes: u64,
    pub total: u64,
    pub payment_mode: PaymentMode,
}
