//! Payment gateway contract.

use async_trait::async_trait;
use mockall::automock;
use serde::{Deserialize, Serialize};

use crate::domain::{
    orders::records::{IdempotencyKey, OrderUuid},
    payments::errors::GatewayError,
    tenants::TenantId,
};

/// Arguments for opening a payment session.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PaymentSessionRequest {
    /// The order's idempotency key; the gateway deduplicates on it.
    pub idempotency_key: IdempotencyKey,

    /// Amount to charge in minor units.
    pub amount: u64,

    pub order: OrderUuid,
    pub currency: String,
    pub tenant: TenantId,
}

/// Payment session opened by the gateway.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PaymentSession {
    /// Where the customer completes the payment.
    pub payment_url: String,
}

#[automock]
#[async_trait]
pub trait PaymentGateway: Send + Sync {
    /// Open a payment session for an order. Repeating the call with the same
    /// idempotency key yields the same session.
    async fn create_session(
        &self,
        request: PaymentSessionRequest,
    ) -> Result<PaymentSession, GatewayError>;
}
