//! Order intake.

use std::{fmt, sync::Arc};

use async_trait::async_trait;
use jiff::Timestamp;
use mockall::automock;
use tracing::{debug, info, warn};

use crate::domain::{
    coupons::CouponsService,
    events::{EventProducer, ORDER_TOPIC},
    orders::{
        charges::{IntakePolicy, OrderCharges},
        data::{NewOrder, OrderRequest},
        errors::{LedgerError, OrdersServiceError},
        ledger::OrderLedger,
        records::{IdempotencyKey, OrderRecord, OrderUuid, PaymentMode},
    },
    payments::{PaymentGateway, PaymentSessionRequest},
    pricing::{PricingCache, engine::price_cart},
    tenants::TenantId,
};

/// Outcome of payment initiation for a created or replayed order.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PaymentInitiation {
    /// The payment mode does not go through the gateway.
    NotRequired,

    /// The gateway opened a session.
    Created { payment_url: String },

    /// The gateway call failed; the order itself stands.
    Failed { reason: String },
}

impl PaymentInitiation {
    #[must_use]
    pub fn payment_url(&self) -> Option<&str> {
        match self {
            Self::Created { payment_url } => Some(payment_url),
            Self::NotRequired | Self::Failed { .. } => None,
        }
    }
}

/// Result of an order intake request.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OrderReceipt {
    pub order: OrderRecord,

    /// `true` when the idempotency key had already produced `order`.
    pub replayed: bool,

    pub payment: PaymentInitiation,
}

/// Collaborators of [`OrderIntakeService`].
#[derive(Clone)]
pub struct IntakeDependencies {
    pub pricing: Arc<dyn PricingCache>,
    pub coupons: Arc<dyn CouponsService>,
    pub ledger: Arc<dyn OrderLedger>,
    pub payments: Arc<dyn PaymentGateway>,
    pub events: Arc<dyn EventProducer>,
    pub policy: IntakePolicy,
}

impl fmt::Debug for IntakeDependencies {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("IntakeDependencies")
            .field("policy", &self.policy)
            .finish_non_exhaustive()
    }
}

#[derive(Debug, Clone)]
pub struct OrderIntakeService {
    deps: IntakeDependencies,
}

impl OrderIntakeService {
    #[must_use]
    pub fn new(deps: IntakeDependencies) -> Self {
        Self { deps }
    }

    async fn discount_percent(
        &self,
        coupon_code: Option<&str>,
        tenant: &TenantId,
    ) -> Result<u8, OrdersServiceError> {
        let Some(code) = coupon_code.map(str::trim).filter(|code| !code.is_empty()) else {
            return Ok(0);
        };

        let percent = self
            .deps
            .coupons
            .resolve_discount(code.to_string(), tenant.clone(), Timestamp::now())
            .await?;

        Ok(percent)
    }

    /// Record the order, or return the order already bound to `key`.
    async fn record_once(
        &self,
        key: &IdempotencyKey,
        order: NewOrder,
    ) -> Result<(OrderRecord, bool), OrdersServiceError> {
        let tenant = order.tenant.clone();

        if let Some(existing) = self
            .deps
            .ledger
            .find_by_idempotency_key(tenant.clone(), key.clone())
            .await?
        {
            debug!(%key, order_uuid = %existing.order_uuid, "replaying order");

            return Ok((existing.response, true));
        }

        match self.deps.ledger.record_order(order, key.clone()).await {
            Ok(created) => Ok((created, false)),
            Err(LedgerError::DuplicateKey) => {
                let existing = self
                    .deps
                    .ledger
                    .find_by_idempotency_key(tenant, key.clone())
                    .await?
                    .ok_or(OrdersServiceError::Ledger(LedgerError::DuplicateKey))?;

                debug!(%key, order_uuid = %existing.order_uuid, "lost race for idempotency key, replaying");

                Ok((existing.response, true))
            }
            Err(error) => Err(error.into()),
        }
    }

    async fn publish(&self, order: &OrderRecord) {
        let payload = match serde_json::to_string(order) {
            Ok(payload) => payload,
            Err(error) => {
                warn!(%error, order_uuid = %order.uuid, "failed to serialize order event");

                return;
            }
        };

        if let Err(error) = self
            .deps
            .events
            .send(ORDER_TOPIC.to_string(), payload)
            .await
        {
            warn!(%error, order_uuid = %order.uuid, "failed to publish order event");
        }
    }

    /// Open a payment session for card orders, using the recorded amount so
    /// that retries reach the gateway with identical arguments.
    async fn initiate_payment(&self, key: &IdempotencyKey, order: &OrderRecord) -> PaymentInitiation {
        if order.payment_mode != PaymentMode::Card {
            return PaymentInitiation::NotRequired;
        }

        let request = PaymentSessionRequest {
            idempotency_key: key.clone(),
            amount: order.total,
            order: order.uuid,
            currency: self.deps.policy.currency.clone(),
            tenant: order.tenant.clone(),
        };

        match self.deps.payments.create_session(request).await {
            Ok(session) => PaymentInitiation::Created {
                payment_url: session.payment_url,
            },
            Err(error) => {
                warn!(%error, order_uuid = %order.uuid, "payment session creation failed");

                PaymentInitiation::Failed {
                    reason: error.to_string(),
                }
            }
        }
    }
}

#[async_trait]
impl OrdersService for OrderIntakeService {
    #[tracing::instrument(
        name = "orders.service.create_order",
        skip(self, key, request),
        fields(tenant = %request.tenant, customer_id = %request.customer_id),
        err
    )]
    async fn create_order(
        &self,
        key: Option<IdempotencyKey>,
        request: OrderRequest,
    ) -> Result<OrderReceipt, OrdersServiceError> {
        let key = key.ok_or(OrdersServiceError::MissingIdempotencyKey)?;

        let subtotal = price_cart(self.deps.pricing.as_ref(), &request.tenant, &request.cart).await?;

        let discount_percent = self
            .discount_percent(request.coupon_code.as_deref(), &request.tenant)
            .await?;

        let charges = OrderCharges::calculate(subtotal, discount_percent, &self.deps.policy)?;

        let new_order = NewOrder {
            uuid: OrderUuid::new(),
            tenant: request.tenant,
            customer_id: request.customer_id,
            cart: request.cart,
            address: request.address,
            comment: request.comment,
            delivery_charges: charges.delivery_charges,
            discount: charges.discount,
            taxes: charges.taxes,
            total: charges.total,
            payment_mode: request.payment_mode,
        };

        let (order, replayed) = self.record_once(&key, new_order).await?;

        if replayed {
            info!(order_uuid = %order.uuid, "order request replayed");
        } else {
            self.publish(&order).await;
        }

        let payment = self.initiate_payment(&key, &order).await;

        Ok(OrderReceipt {
            order,
            replayed,
            payment,
        })
    }

    async fn get_order(
        &self,
        tenant: TenantId,
        order: OrderUuid,
    ) -> Result<OrderRecord, OrdersServiceError> {
        Ok(self.deps.ledger.get_order(tenant, order).await?)
    }

    async fn list_customer_orders(
        &self,
        tenant: TenantId,
        customer_id: String,
    ) -> Result<Vec<OrderRecord>, OrdersServiceError> {
        Ok(self
            .deps
            .ledger
            .list_customer_orders(tenant, customer_id)
            .await?)
    }
}

#[automock]
#[async_trait]
pub trait OrdersService: Send + Sync {
    /// Price, record and (for card orders) start payment of an order.
    ///
    /// At most one order is ever recorded per idempotency key. Repeating a
    /// request with a used key returns the recorded order, whatever the
    /// request body says.
    async fn create_order(
        &self,
        key: Option<IdempotencyKey>,
        request: OrderRequest,
    ) -> Result<OrderReceipt, OrdersServiceError>;

    async fn get_order(
        &self,
        tenant: TenantId,
        order: OrderUuid,
    ) -> Result<OrderRecord, OrdersServiceError>;

    /// A customer's orders, newest first.
    async fn list_customer_orders(
        &self,
        tenant: TenantId,
        customer_id: String,
    ) -> Result<Vec<OrderRecord>, OrdersServiceError>;
}
