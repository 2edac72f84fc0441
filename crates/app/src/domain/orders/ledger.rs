//! Order and idempotency ledger.

use async_trait::async_trait;
use mockall::automock;
use tracing::{debug, info, warn};

use crate::{
    database::Db,
    domain::{
        orders::{
            data::NewOrder,
            errors::LedgerError,
            records::{IdempotencyKey, IdempotencyRecord, OrderRecord, OrderUuid, PaymentStatus},
            repositories::{PgIdempotencyRepository, PgOrdersRepository},
        },
        tenants::TenantId,
    },
};

#[derive(Debug, Clone)]
pub struct PgOrderLedger {
    db: Db,
    orders: PgOrdersRepository,
    idempotency: PgIdempotencyRepository,
}

impl PgOrderLedger {
    #[must_use]
    pub fn new(db: Db) -> Self {
        Self {
            db,
            orders: PgOrdersRepository::new(),
            idempotency: PgIdempotencyRepository::new(),
        }
    }
}

#[async_trait]
impl OrderLedger for PgOrderLedger {
    async fn find_by_idempotency_key(
        &self,
        tenant: TenantId,
        key: IdempotencyKey,
    ) -> Result<Option<IdempotencyRecord>, LedgerError> {
        let mut tx = self.db.begin().await?;

        let record = self.idempotency.find_key(&mut tx, &tenant, &key).await?;

        tx.commit().await?;

        Ok(record)
    }

    #[tracing::instrument(
        name = "orders.ledger.record_order",
        skip(self, order, key),
        fields(order_uuid = %order.uuid, tenant = %order.tenant),
        err
    )]
    async fn record_order(
        &self,
        order: NewOrder,
        key: IdempotencyKey,
    ) -> Result<OrderRecord, LedgerError> {
        let mut tx = self.db.begin().await?;

        let created = self.orders.insert_order(&mut tx, &order).await?;

        // Blocks behind a concurrent writer of the same key until it settles.
        if let Err(error) = self.idempotency.insert_key(&mut tx, &key, &created).await {
            let error = LedgerError::from(error);

            if matches!(error, LedgerError::DuplicateKey) {
                debug!(%key, "idempotency key bound by a concurrent request");
            }

            if let Err(rollback_error) = tx.rollback().await {
                warn!(%rollback_error, "failed to roll back order insert");
            }

            return Err(error);
        }

        tx.commit().await?;

        info!(order_uuid = %created.uuid, total = created.total, "order recorded");

        Ok(created)
    }

    async fn get_order(
        &self,
        tenant: TenantId,
        order: OrderUuid,
    ) -> Result<OrderRecord, LedgerError> {
        let mut tx = self.db.begin().await?;

        let order = self.orders.get_order(&mut tx, &tenant, order).await?;

        tx.commit().await?;

        Ok(order)
    }

    async fn list_customer_orders(
        &self,
        tenant: TenantId,
        customer_id: String,
    ) -> Result<Vec<OrderRecord>, LedgerError> {
        let mut tx = self.db.begin().await?;

        let orders = self
            .orders
            .list_customer_orders(&mut tx, &tenant, &customer_id)
            .await?;

        tx.commit().await?;

        Ok(orders)
    }

    #[tracing::instrument(
        name = "orders.ledger.update_payment_status",
        skip(self),
        fields(order_uuid = %order),
        err
    )]
    async fn update_payment_status(
        &self,
        order: OrderUuid,
        status: PaymentStatus,
    ) -> Result<OrderRecord, LedgerError> {
        let mut tx = self.db.begin().await?;

        let updated = self
            .orders
            .update_payment_status(&mut tx, order, status)
            .await?;

        tx.commit().await?;

        Ok(updated)
    }
}

/// Durable store of orders and the idempotency keys that produced them.
#[automock]
#[async_trait]
pub trait OrderLedger: Send + Sync {
    /// Previously recorded result for `key` within `tenant`, if any.
    async fn find_by_idempotency_key(
        &self,
        tenant: TenantId,
        key: IdempotencyKey,
    ) -> Result<Option<IdempotencyRecord>, LedgerError>;

    /// Record a new order and bind `key` to it in one transaction.
    ///
    /// Either both rows become visible or neither does. When the order's tenant
    /// already bound `key`, nothing is written and [`LedgerError::DuplicateKey`]
    /// is returned.
    async fn record_order(
        &self,
        order: NewOrder,
        key: IdempotencyKey,
    ) -> Result<OrderRecord, LedgerError>;

    async fn get_order(
        &self,
        tenant: TenantId,
        order: OrderUuid,
    ) -> Result<OrderRecord, LedgerError>;

    /// A customer's orders, newest first.
    async fn list_customer_orders(
        &self,
        tenant: TenantId,
        customer_id: String,
    ) -> Result<Vec<OrderRecord>, LedgerError>;

    /// Set the payment status of an order; used by payment reconciliation.
    async fn update_payment_status(
        &self,
        order: OrderUuid,
        status: PaymentStatus,
    ) -> Result<OrderRecord, LedgerError>;
}
