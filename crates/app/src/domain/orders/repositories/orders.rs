//! Orders Repository

use jiff_sqlx::Timestamp as SqlxTimestamp;
use sqlx::{FromRow, Postgres, Row, Transaction, postgres::PgRow, query_as, types::Json};

use crate::{
    database::{to_db_amount, try_get_amount},
    domain::{
        carts::CartItem,
        orders::{
            data::NewOrder,
            records::{OrderRecord, OrderStatus, OrderUuid, PaymentStatus},
        },
        tenants::TenantId,
    },
};

const INSERT_ORDER_SQL: &str = include_str!("../sql/insert_order.sql");
const GET_ORDER_SQL: &str = include_str!("../sql/get_order.sql");
const LIST_CUSTOMER_ORDERS_SQL: &str = include_str!("../sql/list_customer_orders.sql");
const UPDATE_PAYMENT_STATUS_SQL: &str = include_str!("../sql/update_payment_status.sql");

#[derive(Debug, Clone, Default)]
pub(crate) struct PgOrdersRepository;

impl PgOrdersRepository {
    #[must_use]
    pub(crate) fn new() -> Self {
        Self
    }

    pub(crate) async fn insert_order(
        &self,
        tx: &mut Transaction<'_, Postgres>,
        order: &NewOrder,
    ) -> Result<OrderRecord, sqlx::Error> {
        query_as::<Postgres, OrderRecord>(INSERT_ORDER_SQL)
            .bind(order.uuid.into_uuid())
            .bind(order.tenant.as_str())
            .bind(&order.customer_id)
            .bind(Json(&order.cart))
            .bind(&order.address)
            .bind(order.comment.as_deref())
            .bind(to_db_amount(order.delivery_charges)?)
            .bind(to_db_amount(order.discount)?)
            .bind(to_db_amount(order.taxes)?)
            .bind(to_db_amount(order.total)?)
            .bind(OrderStatus::Received.as_str())
            .bind(order.payment_mode.as_str())
            .bind(PaymentStatus::Pending.as_str())
            .fetch_one(&mut **tx)
            .await
    }

    pub(crate) async fn get_order(
        &self,
        tx: &mut Transaction<'_, Postgres>,
        tenant: &TenantId,
        order: OrderUuid,
    ) -> Result<OrderRecord, sqlx::Error> {
        query_as::<Postgres, OrderRecord>(GET_ORDER_SQL)
            .bind(order.into_uuid())
            .bind(tenant.as_str())
            .fetch_one(&mut **tx)
            .await
    }

    pub(crate) async fn list_customer_orders(
        &self,
        tx: &mut Transaction<'_, Postgres>,
        tenant: &TenantId,
        customer_id: &str,
    ) -> Result<Vec<OrderRecord>, sqlx::Error> {
        query_as::<Postgres, OrderRecord>(LIST_CUSTOMER_ORDERS_SQL)
            .bind(tenant.as_str())
            .bind(customer_id)
            .fetch_all(&mut **tx)
            .await
    }

    pub(crate) async fn update_payment_status(
        &self,
        tx: &mut Transaction<'_, Postgres>,
        order: OrderUuid,
        status: PaymentStatus,
    ) -> Result<OrderRecord, sqlx::Error> {
        query_as::<Postgres, OrderRecord>(UPDATE_PAYMENT_STATUS_SQL)
            .bind(order.into_uuid())
            .bind(status.as_str())
            .fetch_one(&mut **tx)
            .await
    }
}

impl<'r> FromRow<'r, PgRow> for OrderRecord {
    fn from_row(row: &'r PgRow) -> sqlx::Result<Self> {
        let Json(cart) = row.try_get::<Json<Vec<CartItem>>, _>("cart")?;

        Ok(Self {
            uuid: OrderUuid::from_uuid(row.try_get("uuid")?),
            tenant: TenantId::new(row.try_get::<String, _>("tenant_id")?),
            customer_id: row.try_get("customer_id")?,
            cart,
            address: row.try_get("address")?,
            comment: row.try_get("comment")?,
            delivery_charges: try_get_amount(row, "delivery_charges")?,
            discount: try_get_amount(row, "discount")?,
            taxes: try_get_amount(row, "taxes")?,
            total: try_get_amount(row, "total")?,
            order_status: try_get_parsed(row, "order_status")?,
            payment_mode: try_get_parsed(row, "payment_mode")?,
            payment_status: try_get_parsed(row, "payment_status")?,
            created_at: row.try_get::<SqlxTimestamp, _>("created_at")?.to_jiff(),
            updated_at: row.try_get::<SqlxTimestamp, _>("updated_at")?.to_jiff(),
        })
    }
}

fn try_get_parsed<T>(row: &PgRow, col: &str) -> Result<T, sqlx::Error>
where
    T: std::str::FromStr,
    T::Err: std::error::Error + Send + Sync + 'static,
{
    let text: String = row.try_get(col)?;

    text.parse().map_err(|e: T::Err| sqlx::Error::ColumnDecode {
        index: col.to_string(),
        source: Box::new(e),
    })
}
