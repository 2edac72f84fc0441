//! Order Index Handler

use salvo::{
    oapi::{ToSchema, extract::QueryParam},
    prelude::*,
};
use serde::{Deserialize, Serialize};

use crate::{
    extensions::*,
    orders::{errors::into_status_error, handlers::get::tenant_param, models::OrderResponse},
};

#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub(crate) struct OrdersResponse {
    /// The customer's orders, newest first
    pub orders: Vec<OrderResponse>,
}

/// Order Index Handler
///
/// Returns a customer's orders.
#[endpoint(tags("orders"), summary = "List Customer Orders")]
pub(crate) async fn handler(
    tenant_id: QueryParam<String, true>,
    customer_id: QueryParam<String, true>,
    depot: &mut Depot,
) -> Result<Json<OrdersResponse>, StatusError> {
    let state = depot.state_or_500()?;
    let tenant = tenant_param(tenant_id.into_inner())?;

    let orders = state
        .orders
        .list_customer_orders(tenant, customer_id.into_inner())
        .await
        .map_err(into_status_error)?;

    Ok(Json(OrdersResponse {
        orders: orders.into_iter().map(Into::into).collect(),
    }))
}
