//! Get Order Handler

use salvo::{
    oapi::extract::{PathParam, QueryParam},
    prelude::*,
};
use uuid::Uuid;

use forno_app::domain::{orders::records::OrderUuid, tenants::TenantId};

use crate::{
    extensions::*,
    orders::{errors::into_status_error, models::OrderResponse},
};

/// Get Order Handler
///
/// Returns an order of the given tenant.
#[endpoint(tags("orders"), summary = "Get Order")]
pub(crate) async fn handler(
    order: PathParam<Uuid>,
    tenant_id: QueryParam<String, true>,
    depot: &mut Depot,
) -> Result<Json<OrderResponse>, StatusError> {
    let state = depot.state_or_500()?;
    let tenant = tenant_param(tenant_id.into_inner())?;

    let order = state
        .orders
        .get_order(tenant, OrderUuid::from_uuid(order.into_inner()))
        .await
        .map_err(into_status_error)?;

    Ok(Json(order.into()))
}

pub(super) fn tenant_param(raw: String) -> Result<TenantId, StatusError> {
    if raw.trim().is_empty() {
        return Err(StatusError::bad_request().brief("tenant_id must not be empty"));
    }

    Ok(TenantId::new(raw))
}
