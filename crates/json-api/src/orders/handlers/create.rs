//! Create Order Handler

use salvo::{
    http::header::LOCATION,
    oapi::{ToSchema, extract::JsonBody},
    prelude::*,
};
use serde::{Deserialize, Serialize};
use validator::Validate;

use forno_app::domain::orders::{PaymentInitiation, records::IdempotencyKey};

use crate::{
    extensions::*,
    orders::{
        errors::{CreateOrderError, into_status_error},
        models::{CreateOrderRequest, OrderResponse},
    },
};

pub(crate) const IDEMPOTENCY_KEY_HEADER: &str = "idempotency-key";

/// Order Created Response
#[derive(Debug, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub(crate) struct OrderCreatedResponse {
    /// Where to complete a card payment
    pub payment_url: Option<String>,

    /// Why no payment URL could be obtained, for card orders
    pub payment_error: Option<String>,

    /// Whether this key had already produced the order
    pub replayed: bool,

    pub order: OrderResponse,
}

/// Create Order Handler
///
/// Prices the cart against the pricing caches and records the order once per
/// `Idempotency-Key`. Retrying with the same key returns the same order.
#[endpoint(
    tags("orders"),
    summary = "Create Order",
    responses(
        (status_code = StatusCode::CREATED, description = "Order created or replayed"),
        (status_code = StatusCode::INTERNAL_SERVER_ERROR, description = "Internal Server Error"),
    ),
)]
pub(crate) async fn handler(
    req: &mut Request,
    json: JsonBody<CreateOrderRequest>,
    depot: &mut Depot,
    res: &mut Response,
) -> Result<Json<OrderCreatedResponse>, CreateOrderError> {
    let state = depot.state_or_500()?;

    let key = req
        .header::<String>(IDEMPOTENCY_KEY_HEADER)
        .and_then(|raw| IdempotencyKey::parse(&raw));

    let request = json.into_inner();

    request.validate()?;

    let receipt = state
        .orders
        .create_order(key, request.into())
        .await
        .map_err(into_status_error)?;

    res.add_header(LOCATION, format!("/orders/{}", receipt.order.uuid), true)
        .or_500("failed to set location header")?
        .status_code(StatusCode::CREATED);

    let payment_error = match &receipt.payment {
        PaymentInitiation::Failed { reason } => Some(reason.clone()),
        PaymentInitiation::NotRequired | PaymentInitiation::Created { .. } => None,
    };

    Ok(Json(OrderCreatedResponse {
        payment_url: receipt.payment.payment_url().map(ToString::to_string),
        payment_error,
        replayed: receipt.replayed,
        order: receipt.order.into(),
    }))
}
