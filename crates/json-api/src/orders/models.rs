//! Order request and response bodies.

use std::collections::BTreeMap;

use salvo::oapi::ToSchema;
use serde::{Deserialize, Serialize};
use uuid::Uuid;
use validator::Validate;

use forno_app::domain::{
    carts::{CartItem, ChosenConfiguration, ToppingRef},
    orders::{
        data::OrderRequest,
        records::{OrderRecord, PaymentMode},
    },
    tenants::TenantId,
};

/// Create Order Request
#[derive(Debug, Serialize, Deserialize, ToSchema, Validate)]
#[serde(rename_all = "camelCase")]
pub(crate) struct CreateOrderRequest {
    /// Cart lines, at least one
    #[validate(length(min = 1, message = "cart must not be empty"), nested)]
    pub cart: Vec<CartItemBody>,

    /// Optional coupon code
    pub coupon_code: Option<String>,

    /// Tenant placing the order
    #[validate(length(min = 1, message = "tenantId is required"))]
    pub tenant_id: String,

    pub payment_mode: PaymentModeBody,

    #[validate(length(min = 1, message = "customerId is required"))]
    pub customer_id: String,

    pub comment: Option<String>,

    /// Delivery address
    #[validate(length(min = 1, message = "address is required"))]
    pub address: String,
}

impl From<CreateOrderRequest> for OrderRequest {
    fn from(request: CreateOrderRequest) -> Self {
        OrderRequest {
            cart: request.cart.into_iter().map(CartItem::from).collect(),
            coupon_code: request.coupon_code,
            tenant: TenantId::new(request.tenant_id),
            payment_mode: request.payment_mode.into(),
            customer_id: request.customer_id,
            comment: request.comment,
            address: request.address,
        }
    }
}

/// Payment Mode
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "lowercase")]
pub(crate) enum PaymentModeBody {
    #[serde(alias = "CARD")]
    Card,

    #[serde(alias = "CASH")]
    Cash,
}

impl From<PaymentModeBody> for PaymentMode {
    fn from(mode: PaymentModeBody) -> Self {
        match mode {
            PaymentModeBody::Card => PaymentMode::Card,
            PaymentModeBody::Cash => PaymentMode::Cash,
        }
    }
}

/// Cart Item
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema, Validate)]
#[serde(rename_all = "camelCase")]
pub(crate) struct CartItemBody {
    #[validate(length(min = 1, message = "productId is required"))]
    pub product_id: String,

    /// Number of units
    #[validate(range(min = 1, message = "qty must be at least 1"))]
    pub qty: u32,

    #[validate(nested)]
    pub chosen_configuration: ChosenConfigurationBody,
}

/// Chosen Configuration
#[derive(Debug, Clone, Default, Serialize, Deserialize, ToSchema, Validate)]
#[serde(rename_all = "camelCase")]
pub(crate) struct ChosenConfigurationBody {
    /// Option group to selected option, e.g. `{"Size": "Large"}`
    pub price_configuration: BTreeMap<String, String>,

    #[serde(default)]
    #[validate(nested)]
    pub selected_toppings: Vec<ToppingBody>,
}

/// Selected Topping
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema, Validate)]
#[serde(rename_all = "camelCase")]
pub(crate) struct ToppingBody {
    #[validate(length(min = 1, message = "toppingId is required"))]
    pub topping_id: String,

    /// Price the client saw, in minor units
    pub price: u64,
}

impl From<CartItemBody> for CartItem {
    fn from(item: CartItemBody) -> Self {
        CartItem {
            product_id: item.product_id,
            qty: item.qty,
            chosen_configuration: ChosenConfiguration {
                price_configuration: item.chosen_configuration.price_configuration,
                selected_toppings: item
                    .chosen_configuration
                    .selected_toppings
                    .into_iter()
                    .map(|topping| ToppingRef {
                        topping_id: topping.topping_id,
                        price: topping.price,
                    })
                    .collect(),
            },
        }
    }
}

impl From<CartItem> for CartItemBody {
    fn from(item: CartItem) -> Self {
        CartItemBody {
            product_id: item.product_id,
            qty: item.qty,
            chosen_configuration: ChosenConfigurationBody {
                price_configuration: item.chosen_configuration.price_configuration,
                selected_toppings: item
                    .chosen_configuration
                    .selected_toppings
                    .into_iter()
                    .map(|topping| ToppingBody {
                        topping_id: topping.topping_id,
                        price: topping.price,
                    })
                    .collect(),
            },
        }
    }
}

/// Order Response
#[derive(Debug, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub(crate) struct OrderResponse {
    pub uuid: Uuid,
    pub tenant_id: String,
    pub customer_id: String,
    pub cart: Vec<CartItemBody>,
    pub address: String,
    pub comment: Option<String>,

    /// Amounts in minor units
    pub delivery_charges: u64,
    pub discount: u64,
    pub taxes: u64,
    pub total: u64,

    pub order_status: String,
    pub payment_mode: String,
    pub payment_status: String,
    pub created_at: String,
    pub updated_at: String,
}

impl From<OrderRecord> for OrderResponse {
    fn from(order: OrderRecord) -> Self {
        OrderResponse {
            uuid: order.uuid.into_uuid(),
            tenant_id: order.tenant.to_string(),
            customer_id: order.customer_id,
            cart: order.cart.into_iter().map(CartItemBody::from).collect(),
            address: order.address,
            comment: order.comment,
            delivery_charges: order.delivery_charges,
            discount: order.discount,
            taxes: order.taxes,
            total: order.total,
            order_status: order.order_status.to_string(),
            payment_mode: order.payment_mode.to_string(),
            payment_status: order.payment_status.to_string(),
            created_at: order.created_at.to_string(),
            updated_at: order.updated_at.to_string(),
        }
    }
}

#[cfg(test)]
mod tests {
    use serde_json::json;
    use testresult::TestResult;

    use super::*;

    fn request(body: serde_json::Value) -> Result<CreateOrderRequest, serde_json::Error> {
        serde_json::from_value(body)
    }

    fn valid_body() -> serde_json::Value {
        json!({
            "cart": [{
                "productId": "margherita",
                "qty": 2,
                "chosenConfiguration": {
                    "priceConfiguration": { "Size": "Large" },
                    "selectedToppings": [{ "toppingId": "olives", "price": 30 }]
                }
            }],
            "couponCode": "PIZZA10",
            "tenantId": "tenant-a",
            "paymentMode": "card",
            "customerId": "customer-1",
            "address": "221B Baker Street"
        })
    }

    #[test]
    fn valid_request_passes_validation() -> TestResult {
        let request = request(valid_body())?;

        request.validate()?;

        let order: OrderRequest = request.into();

        assert_eq!(order.tenant, TenantId::new("tenant-a"));
        assert_eq!(order.payment_mode, PaymentMode::Card);
        assert_eq!(order.cart[0].topping_ids().collect::<Vec<_>>(), ["olives"]);

        Ok(())
    }

    #[test]
    fn uppercase_payment_mode_is_accepted() -> TestResult {
        let mut body = valid_body();
        body["paymentMode"] = json!("CASH");

        assert_eq!(request(body)?.payment_mode, PaymentModeBody::Cash);

        Ok(())
    }

    #[test]
    fn empty_cart_is_rejected() -> TestResult {
        let mut body = valid_body();
        body["cart"] = json!([]);

        let errors = request(body)?.validate().err().ok_or("expected errors")?;

        assert!(errors.field_errors().contains_key("cart"));

        Ok(())
    }

    #[test]
    fn zero_quantity_is_rejected() -> TestResult {
        let mut body = valid_body();
        body["cart"][0]["qty"] = json!(0);

        assert!(request(body)?.validate().is_err());

        Ok(())
    }

    #[test]
    fn blank_address_is_rejected() -> TestResult {
        let mut body = valid_body();
        body["address"] = json!("");

        let errors = request(body)?.validate().err().ok_or("expected errors")?;

        assert!(errors.field_errors().contains_key("address"));

        Ok(())
    }
}
