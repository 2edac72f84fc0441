//! Errors

use std::collections::BTreeMap;

use salvo::{
    Scribe,
    http::{StatusCode, StatusError},
    oapi::{
        Components, Content, EndpointOutRegister, Operation, Response as OapiResponse, ToSchema,
    },
    prelude::*,
};
use serde::{Deserialize, Serialize};
use tracing::error;
use validator::{ValidationError, ValidationErrors, ValidationErrorsKind};

use forno_app::domain::orders::OrdersServiceError;

pub(crate) fn into_status_error(error: OrdersServiceError) -> StatusError {
    match error {
        OrdersServiceError::MissingIdempotencyKey => {
            StatusError::bad_request().brief("Idempotency-Key header is required")
        }
        OrdersServiceError::PricingLookup(source) => StatusError::bad_request()
            .brief("Cart does not match the product catalog")
            .detail(source.to_string()),
        OrdersServiceError::NotFound => StatusError::not_found().brief("Order not found"),
        OrdersServiceError::Pricing(_)
        | OrdersServiceError::Coupons(_)
        | OrdersServiceError::Charges(_)
        | OrdersServiceError::Ledger(_) => {
            error!("order request failed: {error}");

            StatusError::internal_server_error()
        }
    }
}

/// Invalid Payload Response
#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub(crate) struct InvalidPayloadResponse {
    pub error: InvalidPayload,
}

/// Invalid Payload
#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub(crate) struct InvalidPayload {
    pub code: u16,

    pub brief: String,

    /// Messages keyed by field path, such as `cart[0].qty`
    pub fields: BTreeMap<String, Vec<String>>,
}

impl From<&ValidationErrors> for InvalidPayloadResponse {
    fn from(errors: &ValidationErrors) -> Self {
        let mut fields = BTreeMap::new();

        collect_fields("", errors, &mut fields);

        InvalidPayloadResponse {
            error: InvalidPayload {
                code: StatusCode::BAD_REQUEST.as_u16(),
                brief: "Invalid order payload".to_string(),
                fields,
            },
        }
    }
}

/// Create order failures: payload validation with per-field messages, or any
/// other status.
#[derive(Debug)]
pub(crate) enum CreateOrderError {
    Invalid(InvalidPayloadResponse),
    Status(StatusError),
}

impl From<StatusError> for CreateOrderError {
    fn from(error: StatusError) -> Self {
        CreateOrderError::Status(error)
    }
}

impl From<ValidationErrors> for CreateOrderError {
    fn from(errors: ValidationErrors) -> Self {
        CreateOrderError::Invalid(InvalidPayloadResponse::from(&errors))
    }
}

impl Scribe for CreateOrderError {
    fn render(self, res: &mut Response) {
        match self {
            CreateOrderError::Invalid(body) => {
                res.status_code(StatusCode::BAD_REQUEST);
                res.render(Json(body));
            }
            CreateOrderError::Status(error) => res.render(error),
        }
    }
}

impl EndpointOutRegister for CreateOrderError {
    fn register(components: &mut Components, operation: &mut Operation) {
        StatusError::register(components, operation);

        let schema = InvalidPayloadResponse::to_schema(components);

        operation.responses.insert(
            StatusCode::BAD_REQUEST.as_str(),
            OapiResponse::new("Invalid order payload")
                .add_content("application/json", Content::new(schema)),
        );
    }
}

fn collect_fields(
    prefix: &str,
    errors: &ValidationErrors,
    fields: &mut BTreeMap<String, Vec<String>>,
) {
    for (field, kind) in errors.errors() {
        let name = camel_case(field);
        let path = if prefix.is_empty() {
            name
        } else {
            format!("{prefix}.{name}")
        };

        match kind {
            ValidationErrorsKind::Field(list) => fields
                .entry(path)
                .or_default()
                .extend(list.iter().map(field_message)),
            ValidationErrorsKind::Struct(inner) => collect_fields(&path, inner, fields),
            ValidationErrorsKind::List(items) => {
                for (index, inner) in items {
                    collect_fields(&format!("{path}[{index}]"), inner, fields);
                }
            }
        }
    }
}

fn field_message(error: &ValidationError) -> String {
    error
        .message
        .as_ref()
        .map_or_else(|| error.code.to_string(), ToString::to_string)
}

// Bodies are camelCase on the wire while validator reports Rust field names.
fn camel_case(field: &str) -> String {
    let mut out = String::with_capacity(field.len());
    let mut upper = false;

    for ch in field.chars() {
        if ch == '_' {
            upper = true;
        } else if upper {
            out.extend(ch.to_uppercase());
            upper = false;
        } else {
            out.push(ch);
        }
    }

    out
}
