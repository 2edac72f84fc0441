//! HTTP payment gateway client.

use async_trait::async_trait;
use reqwest::Client;
use serde::Serialize;

use crate::domain::payments::{
    errors::GatewayError,
    gateway::{PaymentGateway, PaymentSession, PaymentSessionRequest},
};

/// Configuration for connecting to the payment gateway.
#[derive(Debug, Clone)]
pub struct HttpPaymentGatewayConfig {
    /// Base URL, e.g. `"https://payments.internal"`.
    pub base_url: String,

    /// Bearer token sent with every request.
    pub api_key: String,
}

/// Payment gateway reached over HTTP.
#[derive(Debug, Clone)]
pub struct HttpPaymentGateway {
    config: HttpPaymentGatewayConfig,
    http: Client,
}

impl HttpPaymentGateway {
    #[must_use]
    pub fn new(config: HttpPaymentGatewayConfig) -> Self {
        Self {
            config,
            http: Client::new(),
        }
    }
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct SessionBody<'a> {
    idempotent_key: &'a str,
    amount: u64,
    order_id: String,
    currency: &'a str,
    tenant_id: &'a str,
}

#[async_trait]
impl PaymentGateway for HttpPaymentGateway {
    #[tracing::instrument(
        name = "payments.gateway.create_session",
        skip(self, request),
        fields(order_uuid = %request.order, amount = request.amount),
        err
    )]
    async fn create_session(
        &self,
        request: PaymentSessionRequest,
    ) -> Result<PaymentSession, GatewayError> {
        let url = format!("{}/sessions", self.config.base_url.trim_end_matches('/'));

        let body = SessionBody {
            idempotent_key: request.idempotency_key.as_str(),
            amount: request.amount,
            order_id: request.order.to_string(),
            currency: &request.currency,
            tenant_id: request.tenant.as_str(),
        };

        let response = self
            .http
            .post(&url)
            .bearer_auth(&self.config.api_key)
            .header("Idempotency-Key", request.idempotency_key.as_str())
            .json(&body)
            .send()
            .await?;

        if !response.status().is_success() {
            let status = response.status();
            let text = response.text().await.unwrap_or_default();

            return Err(GatewayError::UnexpectedResponse(format!(
                "session request failed with status {status}: {text}"
            )));
        }

        Ok(response.json().await?)
    }
}
