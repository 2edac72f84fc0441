//! Payments Config

use clap::Args;

use forno_app::domain::payments::HttpPaymentGatewayConfig;

/// Payment gateway settings.
#[derive(Debug, Args)]
pub struct PaymentsConfig {
    /// Payment gateway base URL
    #[arg(long, env = "PAYMENT_GATEWAY_URL")]
    pub payment_gateway_url: String,

    /// Payment gateway API key
    #[arg(
        long,
        env = "PAYMENT_GATEWAY_API_KEY",
        hide_env_values = true,
        default_value = ""
    )]
    pub payment_gateway_api_key: String,
}

impl PaymentsConfig {
    #[must_use]
    pub fn gateway(&self) -> HttpPaymentGatewayConfig {
        HttpPaymentGatewayConfig {
            base_url: self.payment_gateway_url.clone(),
            api_key: self.payment_gateway_api_key.clone(),
        }
    }
}
