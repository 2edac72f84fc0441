//! Order Intake Config

use clap::Args;
use rust_decimal::Decimal;

use forno_app::domain::orders::charges::IntakePolicy;

/// Charges applied to every order.
#[derive(Debug, Args)]
pub struct IntakeConfig {
    /// Tax rate, in percent of the discounted subtotal (0 to 100)
    #[arg(
        long,
        env = "ORDER_TAX_RATE_PERCENT",
        default_value = "18",
        value_parser = parse_tax_rate
    )]
    pub tax_rate_percent: Decimal,

    /// Flat delivery charge in minor units
    #[arg(long, env = "ORDER_DELIVERY_CHARGE", default_value_t = 100)]
    pub delivery_charge: u64,

    /// Currency sent to the payment gateway
    #[arg(long, env = "PAYMENT_CURRENCY", default_value = "inr")]
    pub currency: String,
}

fn parse_tax_rate(raw: &str) -> Result<Decimal, String> {
    let rate: Decimal = raw
        .trim()
        .parse()
        .map_err(|error| format!("invalid tax rate {raw:?}: {error}"))?;

    if rate < Decimal::ZERO || rate > Decimal::ONE_HUNDRED {
        return Err(format!("tax rate must be between 0 and 100, got {rate}"));
    }

    Ok(rate)
}

impl IntakeConfig {
    #[must_use]
    pub fn policy(&self) -> IntakePolicy {
        IntakePolicy {
            tax_rate_percent: self.tax_rate_percent,
            delivery_charge: self.delivery_charge,
            currency: self.currency.clone(),
        }
    }
}
