//! Server configuration module

use clap::Parser;

use crate::config::{
    cache_updates::CacheUpdatesConfig, db::DatabaseConfig, intake::IntakeConfig,
    observability::LoggingConfig, payments::PaymentsConfig, server::ServerRuntimeConfig,
};

pub(crate) mod cache_updates;
pub(crate) mod db;
pub(crate) mod intake;
pub(crate) mod observability;
pub(crate) mod payments;
pub(crate) mod server;

/// Forno JSON API Server configuration
#[derive(Debug, Parser)]
#[command(name = "forno-json", about = "Forno JSON API Server", long_about = None)]
pub struct ServerConfig {
    /// Server network settings.
    #[command(flatten)]
    pub server: ServerRuntimeConfig,

    /// Logging output settings.
    #[command(flatten)]
    pub logging: LoggingConfig,

    /// Application database settings.
    #[command(flatten)]
    pub database: DatabaseConfig,

    /// Payment gateway settings.
    #[command(flatten)]
    pub payments: PaymentsConfig,

    /// Order charge settings.
    #[command(flatten)]
    pub intake: IntakeConfig,

    /// Pricing cache update settings.
    #[command(flatten)]
    pub cache_updates: CacheUpdatesConfig,
}

impl ServerConfig {
    /// Load configuration from environment and CLI arguments
    ///
    /// # Errors
    ///
    /// Returns an error if configuration cannot be parsed
    pub fn load() -> Result<Self, clap::Error> {
        // Load .env file if present (ignore if missing)
        _ = dotenvy::dotenv();

        Self::try_parse()
    }

    /// Get the socket address for binding
    #[must_use]
    pub fn socket_addr(&self) -> String {
        self.server.socket_addr()
    }
}

#[cfg(test)]
mod tests {
    use rust_decimal::Decimal;
    use testresult::TestResult;

    use super::*;

    const REQUIRED: [&str; 5] = [
        "forno-json",
        "--database-url",
        "postgres://forno@localhost/forno",
        "--payment-gateway-url",
        "http://payments.test",
    ];

    #[test]
    fn defaults_apply_when_only_required_settings_are_given() -> TestResult {
        let config = ServerConfig::try_parse_from(REQUIRED)?;

        assert_eq!(config.socket_addr(), "0.0.0.0:8698");
        assert_eq!(config.database.max_connections, 10);
        assert!(config.database.run_migrations);
        assert_eq!(config.intake.tax_rate_percent, Decimal::from(18));
        assert_eq!(config.intake.delivery_charge, 100);
        assert_eq!(config.intake.currency, "inr");
        assert_eq!(config.cache_updates.topics, ["product", "topping"]);
        assert!(config.cache_updates.enabled);

        Ok(())
    }

    #[test]
    fn topics_are_comma_separated() -> TestResult {
        let config = ServerConfig::try_parse_from(
            REQUIRED
                .into_iter()
                .chain(["--cache-update-topics", "topping,inventory"]),
        )?;

        assert_eq!(config.cache_updates.topics, ["topping", "inventory"]);

        Ok(())
    }

    #[test]
    fn tax_rate_must_be_a_percentage() -> TestResult {
        let with_rate =
            |arg: &'static str| ServerConfig::try_parse_from(REQUIRED.into_iter().chain([arg]));

        assert!(with_rate("--tax-rate-percent=-5").is_err());
        assert!(with_rate("--tax-rate-percent=250").is_err());
        assert!(with_rate("--tax-rate-percent=eighteen").is_err());

        assert_eq!(
            with_rate("--tax-rate-percent=0")?.intake.tax_rate_percent,
            Decimal::ZERO
        );
        assert_eq!(
            with_rate("--tax-rate-percent=12.5")?.intake.tax_rate_percent,
            Decimal::new(125, 1)
        );
        assert_eq!(
            with_rate("--tax-rate-percent=100")?.intake.tax_rate_percent,
            Decimal::ONE_HUNDRED
        );

        Ok(())
    }
}
