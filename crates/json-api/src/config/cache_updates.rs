//! Cache Updates Config

use std::time::Duration;

use clap::Args;

/// Pricing cache update settings.
#[derive(Debug, Args)]
pub struct CacheUpdatesConfig {
    /// Topics to consume price updates from
    #[arg(
        long = "cache-update-topics",
        env = "CACHE_UPDATE_TOPICS",
        value_delimiter = ',',
        default_value = "product,topping"
    )]
    pub topics: Vec<String>,

    /// Run the cache update dispatcher alongside the server
    #[arg(
        long = "cache-updates-enabled",
        env = "CACHE_UPDATES_ENABLED",
        default_value_t = true,
        action = clap::ArgAction::Set
    )]
    pub enabled: bool,

    /// Delay before restarting a failed dispatcher, in milliseconds
    #[arg(
        long = "cache-updates-restart-delay-ms",
        env = "CACHE_UPDATES_RESTART_DELAY_MS",
        default_value_t = 5_000
    )]
    pub restart_delay_ms: u64,
}

impl CacheUpdatesConfig {
    #[must_use]
    pub fn restart_delay(&self) -> Duration {
        Duration::from_millis(self.restart_delay_ms)
    }
}
