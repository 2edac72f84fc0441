//! Pricing Cache Records

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use crate::domain::tenants::TenantId;

/// Option group name to its priced options.
pub type PriceConfiguration = BTreeMap<String, PriceGroup>;

/// Priced options of a single option group.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PriceGroup {
    /// Catalog price type (`base`, `additional`); informational only.
    #[serde(default)]
    pub price_type: String,

    /// Option name to price in minor units.
    pub available_options: BTreeMap<String, u64>,
}

/// Cached product prices for one tenant.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProductPriceRecord {
    pub product_id: String,
    pub tenant: TenantId,
    pub price_configuration: PriceConfiguration,
}

/// Cached topping price for one tenant.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ToppingPriceRecord {
    pub topping_id: String,
    pub tenant: TenantId,
    pub price: u64,
}
