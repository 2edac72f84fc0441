//! Carts
//!
//! A cart is submitted whole with each order request and never mutated
//! afterwards; it is stored verbatim on the order it produced.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

/// Cart line as submitted by the client.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CartItem {
    /// Catalog product identifier.
    pub product_id: String,

    /// Number of units, at least one.
    pub qty: u32,

    /// Options and toppings selected for this line.
    pub chosen_configuration: ChosenConfiguration,
}

/// Selected configuration of a cart line.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ChosenConfiguration {
    /// Option group (e.g. `Size`) to selected option (e.g. `Large`).
    pub price_configuration: BTreeMap<String, String>,

    /// Toppings in the order they were picked.
    #[serde(default)]
    pub selected_toppings: Vec<ToppingRef>,
}

/// Reference to a topping, carrying the price the client saw.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ToppingRef {
    pub topping_id: String,

    /// Client-supplied price in minor units, used only when the topping
    /// has no cached price.
    pub price: u64,
}

impl CartItem {
    /// Topping identifiers selected on this line.
    pub fn topping_ids(&self) -> impl Iterator<Item = &str> {
        self.chosen_configuration
            .selected_toppings
            .iter()
            .map(|topping| topping.topping_id.as_str())
    }
}
