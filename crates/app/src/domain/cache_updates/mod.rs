//! Cache Updates
//!
//! Keeps the pricing caches in step with the catalog by consuming the
//! catalog's price snapshots.

mod dispatcher;
pub mod errors;
mod handlers;

pub use dispatcher::{CacheUpdateDispatcher, DispatchOutcome};
pub use errors::CacheUpdateError;
pub use handlers::{
    MockTopicHandler, PRODUCT_TOPIC, ProductPriceHandler, ProductPriceUpdate, TOPPING_TOPIC,
    TopicHandler, ToppingPriceHandler, ToppingPriceUpdate,
};
