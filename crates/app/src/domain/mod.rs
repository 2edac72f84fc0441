//! Forno Domain Concerns

pub mod cache_updates;
pub mod carts;
pub mod coupons;
pub mod events;
pub mod orders;
pub mod payments;
pub mod pricing;
pub mod tenants;
