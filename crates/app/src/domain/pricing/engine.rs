//! Price computation.
//!
//! Pricing is pure arithmetic over a snapshot of the caches: the same cart
//! and the same cache contents always give the same total. Two fallback
//! policies apply:
//!
//! - a cart line whose product has no cache entry contributes nothing;
//! - a topping with no cache entry is priced at the client-supplied price.

use std::collections::{BTreeSet, HashMap};

use tracing::debug;

use crate::domain::{
    carts::{CartItem, ToppingRef},
    pricing::{
        PricingCache,
        errors::{PricingError, PricingLookupError},
        records::{ProductPriceRecord, ToppingPriceRecord},
    },
    tenants::TenantId,
};

/// Price a cart against the tenant's pricing caches.
///
/// # Errors
///
/// Returns an error when either cache lookup fails, or when a cached product
/// lacks an option group or option the cart selected.
pub async fn price_cart(
    cache: &dyn PricingCache,
    tenant: &TenantId,
    cart: &[CartItem],
) -> Result<u64, PricingError> {
    let product_ids: BTreeSet<String> = cart.iter().map(|item| item.product_id.clone()).collect();

    let topping_ids: BTreeSet<String> = cart
        .iter()
        .flat_map(CartItem::topping_ids)
        .map(ToString::to_string)
        .collect();

    let products = cache
        .product_prices(tenant.clone(), product_ids.into_iter().collect())
        .await?;

    let toppings = cache
        .topping_prices(tenant.clone(), topping_ids.into_iter().collect())
        .await?;

    Ok(cart_total(cart, &products, &toppings)?)
}

/// Total price of a cart: the sum of every priced line.
///
/// # Errors
///
/// Returns an error when a cached product lacks a selected group or option, or
/// when the total does not fit in a `u64`.
pub fn cart_total(
    cart: &[CartItem],
    products: &[ProductPriceRecord],
    toppings: &[ToppingPriceRecord],
) -> Result<u64, PricingLookupError> {
    let products: HashMap<&str, &ProductPriceRecord> = products
        .iter()
        .map(|product| (product.product_id.as_str(), product))
        .collect();

    let toppings: HashMap<&str, u64> = toppings
        .iter()
        .map(|topping| (topping.topping_id.as_str(), topping.price))
        .collect();

    cart.iter().try_fold(0_u64, |total, item| {
        let Some(product) = products.get(item.product_id.as_str()) else {
            debug!(product_id = %item.product_id, "no cached prices for product, skipping line");

            return Ok(total);
        };

        total
            .checked_add(item_total(item, product, &toppings)?)
            .ok_or_else(|| overflow(product))
    })
}

/// `qty × (toppings + product options)` for a single line.
fn item_total(
    item: &CartItem,
    product: &ProductPriceRecord,
    toppings: &HashMap<&str, u64>,
) -> Result<u64, PricingLookupError> {
    let toppings_total = item
        .chosen_configuration
        .selected_toppings
        .iter()
        .map(|topping| topping_price(topping, toppings))
        .try_fold(0_u64, u64::checked_add)
        .ok_or_else(|| overflow(product))?;

    let product_total = product_total(item, product)?;

    toppings_total
        .checked_add(product_total)
        .and_then(|unit| unit.checked_mul(u64::from(item.qty)))
        .ok_or_else(|| overflow(product))
}

fn overflow(product: &ProductPriceRecord) -> PricingLookupError {
    PricingLookupError::Overflow {
        product_id: product.product_id.clone(),
    }
}

/// Cached topping price, falling back to the price on the reference itself.
fn topping_price(topping: &ToppingRef, toppings: &HashMap<&str, u64>) -> u64 {
    toppings
        .get(topping.topping_id.as_str())
        .copied()
        .unwrap_or(topping.price)
}

fn product_total(item: &CartItem, product: &ProductPriceRecord) -> Result<u64, PricingLookupError> {
    item.chosen_configuration
        .price_configuration
        .iter()
        .try_fold(0_u64, |total, (group, option)| {
            let options = product
                .price_configuration
                .get(group)
                .ok_or_else(|| PricingLookupError::UnknownGroup {
                    product_id: product.product_id.clone(),
                    group: group.clone(),
                })?;

            let price = options.available_options.get(option).ok_or_else(|| {
                PricingLookupError::UnknownOption {
                    product_id: product.product_id.clone(),
                    group: group.clone(),
                    option: option.clone(),
                }
            })?;

            total.checked_add(*price).ok_or_else(|| overflow(product))
        })
}

#[cfg(test)]
mod tests {
    use std::collections::BTreeMap;

    use testresult::TestResult;

    use crate::domain::{
        carts::ChosenConfiguration,
        pricing::{
            MockPricingCache,
            records::{PriceConfiguration, PriceGroup},
        },
    };

    use super::*;

    fn tenant() -> TenantId {
        TenantId::new("tenant-a")
    }

    fn group(options: &[(&str, u64)]) -> PriceGroup {
        PriceGroup {
            price_type: "base".to_string(),
            available_options: options
                .iter()
                .map(|(name, price)| ((*name).to_string(), *price))
                .collect(),
        }
    }

    fn pizza(id: &str) -> ProductPriceRecord {
        let price_configuration: PriceConfiguration = BTreeMap::from([
            (
                "Size".to_string(),
                group(&[("Small", 400), ("Medium", 500), ("Large", 600)]),
            ),
            ("Crust".to_string(), group(&[("Thin", 0), ("Thick", 50)])),
        ]);

        ProductPriceRecord {
            product_id: id.to_string(),
            tenant: tenant(),
            price_configuration,
        }
    }

    fn topping(id: &str, price: u64) -> ToppingPriceRecord {
        ToppingPriceRecord {
            topping_id: id.to_string(),
            tenant: tenant(),
            price,
        }
    }

    fn item(product_id: &str, qty: u32, options: &[(&str, &str)], toppings: &[(&str, u64)]) -> CartItem {
        CartItem {
            product_id: product_id.to_string(),
            qty,
            chosen_configuration: ChosenConfiguration {
                price_configuration: options
                    .iter()
                    .map(|(group, option)| ((*group).to_string(), (*option).to_string()))
                    .collect(),
                selected_toppings: toppings
                    .iter()
                    .map(|(id, price)| ToppingRef {
                        topping_id: (*id).to_string(),
                        price: *price,
                    })
                    .collect(),
            },
        }
    }

    #[test]
    fn empty_cart_costs_nothing() -> TestResult {
        assert_eq!(cart_total(&[], &[pizza("margherita")], &[])?, 0);

        Ok(())
    }

    #[test]
    fn total_is_sum_of_qty_times_options_and_toppings() -> TestResult {
        let cart = [
            item(
                "margherita",
                2,
                &[("Size", "Large"), ("Crust", "Thick")],
                &[("olives", 999), ("basil", 999)],
            ),
            item("pepperoni", 1, &[("Size", "Small")], &[("olives", 999)]),
        ];

        let products = [pizza("margherita"), pizza("pepperoni")];
        let toppings = [topping("olives", 30), topping("basil", 20)];

        let expected = 2 * ((30 + 20) + (600 + 50)) + (30 + 400);

        assert_eq!(cart_total(&cart, &products, &toppings)?, expected);

        Ok(())
    }

    #[test]
    fn line_without_cached_product_is_skipped() -> TestResult {
        let cart = [
            item("margherita", 1, &[("Size", "Medium")], &[]),
            item("unknown", 3, &[("Size", "Huge")], &[("olives", 30)]),
        ];

        assert_eq!(cart_total(&cart, &[pizza("margherita")], &[])?, 500);

        Ok(())
    }

    #[test]
    fn topping_without_cached_price_uses_client_price() -> TestResult {
        let cart = [item(
            "margherita",
            1,
            &[("Size", "Small")],
            &[("olives", 30), ("truffle", 250)],
        )];

        let toppings = [topping("olives", 35)];

        assert_eq!(cart_total(&cart, &[pizza("margherita")], &toppings)?, 400 + 35 + 250);

        Ok(())
    }

    #[test]
    fn unknown_option_group_is_an_error() {
        let cart = [item("margherita", 1, &[("Sauce", "Pesto")], &[])];

        let result = cart_total(&cart, &[pizza("margherita")], &[]);

        assert_eq!(
            result,
            Err(PricingLookupError::UnknownGroup {
                product_id: "margherita".to_string(),
                group: "Sauce".to_string(),
            })
        );
    }

    #[test]
    fn unknown_option_is_an_error() {
        let cart = [item("margherita", 1, &[("Size", "Family")], &[])];

        let result = cart_total(&cart, &[pizza("margherita")], &[]);

        assert_eq!(
            result,
            Err(PricingLookupError::UnknownOption {
                product_id: "margherita".to_string(),
                group: "Size".to_string(),
                option: "Family".to_string(),
            })
        );
    }

    #[test]
    fn total_beyond_u64_is_an_error() {
        let products = [
            pizza("margherita"),
            ProductPriceRecord {
                price_configuration: BTreeMap::from([(
                    "Size".to_string(),
                    group(&[("Banquet", u64::MAX / 2)]),
                )]),
                ..pizza("banquet")
            },
        ];

        let many = [item("banquet", 3, &[("Size", "Banquet")], &[])];
        let summed = [
            item("banquet", 1, &[("Size", "Banquet")], &[]),
            item("banquet", 1, &[("Size", "Banquet")], &[("gold", u64::MAX)]),
        ];
        let lines = [
            item("banquet", 2, &[("Size", "Banquet")], &[]),
            item("margherita", 1, &[("Size", "Large")], &[]),
        ];

        for cart in [&many[..], &summed[..], &lines[..]] {
            assert_eq!(
                cart_total(cart, &products, &[]),
                Err(PricingLookupError::Overflow {
                    product_id: cart[cart.len() - 1].product_id.clone(),
                })
            );
        }
    }

    #[test]
    fn same_snapshot_gives_same_total() -> TestResult {
        let cart = [item("margherita", 3, &[("Size", "Large")], &[("olives", 30)])];
        let products = [pizza("margherita")];

        let first = cart_total(&cart, &products, &[])?;
        let second = cart_total(&cart, &products, &[])?;

        assert_eq!(first, second);
        assert_eq!(first, 3 * (600 + 30));

        Ok(())
    }

    #[tokio::test]
    async fn price_cart_looks_up_deduplicated_ids() -> TestResult {
        let cart = [
            item("margherita", 1, &[("Size", "Small")], &[("olives", 30)]),
            item("margherita", 1, &[("Size", "Large")], &[("olives", 30), ("basil", 10)]),
        ];

        let mut cache = MockPricingCache::new();

        cache
            .expect_product_prices()
            .once()
            .withf(|tenant, ids| *tenant == TenantId::new("tenant-a") && *ids == ["margherita"])
            .return_once(|_, _| Ok(vec![pizza("margherita")]));

        cache
            .expect_topping_prices()
            .once()
            .withf(|_, ids| *ids == ["basil", "olives"])
            .return_once(|_, _| Ok(vec![topping("olives", 40)]));

        cache.expect_upsert_product_price().never();
        cache.expect_upsert_topping_price().never();

        let total = price_cart(&cache, &tenant(), &cart).await?;

        assert_eq!(total, (400 + 40) + (600 + 40 + 10));

        Ok(())
    }
}
