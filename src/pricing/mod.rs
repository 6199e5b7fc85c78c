//! Commission pricing policy
//!
//! The platform takes a tiered cut of every sale: 5% for prices up to 5000,
//! 10% above that, truncated toward zero. Both the checkout session issuer
//! and the webhook reconciler use these functions so the split committed at
//! session creation matches what settlement records.

/// Price threshold above which the higher commission tier applies
pub const COMMISSION_TIER_THRESHOLD: i64 = 5000;

/// Compute the platform commission for a given price.
pub fn commission(price: i64) -> i64 {
    if price <= COMMISSION_TIER_THRESHOLD {
        price * 5 / 100
    } else {
        price * 10 / 100
    }
}

/// Compute the amount paid out to the seller for a given price.
pub fn seller_amount(price: i64) -> i64 {
    price - commission(price)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_commission_tiers() {
        assert_eq!(commission(1), 0);
        assert_eq!(commission(100), 5);
        assert_eq!(commission(5000), 250);
        assert_eq!(commission(5001), 500);
        assert_eq!(commission(6000), 600);
        assert_eq!(commission(10000), 1000);
    }

    #[test]
    fn test_commission_truncates_toward_zero() {
        // 5% of 99 is 4.95, truncated to 4
        assert_eq!(commission(99), 4);
        // 10% of 5001 is 500.1, truncated to 500
        assert_eq!(commission(5001), 500);
    }

    #[test]
    fn test_seller_amount() {
        assert_eq!(seller_amount(6000), 5400);
        assert_eq!(seller_amount(5000), 4750);
        assert_eq!(seller_amount(1), 1);
    }

    #[test]
    fn test_split_sums_to_price_over_full_range() {
        for price in 1..=10000 {
            assert_eq!(
                commission(price) + seller_amount(price),
                price,
                "split must sum to price for {}",
                price
            );
            let expected = if price <= 5000 {
                price * 5 / 100
            } else {
                price * 10 / 100
            };
            assert_eq!(commission(price), expected);
        }
    }
}
