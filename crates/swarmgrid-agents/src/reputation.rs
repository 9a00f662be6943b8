//! Reputation bounds, adjustment, and the price it drives.
//!
//! Reputation is an exact decimal in `[0, 100]`. A provider's reputation
//! scales the price it quotes (50 is price-neutral) and weights how often it
//! is picked by consumers. Every adjustment clamps.

use rust_decimal::Decimal;
use rust_decimal::prelude::ToPrimitive;

// ---------------------------------------------------------------------------
// Constants
// ---------------------------------------------------------------------------

/// Lowest reputation.
pub const MIN_REPUTATION: Decimal = Decimal::ZERO;

/// Highest reputation.
pub const MAX_REPUTATION: Decimal = Decimal::ONE_HUNDRED;

/// Starting reputation; quotes at exactly the base price.
pub const NEUTRAL_REPUTATION: Decimal = Decimal::from_parts(50, 0, 0, false, 0);

/// Price per unit at neutral reputation.
pub const BASE_PRICE: u32 = 10;

/// Reputation gained per success is `impact * SUCCESS_MULTIPLIER`.
const SUCCESS_MULTIPLIER: Decimal = Decimal::TEN;

/// Reputation lost per failure is `impact * FAILURE_MULTIPLIER`.
const FAILURE_MULTIPLIER: Decimal = Decimal::from_parts(15, 0, 0, false, 0);

// ---------------------------------------------------------------------------
// Adjustment
// ---------------------------------------------------------------------------

/// Clamp `value` into `[MIN_REPUTATION, MAX_REPUTATION]`.
pub fn clamp_reputation(value: Decimal) -> Decimal {
    value.clamp(MIN_REPUTATION, MAX_REPUTATION)
}

/// Reputation after a successful trade.
pub fn reward(current: Decimal, impact: Decimal) -> Decimal {
    clamp_reputation(current.saturating_add(impact.saturating_mul(SUCCESS_MULTIPLIER)))
}

/// Reputation after a failed trade.
pub fn penalize(current: Decimal, impact: Decimal) -> Decimal {
    clamp_reputation(current.saturating_sub(impact.saturating_mul(FAILURE_MULTIPLIER)))
}

// ---------------------------------------------------------------------------
// Pricing
// ---------------------------------------------------------------------------

/// `max(1, floor(BASE_PRICE * amount * reputation / 50))`.
pub fn quote_price(amount: u32, reputation: Decimal) -> u32 {
    let scaled = Decimal::from(BASE_PRICE)
        .saturating_mul(Decimal::from(amount))
        .saturating_mul(reputation.max(Decimal::ZERO));
    let price = scaled
        .checked_div(NEUTRAL_REPUTATION)
        .unwrap_or(Decimal::ZERO)
        .floor()
        .to_u32()
        .unwrap_or(u32::MAX);
    price.max(1)
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use rust_decimal_macros::dec;

    use super::*;

    #[test]
    fn neutral_reputation_is_price_neutral() {
        assert_eq!(quote_price(5, NEUTRAL_REPUTATION), 50);
        assert_eq!(quote_price(1, dec!(50)), 10);
    }

    #[test]
    fn reputation_scales_price() {
        assert_eq!(quote_price(5, dec!(100)), 100);
        assert_eq!(quote_price(3, dec!(48.5)), 29);
        assert_eq!(quote_price(1, dec!(51)), 10);
    }

    #[test]
    fn price_never_below_one() {
        assert_eq!(quote_price(1, Decimal::ZERO), 1);
        assert_eq!(quote_price(1, dec!(2)), 1);
    }

    #[test]
    fn success_and_failure_adjustments_are_exact() {
        assert_eq!(reward(dec!(50), dec!(0.1)), dec!(51));
        assert_eq!(penalize(dec!(50), dec!(0.1)), dec!(48.5));
    }

    #[test]
    fn adjustments_clamp_to_bounds() {
        assert_eq!(reward(dec!(99.5), dec!(1)), MAX_REPUTATION);
        assert_eq!(penalize(dec!(1), dec!(1)), MIN_REPUTATION);
        assert_eq!(clamp_reputation(dec!(-3)), MIN_REPUTATION);
    }
}
