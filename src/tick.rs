//! Logarithmic tick codec.
//!
//! Entry prices are persisted as a compact integer tick with
//! `price = 1.0001^tick`, so one tick is a basis-point-ish step. The codec
//! must round-trip to within one tick; valuation depends on decode being
//! the near-exact inverse of encode.

use crate::error::StateError;
use crate::types::Price;
use rust_decimal::prelude::ToPrimitive;
use rust_decimal::{Decimal, MathematicalOps, RoundingStrategy};
use rust_decimal_macros::dec;

const TICK_BASE: Decimal = dec!(1.0001);

/// Decode a tick into an absolute price.
pub fn tick_to_price(tick: i32) -> Result<Price, StateError> {
    let price = TICK_BASE
        .checked_powi(tick as i64)
        .ok_or(StateError::TickOutOfRange(tick))?;
    Price::new(price).ok_or(StateError::TickOutOfRange(tick))
}

/// Encode a price as the nearest tick.
pub fn price_to_tick(price: Decimal) -> Result<i32, StateError> {
    if price <= Decimal::ZERO {
        return Err(StateError::NonPositivePrice(price));
    }
    let ln_price = price.checked_ln().ok_or(StateError::NonPositivePrice(price))?;
    let ln_base = TICK_BASE.ln();
    let tick = (ln_price / ln_base)
        .round_dp_with_strategy(0, RoundingStrategy::MidpointAwayFromZero);
    tick.to_i32()
        .ok_or(StateError::NonPositivePrice(price))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn tick_zero_is_unit_price() {
        assert_eq!(tick_to_price(0).unwrap().value(), dec!(1));
        assert_eq!(price_to_tick(dec!(1)).unwrap(), 0);
    }

    #[test]
    fn positive_ticks_exceed_one() {
        let p = tick_to_price(1).unwrap().value();
        assert_eq!(p, dec!(1.0001));
        assert!(tick_to_price(10_000).unwrap().value() > dec!(2.7));
    }

    #[test]
    fn negative_ticks_below_one() {
        let p = tick_to_price(-1).unwrap().value();
        assert!(p < dec!(1) && p > dec!(0.9998));
    }

    #[test]
    fn round_trips_within_one_tick() {
        for price in [
            dec!(0.001),
            dec!(0.5),
            dec!(1),
            dec!(1.0001),
            dec!(42),
            dec!(1234.5678),
            dec!(100000),
        ] {
            let tick = price_to_tick(price).unwrap();
            let decoded = tick_to_price(tick).unwrap().value();
            let step = decoded * dec!(0.0001);
            assert!(
                (decoded - price).abs() <= step,
                "price {price} decoded {decoded} tick {tick}"
            );
        }
    }

    #[test]
    fn encode_decode_is_stable() {
        for tick in [-50_000, -1, 0, 1, 777, 50_000] {
            let price = tick_to_price(tick).unwrap().value();
            assert_eq!(price_to_tick(price).unwrap(), tick);
        }
    }

    #[test]
    fn non_positive_price_rejected() {
        assert!(matches!(
            price_to_tick(dec!(0)),
            Err(StateError::NonPositivePrice(_))
        ));
        assert!(matches!(
            price_to_tick(dec!(-3)),
            Err(StateError::NonPositivePrice(_))
        ));
    }

    #[test]
    fn out_of_range_tick_rejected() {
        assert!(matches!(
            tick_to_price(i32::MAX),
            Err(StateError::TickOutOfRange(_))
        ));
    }
}
