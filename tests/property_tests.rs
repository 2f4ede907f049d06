//! Property-based tests for the projection math.
//!
//! These tests verify invariants hold under random inputs.

use proptest::prelude::*;
use rust_decimal::Decimal;
use rust_decimal_macros::dec;
use synth_state::*;

// Strategies for generating test data
fn price_strategy() -> impl Strategy<Value = Decimal> {
    (1i64..100_000_000i64).prop_map(|x| Decimal::new(x, 4)) // 0.0001 to 10,000
}

fn oi_strategy() -> impl Strategy<Value = Decimal> {
    (0i64..10_000_000i64).prop_map(|x| Decimal::new(x, 2)) // 0 to 100,000
}

fn volume_strategy() -> impl Strategy<Value = Decimal> {
    (0i64..50_000i64).prop_map(|x| Decimal::new(x, 4)) // 0 to 5 cap fractions
}

fn k_strategy() -> impl Strategy<Value = Decimal> {
    (1i64..1_000i64).prop_map(|x| Decimal::new(x, 8)) // 1e-8 to 1e-5 per second
}

fn reading(price: Decimal) -> OracleReading {
    OracleReading {
        timestamp: Timestamp::from_secs(0),
        micro_window: 600,
        macro_window: 3600,
        price_micro: Price::new_unchecked(price),
        price_macro: Price::new_unchecked(price),
        reserve_micro: dec!(2_000_000),
        reserve_macro: dec!(2_000_000),
        has_reserve: true,
    }
}

proptest! {
    /// Tick codec round-trips any positive price to within one tick.
    #[test]
    fn tick_round_trip_within_one_tick(price in price_strategy()) {
        let tick = price_to_tick(price).unwrap();
        let decoded = tick_to_price(tick).unwrap().value();
        let step = decoded * dec!(0.0001);
        prop_assert!((decoded - price).abs() <= step);
    }

    /// Decoding then re-encoding a tick is the identity.
    #[test]
    fn tick_encode_is_stable(tick in -80_000i32..80_000i32) {
        let price = tick_to_price(tick).unwrap().value();
        prop_assert_eq!(price_to_tick(price).unwrap(), tick);
    }

    /// Projecting a snapshot twice to the same instant changes nothing.
    #[test]
    fn snapshot_projection_idempotent(
        acc in -1_000_000i64..1_000_000i64,
        dt in 0i64..10_000i64,
    ) {
        let s = Snapshot {
            timestamp: Timestamp::from_secs(0),
            window: dec!(600),
            accumulator: Decimal::new(acc, 2),
        };
        let now = Timestamp::from_secs(dt);
        let once = s.transform(now, dec!(600), Decimal::ZERO).unwrap();
        let twice = once.transform(now, dec!(600), Decimal::ZERO).unwrap();
        prop_assert_eq!(once.accumulator, twice.accumulator);
    }

    /// Decay never grows the accumulator's magnitude and hits exact zero
    /// at or past the window.
    #[test]
    fn snapshot_decay_monotone(
        acc in 1i64..1_000_000i64,
        dt in 0i64..2_000i64,
    ) {
        let s = Snapshot {
            timestamp: Timestamp::from_secs(0),
            window: dec!(600),
            accumulator: Decimal::new(acc, 2),
        };
        let v = s.peek(Timestamp::from_secs(dt)).unwrap();
        prop_assert!(v >= Decimal::ZERO);
        prop_assert!(v <= s.accumulator);
        if dt >= 600 {
            prop_assert_eq!(v, Decimal::ZERO);
        }
    }

    /// Funding only ever removes open interest: both sides stay
    /// non-negative, the total never grows, the imbalance never widens.
    #[test]
    fn funding_conserves_and_shrinks(
        long in oi_strategy(),
        short in oi_strategy(),
        dt in 0i64..10_000_000i64,
        k in k_strategy(),
    ) {
        let (l, s) = oi_after_funding(long, short, Timestamp::from_secs(0), Timestamp::from_secs(dt), k);
        prop_assert!(l >= Decimal::ZERO);
        prop_assert!(s >= Decimal::ZERO);
        prop_assert!(l + s <= long + short + dec!(0.000001));
        prop_assert!((l - s).abs() <= (long - short).abs() + dec!(0.000001));
    }

    /// The funding rate's sign always tracks the imbalance.
    #[test]
    fn funding_rate_sign(
        long in oi_strategy(),
        short in oi_strategy(),
        k in k_strategy(),
    ) {
        let rate = funding_rate(long, short, k);
        if long > short {
            prop_assert!(rate > Decimal::ZERO);
        } else if short > long {
            prop_assert!(rate < Decimal::ZERO);
        } else {
            prop_assert_eq!(rate, Decimal::ZERO);
        }
    }

    /// Quotes always bracket the mid, whatever volume has accumulated.
    #[test]
    fn quotes_bracket_mid(
        price in price_strategy(),
        bid_volume in volume_strategy(),
        ask_volume in volume_strategy(),
    ) {
        let params = RiskParams::default();
        let data = reading(price);
        let b = bid(&data, &params, bid_volume);
        let a = ask(&data, &params, ask_volume);
        prop_assert!(b <= data.mid());
        prop_assert!(data.mid() <= a);
        prop_assert!(b.value() > Decimal::ZERO);
    }

    /// More volume never tightens a quote.
    #[test]
    fn impact_is_monotone(
        price in price_strategy(),
        volume in volume_strategy(),
        extra in 1i64..10_000i64,
    ) {
        let params = RiskParams::default();
        let data = reading(price);
        let more = volume + Decimal::new(extra, 4);
        prop_assert!(bid(&data, &params, more) <= bid(&data, &params, volume));
        prop_assert!(ask(&data, &params, more) >= ask(&data, &params, volume));
    }

    /// A zero cap reports the sentinel; a positive cap the plain ratio.
    #[test]
    fn cap_fraction_sentinel(oi in oi_strategy(), cap in oi_strategy()) {
        let fraction = fraction_of_cap_oi(oi, cap);
        if cap > Decimal::ZERO {
            prop_assert_eq!(fraction, oi / cap);
        } else {
            prop_assert_eq!(fraction, Decimal::MAX);
        }
    }

    /// The circuit breaker only ever shrinks capacity, down to zero.
    #[test]
    fn breaker_shrinks_cap(
        cap in oi_strategy(),
        minted in -1_000_000i64..10_000_000i64,
    ) {
        let target = dec!(66_670);
        let adjusted = cap_oi_adjusted_for_circuit_breaker(cap, Decimal::new(minted, 2), target);
        prop_assert!(adjusted >= Decimal::ZERO);
        prop_assert!(adjusted <= cap);
    }

    /// Marking a long at its own liquidation price lands its value on the
    /// maintenance threshold, so the liquidation flag flips right there.
    #[test]
    fn liquidation_price_is_the_boundary(
        collateral in 10i64..10_000i64,
        leverage in 2u32..5u32,
    ) {
        let collateral = Decimal::from(collateral);
        let leverage = Decimal::from(leverage);
        let params = RiskParams::default();

        let notional = collateral * leverage;
        let pos = Position {
            notional_initial: notional,
            debt: notional - collateral,
            entry: EntryPrice::Tick(0),
            is_long: true,
            liquidated: false,
            oi_shares: notional, // entry mid = 1
            fraction_remaining: Decimal::ONE,
        };
        let oi = pos.oi_shares;
        let entry = pos.entry_price().unwrap();
        let mm = maintenance_margin(&pos, params.maintenance_margin_fraction);
        let lp = liquidation_price(&pos, oi, entry, mm, params.liquidation_fee_rate).unwrap();
        prop_assert!(lp > Decimal::ZERO && lp < entry.value());

        let eps = dec!(0.000001);
        let v_above = value(&pos, oi, entry, Price::new_unchecked(lp + eps), params.cap_payoff);
        let v_below = value(&pos, oi, entry, Price::new_unchecked(lp - eps), params.cap_payoff);
        let fee_above = liquidation_fee(v_above, params.liquidation_fee_rate);
        let fee_below = liquidation_fee(v_below, params.liquidation_fee_rate);
        prop_assert!(!liquidatable(&pos, v_above, mm, fee_above));
        prop_assert!(liquidatable(&pos, v_below, mm, fee_below));
    }
}
