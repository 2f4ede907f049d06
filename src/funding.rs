// funding drains the overweight side toward balance continuously instead of
// at discrete settlement times. aggregate long/short open interest is stored
// once at the last market update; everything since is derived by projecting
// the closed-form decay below. the trade path runs the same projection right
// before it applies a new trade's OI delta, so both paths land on identical
// numbers for identical `now`.
//
// with imb = L - S and tot = L + S over elapsed time dt:
//   tot' = tot * sqrt(1 - (imb/tot)^2 * (1 - e^{-4 k dt}))
//   imb' = imb * e^{-2 k dt}
// the smaller side is paid down and part of both sides burns; imbalance
// halves at rate 2k. the instantaneous rate 2k*imb/tot is the derivative of
// this decay, never a separately stored quantity.

use crate::types::Timestamp;
use rust_decimal::{Decimal, MathematicalOps};
use rust_decimal_macros::dec;

// beyond this the decaying exponential is zero to the unit in any quantity
// the engine handles.
const MAX_NATURAL_EXPONENT: Decimal = dec!(20);

/// `e^{-x}` for `x >= 0`, saturating to zero for large exponents.
pub(crate) fn exp_decay(x: Decimal) -> Decimal {
    debug_assert!(x >= Decimal::ZERO);
    if x > MAX_NATURAL_EXPONENT {
        return Decimal::ZERO;
    }
    (-x).exp()
}

/// `e^{x}` with the exponent clamped into the representable range on both
/// sides; never zero, never overflowing.
pub(crate) fn exp_clamped(x: Decimal) -> Decimal {
    x.clamp(-MAX_NATURAL_EXPONENT, MAX_NATURAL_EXPONENT).exp()
}

/// Aggregate open interest projected from the last stored update to `now`.
/// Returns the inputs unchanged when no time has passed (or `now` is behind
/// the stored timestamp, which the writer's monotone clock guarantees not to
/// outlast a block).
pub fn oi_after_funding(
    oi_long: Decimal,
    oi_short: Decimal,
    last_update: Timestamp,
    now: Timestamp,
    k: Decimal,
) -> (Decimal, Decimal) {
    let dt = last_update.elapsed_until(now);
    if dt <= 0 {
        return (oi_long, oi_short);
    }
    let dt = Decimal::from(dt);

    let tot = oi_long + oi_short;
    if tot.is_zero() {
        return (Decimal::ZERO, Decimal::ZERO);
    }
    let imb = oi_long - oi_short;

    let e2 = exp_decay(dec!(2) * k * dt);
    let e4 = exp_decay(dec!(4) * k * dt);

    let ratio = imb / tot;
    let under_root = Decimal::ONE - ratio * ratio * (Decimal::ONE - e4);
    let tot_decayed = tot * under_root.sqrt().unwrap_or(Decimal::ZERO);
    let imb_decayed = imb * e2;

    let long = (tot_decayed + imb_decayed) / dec!(2);
    let short = (tot_decayed - imb_decayed) / dec!(2);
    // |imb'| <= tot' holds analytically; the max guards decimal dust
    (long.max(Decimal::ZERO), short.max(Decimal::ZERO))
}

/// Instantaneous funding rate at already-decayed open interest. Positive
/// means longs pay shorts. Zero when the market is empty.
pub fn funding_rate(oi_long: Decimal, oi_short: Decimal, k: Decimal) -> Decimal {
    let tot = oi_long + oi_short;
    if tot.is_zero() {
        return Decimal::ZERO;
    }
    dec!(2) * k * (oi_long - oi_short) / tot
}
