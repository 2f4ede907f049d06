//! Market capacity: notional/OI caps and the circuit breaker.
//!
//! The configured notional cap is first clamped by what the oracle's
//! underlying liquidity can safely support, then converted to an OI cap at
//! the mid price, then throttled by the circuit breaker when the protocol
//! has recently minted a burst of supply (a proxy for realized trader
//! profit pressure).

use crate::market::RiskParams;
use crate::oracle::OracleReading;
use rust_decimal::Decimal;
use rust_decimal_macros::dec;

/// Configured notional cap clamped by oracle liquidity bounds.
///
/// Two bounds apply when the feed reports reserves: a front-run bound
/// (`lambda * reserve_micro`, the notional whose own impact cost exceeds
/// what a front-runner could capture inside the micro window) and a
/// back-run bound (`2 * delta * reserve_macro * macro_window /
/// average_block_time`, the drift the macro window absorbs within the
/// static spread). Ample reserves leave the configured cap untouched.
pub fn cap_notional_adjusted_for_bounds(data: &OracleReading, params: &RiskParams) -> Decimal {
    let mut cap = params.cap_notional;
    if data.has_reserve {
        let front_run = params.lambda * data.reserve_micro;
        let back_run = dec!(2)
            * params.delta
            * data.reserve_macro
            * Decimal::from(data.macro_window)
            / params.average_block_time;
        cap = cap.min(front_run).min(back_run);
    }
    cap
}

/// Maximum open interest at current prices: adjusted cap notional divided
/// by the mid price.
pub fn cap_oi(data: &OracleReading, params: &RiskParams) -> Decimal {
    let cap_notional = cap_notional_adjusted_for_bounds(data, params);
    if cap_notional.is_zero() {
        return Decimal::ZERO;
    }
    cap_notional / data.mid().value()
}

/// Fraction of the OI cap that `oi` represents. A zero cap yields the
/// maximum-value sentinel: callers must treat it as "always over cap",
/// never as a number to do arithmetic on.
pub fn fraction_of_cap_oi(oi: Decimal, cap_oi: Decimal) -> Decimal {
    if cap_oi > Decimal::ZERO {
        oi / cap_oi
    } else {
        Decimal::MAX
    }
}

/// OI cap throttled by recent minted supply. Unchanged at zero minted,
/// scaled linearly down to a floor of zero at or beyond the mint target.
/// Burn-dominated (negative) accumulators leave the cap untouched.
pub fn cap_oi_adjusted_for_circuit_breaker(
    cap_oi: Decimal,
    minted: Decimal,
    mint_target: Decimal,
) -> Decimal {
    if minted <= Decimal::ZERO {
        return cap_oi;
    }
    if minted >= mint_target {
        return Decimal::ZERO;
    }
    // mint_target > minted > 0 here, so the ratio is a proper fraction
    cap_oi * (Decimal::ONE - minted / mint_target)
}

/// Diagnostic: the circuit-breaker adjustment applied to a one-unit cap.
/// 1 means fully open, 0 means capacity floored.
pub fn circuit_breaker_level(minted: Decimal, mint_target: Decimal) -> Decimal {
    cap_oi_adjusted_for_circuit_breaker(Decimal::ONE, minted, mint_target)
}
