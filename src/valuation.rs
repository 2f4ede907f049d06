//! Position valuation and liquidation math.
//!
//! Everything here is a pure function of a stored position record plus the
//! live (already funding-decayed) aggregates. Exit prices come in two
//! flavors: the slippage-adjusted bid/ask for close-out valuation, and the
//! raw mid for liquidation checks so a trader cannot trigger or dodge their
//! own liquidation through self-inflicted impact.

use crate::error::StateError;
use crate::position::Position;
use crate::types::Price;
use rust_decimal::Decimal;

/// Live open interest of one position: its proportional share of the
/// funding-decayed side total. Zero when the side pool is empty.
pub fn position_oi(
    pos: &Position,
    oi_side_total: Decimal,
    oi_side_shares_total: Decimal,
) -> Decimal {
    if !pos.exists() || oi_side_shares_total.is_zero() {
        return Decimal::ZERO;
    }
    oi_side_total * pos.oi_shares_current() / oi_side_shares_total
}

/// Collateral backing the position at its live OI:
/// `N0 * (OI(t) / OI0) - D`. Funding paid shrinks it below the build-time
/// collateral; funding received grows it.
pub fn collateral(pos: &Position, oi: Decimal) -> Decimal {
    let shares = pos.oi_shares_current();
    if shares.is_zero() {
        return Decimal::ZERO;
    }
    pos.notional_initial_current() * (oi / shares) - pos.debt_current()
}

/// Mark-to-exit value: collateral plus the signed price move on the live
/// OI. Long upside is capped at `cap_payoff` times the entry move.
pub fn value(
    pos: &Position,
    oi: Decimal,
    entry_price: Price,
    exit_price: Price,
    cap_payoff: Decimal,
) -> Decimal {
    let entry = entry_price.value();
    let mut exit = exit_price.value();
    if pos.is_long {
        exit = exit.min(entry * (Decimal::ONE + cap_payoff));
    }
    let pnl = oi * (exit - entry) * pos.side().sign();
    collateral(pos, oi) + pnl
}

/// Live notional: value plus outstanding debt.
pub fn notional(value: Decimal, debt: Decimal) -> Decimal {
    value + debt
}

pub fn trading_fee(notional: Decimal, trading_fee_rate: Decimal) -> Decimal {
    trading_fee_rate * notional
}

/// Maintenance margin is fixed against entry notional, not live notional,
/// so it cannot be gamed by the same price move that threatens the
/// position.
pub fn maintenance_margin(pos: &Position, maintenance_margin_fraction: Decimal) -> Decimal {
    maintenance_margin_fraction * pos.notional_initial_current()
}

/// Fee the liquidator collects, charged on the mid-exit value. A worthless
/// position pays no fee.
pub fn liquidation_fee(value_at_mid: Decimal, liquidation_fee_rate: Decimal) -> Decimal {
    liquidation_fee_rate * value_at_mid.max(Decimal::ZERO)
}

/// Exit price at which the position's value decays to exactly the
/// maintenance requirement grossed up by the liquidation fee:
/// `dp = (collateral - mm / (1 - fee_rate)) / oi`, below entry for longs,
/// above for shorts. A non-positive result for a long means no price can
/// liquidate it. Errors with `ZeroOpenInterest` when the position has no
/// live size.
pub fn liquidation_price(
    pos: &Position,
    oi: Decimal,
    entry_price: Price,
    maintenance_margin: Decimal,
    liquidation_fee_rate: Decimal,
) -> Result<Decimal, StateError> {
    if oi.is_zero() {
        return Err(StateError::ZeroOpenInterest);
    }
    let gross_margin = maintenance_margin / (Decimal::ONE - liquidation_fee_rate);
    let dp = (collateral(pos, oi) - gross_margin) / oi;
    let entry = entry_price.value();
    Ok(if pos.is_long { entry - dp } else { entry + dp })
}

/// Liquidation trigger, evaluated at mid exit.
pub fn liquidatable(
    pos: &Position,
    value_at_mid: Decimal,
    maintenance_margin: Decimal,
    liquidation_fee: Decimal,
) -> bool {
    pos.exists() && value_at_mid < maintenance_margin + liquidation_fee
}

/// Margin left above the liquidation threshold, clamping value at zero so
/// the report never implies negative remaining worth.
pub fn margin_excess_before_liquidation(
    value_at_mid: Decimal,
    maintenance_margin: Decimal,
    liquidation_fee: Decimal,
) -> Decimal {
    value_at_mid.max(Decimal::ZERO) - maintenance_margin - liquidation_fee
}
