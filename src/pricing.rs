//! Executable bid/ask derivation.
//!
//! Quotes start from the oracle's two window prices and get pushed apart by
//! a static half-spread `delta` plus an impact term `lambda * volume`,
//! where `volume` is the decayed directional accumulator (fraction of cap
//! OI traded recently on that side). The bid leans on the lower window
//! price and shrinks, the ask on the higher and grows, so
//! `bid <= mid <= ask` holds for any accumulator state. Once the
//! accumulator decays to zero only the static spread remains.

use crate::funding::exp_clamped;
use crate::market::RiskParams;
use crate::oracle::OracleReading;
use crate::types::Price;
use rust_decimal::Decimal;
use rust_decimal_macros::dec;

// anything past this is already past the exponent clamp; keeps the
// sentinel fraction from a zero cap out of the multiplication.
pub(crate) const IMPACT_VOLUME_CUTOFF: Decimal = dec!(1_000_000);

fn impact(params: &RiskParams, volume: Decimal) -> Decimal {
    params.delta + params.lambda * volume.abs().min(IMPACT_VOLUME_CUTOFF)
}

/// Executable sell price against accumulated bid-side volume.
pub fn bid(data: &OracleReading, params: &RiskParams, volume: Decimal) -> Price {
    Price::new_unchecked(data.price_floor().value() * exp_clamped(-impact(params, volume)))
}

/// Executable buy price against accumulated ask-side volume.
pub fn ask(data: &OracleReading, params: &RiskParams, volume: Decimal) -> Price {
    Price::new_unchecked(data.price_ceiling().value() * exp_clamped(impact(params, volume)))
}

/// Oracle mid price; the manipulation-resistant reference used by
/// liquidation checks.
pub fn mid(data: &OracleReading) -> Price {
    data.mid()
}
