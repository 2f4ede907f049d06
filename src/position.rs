// stored position record. written by the external build/unwind/liquidate
// path; this engine only ever reads it. a position's live open interest is
// its share of the funding-decayed side total, so the record stores shares,
// not absolute OI.

use crate::error::StateError;
use crate::tick;
use crate::types::{Price, Side};
use rust_decimal::Decimal;
use rust_decimal_macros::dec;
use serde::{Deserialize, Serialize};

/// Compact entry-price encoding. Two historical variants of one concept;
/// `Tick` is the encoding produced for new positions, `MidRatio` survives
/// only for decoding records written by older deployments.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub enum EntryPrice {
    /// `price = 1.0001^tick`.
    Tick(i32),
    /// Entry/mid ratio at build time. The mid at entry is recoverable as
    /// `notional_initial / oi_shares`, so `entry = ratio * notional_initial
    /// / oi_shares`.
    MidRatio(Decimal),
}

impl EntryPrice {
    /// Decode the legacy 1e14-scaled wire value.
    pub fn from_raw_ratio(raw: u64) -> Self {
        EntryPrice::MidRatio(Decimal::from(raw) / dec!(100_000_000_000_000))
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Position {
    /// Notional at build: collateral * leverage.
    pub notional_initial: Decimal,
    /// Borrowed portion of the initial notional.
    pub debt: Decimal,
    pub entry: EntryPrice,
    pub is_long: bool,
    /// Terminally set by the external liquidation path.
    pub liquidated: bool,
    /// Share of the side's OI pool, fixed at build.
    pub oi_shares: Decimal,
    /// Portion of the original position still open; reduced by partial
    /// unwinds. 1 for an untouched position.
    pub fraction_remaining: Decimal,
}

impl Position {
    pub fn side(&self) -> Side {
        Side::from_is_long(self.is_long)
    }

    /// A position participates in valuation only while it has shares left
    /// and has not been liquidated.
    pub fn exists(&self) -> bool {
        !self.liquidated
            && self.oi_shares > Decimal::ZERO
            && self.fraction_remaining > Decimal::ZERO
    }

    pub fn notional_initial_current(&self) -> Decimal {
        self.notional_initial * self.fraction_remaining
    }

    pub fn debt_current(&self) -> Decimal {
        self.debt * self.fraction_remaining
    }

    pub fn oi_shares_current(&self) -> Decimal {
        self.oi_shares * self.fraction_remaining
    }

    /// What the holder paid in: initial notional minus debt, for the part
    /// still open.
    pub fn cost(&self) -> Decimal {
        (self.notional_initial - self.debt) * self.fraction_remaining
    }

    /// Decode the stored entry price.
    pub fn entry_price(&self) -> Result<Price, StateError> {
        match self.entry {
            EntryPrice::Tick(t) => tick::tick_to_price(t),
            EntryPrice::MidRatio(ratio) => {
                if self.oi_shares.is_zero() {
                    return Err(StateError::ZeroOpenInterest);
                }
                let entry = ratio * self.notional_initial / self.oi_shares;
                Price::new(entry).ok_or(StateError::NonPositivePrice(entry))
            }
        }
    }
}
