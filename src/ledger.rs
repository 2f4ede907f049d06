//! Position ledger boundary.
//!
//! The ledger is owned by the external mutating path; the engine only reads
//! position records and the per-side share totals they divide. The trait is
//! the seam; `InMemoryLedger` is the stand-in used by tests and the sim
//! binary.

use crate::position::Position;
use crate::types::{AccountId, MarketId, PositionId, Side};
use rust_decimal::Decimal;
use std::collections::HashMap;

pub trait PositionLedger {
    fn position_of(
        &self,
        market: MarketId,
        owner: AccountId,
        id: PositionId,
    ) -> Option<&Position>;

    /// Total long-side OI shares outstanding on a market.
    fn oi_long_shares(&self, market: MarketId) -> Decimal;

    fn oi_short_shares(&self, market: MarketId) -> Decimal;

    fn oi_shares_on_side(&self, market: MarketId, side: Side) -> Decimal {
        match side {
            Side::Long => self.oi_long_shares(market),
            Side::Short => self.oi_short_shares(market),
        }
    }
}

#[derive(Debug, Default, Clone)]
pub struct InMemoryLedger {
    positions: HashMap<(MarketId, AccountId, PositionId), Position>,
    long_shares: HashMap<MarketId, Decimal>,
    short_shares: HashMap<MarketId, Decimal>,
    next_id: u64,
}

impl InMemoryLedger {
    pub fn new() -> Self {
        Self::default()
    }

    /// Record a freshly built position and bump the side's share total,
    /// the way the external build path would.
    pub fn insert(&mut self, market: MarketId, owner: AccountId, pos: Position) -> PositionId {
        let id = PositionId(self.next_id);
        self.next_id += 1;

        let shares = match pos.side() {
            Side::Long => self.long_shares.entry(market).or_default(),
            Side::Short => self.short_shares.entry(market).or_default(),
        };
        *shares += pos.oi_shares_current();

        self.positions.insert((market, owner, id), pos);
        id
    }
}

impl PositionLedger for InMemoryLedger {
    fn position_of(
        &self,
        market: MarketId,
        owner: AccountId,
        id: PositionId,
    ) -> Option<&Position> {
        self.positions.get(&(market, owner, id))
    }

    fn oi_long_shares(&self, market: MarketId) -> Decimal {
        self.long_shares.get(&market).copied().unwrap_or_default()
    }

    fn oi_short_shares(&self, market: MarketId) -> Decimal {
        self.short_shares.get(&market).copied().unwrap_or_default()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::position::EntryPrice;
    use rust_decimal_macros::dec;

    fn pos(is_long: bool, shares: Decimal) -> Position {
        Position {
            notional_initial: shares,
            debt: Decimal::ZERO,
            entry: EntryPrice::Tick(0),
            is_long,
            liquidated: false,
            oi_shares: shares,
            fraction_remaining: dec!(1),
        }
    }

    #[test]
    fn insert_accumulates_side_share_totals() {
        let mut ledger = InMemoryLedger::new();
        let market = MarketId(1);
        let alice = AccountId(1);
        let bob = AccountId(2);

        let id_a = ledger.insert(market, alice, pos(true, dec!(20)));
        let id_b = ledger.insert(market, bob, pos(false, dec!(10)));

        assert_eq!(ledger.oi_long_shares(market), dec!(20));
        assert_eq!(ledger.oi_short_shares(market), dec!(10));
        assert_ne!(id_a, id_b);
        assert!(ledger.position_of(market, alice, id_a).is_some());
        assert!(ledger.position_of(market, alice, id_b).is_none());
    }

    #[test]
    fn unknown_market_has_zero_shares() {
        let ledger = InMemoryLedger::new();
        assert_eq!(ledger.oi_long_shares(MarketId(9)), dec!(0));
        assert_eq!(ledger.oi_shares_on_side(MarketId(9), Side::Short), dec!(0));
    }
}
