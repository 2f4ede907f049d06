//! Exposed read API.
//!
//! `StateView` binds one market's stored risk state, its governance
//! parameters and a point-in-time oracle reading to an explicit `now`, then
//! answers every query by pure projection. Nothing here mutates: the same
//! view asked the same question twice gives the same answer, and the
//! writer-path helpers on [`MarketRiskState`](crate::market::MarketRiskState)
//! run the identical arithmetic before persisting.

use crate::capacity;
use crate::error::StateError;
use crate::funding;
use crate::ledger::PositionLedger;
use crate::market::{MarketRiskState, RiskParams};
use crate::oracle::OracleReading;
use crate::position::{EntryPrice, Position};
use crate::pricing;
use crate::tick;
use crate::types::{AccountId, FeedId, MarketId, PositionId, Price, Timestamp};
use crate::valuation;
use rust_decimal::Decimal;
use std::collections::HashMap;

/// Feed-to-market lookup. Registration happens on market deployment.
#[derive(Debug, Default, Clone)]
pub struct MarketRegistry {
    markets: HashMap<FeedId, MarketId>,
}

impl MarketRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn register(&mut self, feed: FeedId, market: MarketId) {
        self.markets.insert(feed, market);
    }

    pub fn market_for_feed(&self, feed: FeedId) -> Result<MarketId, StateError> {
        self.markets
            .get(&feed)
            .copied()
            .ok_or(StateError::UnknownMarket(feed))
    }
}

/// One-call aggregate snapshot of a market's live risk numbers.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct MarketState {
    pub bid: Price,
    pub ask: Price,
    pub mid: Price,
    pub volume_bid: Decimal,
    pub volume_ask: Decimal,
    pub oi_long: Decimal,
    pub oi_short: Decimal,
    pub cap_oi: Decimal,
    pub circuit_breaker_level: Decimal,
    pub funding_rate: Decimal,
}

/// Read-only view over `(stored state, params, oracle reading, now)`.
#[derive(Debug, Clone, Copy)]
pub struct StateView<'a> {
    pub market: &'a MarketRiskState,
    pub params: &'a RiskParams,
    pub data: &'a OracleReading,
    pub now: Timestamp,
}

impl<'a> StateView<'a> {
    pub fn new(
        market: &'a MarketRiskState,
        params: &'a RiskParams,
        data: &'a OracleReading,
        now: Timestamp,
    ) -> Self {
        Self {
            market,
            params,
            data,
            now,
        }
    }

    // ---- aggregates --------------------------------------------------

    /// Long and short open interest projected through funding to `now`.
    pub fn ois(&self) -> (Decimal, Decimal) {
        self.market.projected_ois(self.now, self.params.k)
    }

    /// Instantaneous funding rate at the projected open interest.
    /// Positive means longs pay shorts.
    pub fn funding_rate(&self) -> Decimal {
        let (long, short) = self.ois();
        funding::funding_rate(long, short, self.params.k)
    }

    /// Live minted-supply accumulator driving the circuit breaker.
    pub fn minted(&self) -> Result<Decimal, StateError> {
        self.market.snapshot_minted.peek(self.now)
    }

    /// OI cap after liquidity bounds. The circuit breaker is reported
    /// separately through [`Self::circuit_breaker_level`]; the writer
    /// applies it when gating new builds.
    pub fn cap_oi(&self) -> Decimal {
        capacity::cap_oi(self.data, self.params)
    }

    /// Fraction of the bounds-adjusted OI cap that `oi` represents; the
    /// max-value sentinel when the cap is zero.
    pub fn fraction_of_cap_oi(&self, oi: Decimal) -> Decimal {
        capacity::fraction_of_cap_oi(oi, self.cap_oi())
    }

    /// Circuit-breaker throttle on a unit scale: 1 fully open, 0 floored.
    pub fn circuit_breaker_level(&self) -> Result<Decimal, StateError> {
        Ok(capacity::circuit_breaker_level(
            self.minted()?,
            self.params.circuit_breaker_mint_target,
        ))
    }

    // ---- volumes and quotes ------------------------------------------

    /// Bid-side volume accumulator as if a trade of `fraction` (of cap OI)
    /// landed at `now`. Zero fraction gives the live decayed value. The
    /// sentinel fraction from a zero cap saturates at the impact cutoff
    /// before it touches the accumulator arithmetic.
    pub fn volume_bid(&self, fraction: Decimal) -> Result<Decimal, StateError> {
        let snap = self.market.snapshot_volume_bid.transform(
            self.now,
            Decimal::from(self.data.micro_window),
            fraction.min(pricing::IMPACT_VOLUME_CUTOFF),
        )?;
        Ok(snap.accumulator)
    }

    /// Ask-side counterpart of [`Self::volume_bid`].
    pub fn volume_ask(&self, fraction: Decimal) -> Result<Decimal, StateError> {
        let snap = self.market.snapshot_volume_ask.transform(
            self.now,
            Decimal::from(self.data.micro_window),
            fraction.min(pricing::IMPACT_VOLUME_CUTOFF),
        )?;
        Ok(snap.accumulator)
    }

    /// Live decayed volume accumulators, bid then ask.
    pub fn volumes(&self) -> Result<(Decimal, Decimal), StateError> {
        Ok((self.volume_bid(Decimal::ZERO)?, self.volume_ask(Decimal::ZERO)?))
    }

    /// Executable bid after a hypothetical `fraction` of cap OI sells.
    pub fn bid(&self, fraction: Decimal) -> Result<Price, StateError> {
        Ok(pricing::bid(self.data, self.params, self.volume_bid(fraction)?))
    }

    /// Executable ask after a hypothetical `fraction` of cap OI buys.
    pub fn ask(&self, fraction: Decimal) -> Result<Price, StateError> {
        Ok(pricing::ask(self.data, self.params, self.volume_ask(fraction)?))
    }

    pub fn mid(&self) -> Price {
        pricing::mid(self.data)
    }

    /// Resting quotes: `(bid, ask, mid)` at zero hypothetical fraction.
    pub fn prices(&self) -> Result<(Price, Price, Price), StateError> {
        Ok((self.bid(Decimal::ZERO)?, self.ask(Decimal::ZERO)?, self.mid()))
    }

    /// Everything a market dashboard needs in one projection.
    pub fn market_state(&self) -> Result<MarketState, StateError> {
        let (oi_long, oi_short) = self.ois();
        let (volume_bid, volume_ask) = self.volumes()?;
        Ok(MarketState {
            bid: self.bid(Decimal::ZERO)?,
            ask: self.ask(Decimal::ZERO)?,
            mid: self.mid(),
            volume_bid,
            volume_ask,
            oi_long,
            oi_short,
            cap_oi: self.cap_oi(),
            circuit_breaker_level: self.circuit_breaker_level()?,
            funding_rate: self.funding_rate(),
        })
    }

    // ---- per-position queries ----------------------------------------

    /// Stored position record, straight from the ledger.
    pub fn position<'l>(
        &self,
        ledger: &'l impl PositionLedger,
        market: MarketId,
        owner: AccountId,
        id: PositionId,
    ) -> Option<&'l Position> {
        ledger.position_of(market, owner, id)
    }

    /// Live open interest of a position: its proportional share of the
    /// funding-projected side total.
    pub fn position_oi(&self, pos: &Position, ledger: &impl PositionLedger, market: MarketId) -> Decimal {
        let (long, short) = self.ois();
        let side = pos.side();
        let side_total = match side {
            crate::types::Side::Long => long,
            crate::types::Side::Short => short,
        };
        valuation::position_oi(pos, side_total, ledger.oi_shares_on_side(market, side))
    }

    pub fn debt(&self, pos: &Position) -> Decimal {
        pos.debt_current()
    }

    pub fn cost(&self, pos: &Position) -> Decimal {
        pos.cost()
    }

    pub fn collateral(
        &self,
        pos: &Position,
        ledger: &impl PositionLedger,
        market: MarketId,
    ) -> Decimal {
        valuation::collateral(pos, self.position_oi(pos, ledger, market))
    }

    /// Mark-to-exit value at the side's close-out quote: longs sell into
    /// the bid, shorts buy back at the ask, each moved by the position's
    /// own fraction of the cap.
    pub fn value(
        &self,
        pos: &Position,
        ledger: &impl PositionLedger,
        market: MarketId,
    ) -> Result<Decimal, StateError> {
        let oi = self.position_oi(pos, ledger, market);
        let fraction = self.fraction_of_cap_oi(oi);
        let exit = if pos.is_long {
            self.bid(fraction)?
        } else {
            self.ask(fraction)?
        };
        Ok(valuation::value(
            pos,
            oi,
            pos.entry_price()?,
            exit,
            self.params.cap_payoff,
        ))
    }

    pub fn notional(
        &self,
        pos: &Position,
        ledger: &impl PositionLedger,
        market: MarketId,
    ) -> Result<Decimal, StateError> {
        Ok(valuation::notional(
            self.value(pos, ledger, market)?,
            pos.debt_current(),
        ))
    }

    /// Fee charged on closing the position at its live notional.
    pub fn trading_fee(
        &self,
        pos: &Position,
        ledger: &impl PositionLedger,
        market: MarketId,
    ) -> Result<Decimal, StateError> {
        Ok(valuation::trading_fee(
            self.notional(pos, ledger, market)?,
            self.params.trading_fee_rate,
        ))
    }

    pub fn maintenance_margin(&self, pos: &Position) -> Decimal {
        valuation::maintenance_margin(pos, self.params.maintenance_margin_fraction)
    }

    /// Value at the manipulation-resistant mid; the base for every
    /// liquidation check.
    fn value_at_mid(
        &self,
        pos: &Position,
        ledger: &impl PositionLedger,
        market: MarketId,
    ) -> Result<Decimal, StateError> {
        Ok(valuation::value(
            pos,
            self.position_oi(pos, ledger, market),
            pos.entry_price()?,
            self.mid(),
            self.params.cap_payoff,
        ))
    }

    pub fn liquidation_fee(
        &self,
        pos: &Position,
        ledger: &impl PositionLedger,
        market: MarketId,
    ) -> Result<Decimal, StateError> {
        Ok(valuation::liquidation_fee(
            self.value_at_mid(pos, ledger, market)?,
            self.params.liquidation_fee_rate,
        ))
    }

    pub fn liquidation_price(
        &self,
        pos: &Position,
        ledger: &impl PositionLedger,
        market: MarketId,
    ) -> Result<Decimal, StateError> {
        valuation::liquidation_price(
            pos,
            self.position_oi(pos, ledger, market),
            pos.entry_price()?,
            self.maintenance_margin(pos),
            self.params.liquidation_fee_rate,
        )
    }

    pub fn liquidatable(
        &self,
        pos: &Position,
        ledger: &impl PositionLedger,
        market: MarketId,
    ) -> Result<bool, StateError> {
        let value = self.value_at_mid(pos, ledger, market)?;
        Ok(valuation::liquidatable(
            pos,
            value,
            self.maintenance_margin(pos),
            valuation::liquidation_fee(value, self.params.liquidation_fee_rate),
        ))
    }

    pub fn margin_excess_before_liquidation(
        &self,
        pos: &Position,
        ledger: &impl PositionLedger,
        market: MarketId,
    ) -> Result<Decimal, StateError> {
        let value = self.value_at_mid(pos, ledger, market)?;
        Ok(valuation::margin_excess_before_liquidation(
            value,
            self.maintenance_margin(pos),
            valuation::liquidation_fee(value, self.params.liquidation_fee_rate),
        ))
    }

    // ---- trade estimation --------------------------------------------
    // what-if previews for a build that has not happened. no input
    // validation: callers screen collateral and leverage against
    // `min_collateral` and `cap_leverage` before committing.

    /// The position a build of `collateral` at `leverage` would create,
    /// entered at the impact-adjusted quote for its own size.
    pub fn position_estimate(
        &self,
        collateral: Decimal,
        leverage: Decimal,
        is_long: bool,
    ) -> Result<Position, StateError> {
        let notional = collateral * leverage;
        let oi = notional / self.mid().value();
        let fraction = self.fraction_of_cap_oi(oi);
        // buys lift the ask, sells hit the bid
        let entry = if is_long {
            self.ask(fraction)?
        } else {
            self.bid(fraction)?
        };
        Ok(Position {
            notional_initial: notional,
            debt: notional - collateral,
            entry: EntryPrice::Tick(tick::price_to_tick(entry.value())?),
            is_long,
            liquidated: false,
            oi_shares: oi,
            fraction_remaining: Decimal::ONE,
        })
    }

    pub fn debt_estimate(&self, collateral: Decimal, leverage: Decimal) -> Decimal {
        collateral * (leverage - Decimal::ONE)
    }

    /// Cost equals collateral paid in.
    pub fn cost_estimate(&self, collateral: Decimal) -> Decimal {
        collateral
    }

    pub fn oi_estimate(&self, collateral: Decimal, leverage: Decimal) -> Decimal {
        collateral * leverage / self.mid().value()
    }

    pub fn maintenance_margin_estimate(&self, collateral: Decimal, leverage: Decimal) -> Decimal {
        self.params.maintenance_margin_fraction * collateral * leverage
    }

    /// Liquidation price the build would start with. At entry the
    /// position's OI equals its shares, so no ledger is needed.
    pub fn liquidation_price_estimate(
        &self,
        collateral: Decimal,
        leverage: Decimal,
        is_long: bool,
    ) -> Result<Decimal, StateError> {
        let pos = self.position_estimate(collateral, leverage, is_long)?;
        valuation::liquidation_price(
            &pos,
            pos.oi_shares,
            pos.entry_price()?,
            valuation::maintenance_margin(&pos, self.params.maintenance_margin_fraction),
            self.params.liquidation_fee_rate,
        )
    }
}
