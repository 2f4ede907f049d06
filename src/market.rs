//! Per-market risk parameters and persisted risk state.
//!
//! `RiskParams` holds the governance-set constants; they change only through
//! the external governance path and are immutable between updates.
//! `MarketRiskState` is the canonical stored state one market carries:
//! aggregate open interest, the last-update stamp, and the three decaying
//! snapshots. It is an explicit value passed into both call paths, never
//! ambient state, so multiple markets simulate independently.

use crate::error::StateError;
use crate::funding::oi_after_funding;
use crate::snapshot::Snapshot;
use crate::types::Timestamp;
use rust_decimal::Decimal;
use rust_decimal_macros::dec;
use serde::{Deserialize, Serialize};

/// Governance risk parameters, one set per market.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RiskParams {
    /// Funding constant (per second).
    pub k: Decimal,
    /// Price-impact magnitude.
    pub lambda: Decimal,
    /// Static half-spread applied to both bid and ask.
    pub delta: Decimal,
    /// Maximum payoff multiple on a long position.
    pub cap_payoff: Decimal,
    /// Maximum notional the market accepts before bounds adjustment.
    pub cap_notional: Decimal,
    /// Maximum leverage a position may be built with.
    pub cap_leverage: Decimal,
    /// Circuit-breaker lookback in seconds.
    pub circuit_breaker_window: Decimal,
    /// Minted supply over the window at which capacity hits its floor.
    pub circuit_breaker_mint_target: Decimal,
    /// Fraction of entry notional kept as maintenance margin.
    pub maintenance_margin_fraction: Decimal,
    /// Fraction of maintenance margin burned on liquidation.
    pub maintenance_margin_burn_rate: Decimal,
    pub liquidation_fee_rate: Decimal,
    pub trading_fee_rate: Decimal,
    /// Smallest collateral accepted on build.
    pub min_collateral: Decimal,
    /// Upper bound on oracle price drift (per second).
    pub price_drift_upper_limit: Decimal,
    /// Chain block time in seconds, used by the back-run capacity bound.
    pub average_block_time: Decimal,
}

impl Default for RiskParams {
    fn default() -> Self {
        // canonical deployment values
        Self {
            k: dec!(0.00000122),
            lambda: dec!(0.5),
            delta: dec!(0.0025),
            cap_payoff: dec!(5),
            cap_notional: dec!(800_000),
            cap_leverage: dec!(5),
            circuit_breaker_window: dec!(2_592_000),
            circuit_breaker_mint_target: dec!(66_670),
            maintenance_margin_fraction: dec!(0.1),
            maintenance_margin_burn_rate: dec!(0.1),
            liquidation_fee_rate: dec!(0.05),
            trading_fee_rate: dec!(0.00075),
            min_collateral: dec!(0.0001),
            price_drift_upper_limit: dec!(0.000025),
            average_block_time: dec!(14),
        }
    }
}

/// Canonical stored risk state for one market. Written only by the trade
/// path; projected (never mutated) by every read query.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MarketRiskState {
    pub oi_long: Decimal,
    pub oi_short: Decimal,
    pub timestamp_update_last: Timestamp,
    pub snapshot_volume_bid: Snapshot,
    pub snapshot_volume_ask: Snapshot,
    pub snapshot_minted: Snapshot,
}

impl MarketRiskState {
    /// Zero state at market deployment.
    pub fn new(deployed_at: Timestamp) -> Self {
        Self {
            oi_long: Decimal::ZERO,
            oi_short: Decimal::ZERO,
            timestamp_update_last: deployed_at,
            snapshot_volume_bid: Snapshot::empty(deployed_at),
            snapshot_volume_ask: Snapshot::empty(deployed_at),
            snapshot_minted: Snapshot::empty(deployed_at),
        }
    }

    /// Open interest projected to `now` without touching stored state.
    pub fn projected_ois(&self, now: Timestamp, k: Decimal) -> (Decimal, Decimal) {
        oi_after_funding(
            self.oi_long,
            self.oi_short,
            self.timestamp_update_last,
            now,
            k,
        )
    }

    // ---- writer-path transitions -------------------------------------
    // the external trade path applies these before persisting. they run the
    // exact projection functions the read path uses; a divergence between
    // the two is an exploitable pricing inconsistency.

    /// Settle funding into stored OI up to `now`.
    pub fn settle_funding(&mut self, now: Timestamp, k: Decimal) {
        let (long, short) = self.projected_ois(now, k);
        self.oi_long = long;
        self.oi_short = short;
        if now > self.timestamp_update_last {
            self.timestamp_update_last = now;
        }
    }

    /// Fold a bid-side trade volume (fraction of cap OI) into the bid
    /// snapshot. Returns the new accumulator value, which prices the trade.
    pub fn record_volume_bid(
        &mut self,
        now: Timestamp,
        micro_window: Decimal,
        volume: Decimal,
    ) -> Result<Decimal, StateError> {
        self.snapshot_volume_bid = self
            .snapshot_volume_bid
            .transform(now, micro_window, volume)?;
        Ok(self.snapshot_volume_bid.accumulator)
    }

    /// Ask-side counterpart of [`Self::record_volume_bid`].
    pub fn record_volume_ask(
        &mut self,
        now: Timestamp,
        micro_window: Decimal,
        volume: Decimal,
    ) -> Result<Decimal, StateError> {
        self.snapshot_volume_ask = self
            .snapshot_volume_ask
            .transform(now, micro_window, volume)?;
        Ok(self.snapshot_volume_ask.accumulator)
    }

    /// Track protocol-side minted (positive) or burned (negative) supply
    /// for the circuit breaker.
    pub fn record_mint(
        &mut self,
        now: Timestamp,
        circuit_breaker_window: Decimal,
        minted: Decimal,
    ) -> Result<Decimal, StateError> {
        self.snapshot_minted = self
            .snapshot_minted
            .transform(now, circuit_breaker_window, minted)?;
        Ok(self.snapshot_minted.accumulator)
    }
}
