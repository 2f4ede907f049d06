//! Oracle feed boundary.
//!
//! The engine never fetches prices itself; callers pass a fully-formed
//! [`OracleReading`] into every query. Readings carry two TWAP windows: a
//! short micro window used for volume decay and front-run protection, and a
//! longer macro window used for drift bounds. `MockFeed` stands in for the
//! external feed in tests and the sim binary.

use crate::types::{Price, Timestamp};
use rust_decimal::Decimal;
use rust_decimal_macros::dec;
use serde::{Deserialize, Serialize};

/// Point-in-time oracle data. Read-only input to every engine query.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct OracleReading {
    pub timestamp: Timestamp,
    /// Short averaging window in seconds.
    pub micro_window: i64,
    /// Long averaging window in seconds.
    pub macro_window: i64,
    pub price_micro: Price,
    pub price_macro: Price,
    /// Quote-denominated liquidity over the micro window, if the feed has it.
    pub reserve_micro: Decimal,
    pub reserve_macro: Decimal,
    pub has_reserve: bool,
}

impl OracleReading {
    /// Mid price: average of the two window prices.
    pub fn mid(&self) -> Price {
        let hi = self.price_micro.value().max(self.price_macro.value());
        let lo = self.price_micro.value().min(self.price_macro.value());
        Price::new_unchecked((hi + lo) / dec!(2))
    }

    /// Lower of the two window prices; base for the bid.
    pub fn price_floor(&self) -> Price {
        Price::new_unchecked(self.price_micro.value().min(self.price_macro.value()))
    }

    /// Higher of the two window prices; base for the ask.
    pub fn price_ceiling(&self) -> Price {
        Price::new_unchecked(self.price_micro.value().max(self.price_macro.value()))
    }
}

/// Settable feed for tests and simulation. Real deployments adapt a TWAP
/// oracle behind the same `latest` shape.
#[derive(Debug, Clone)]
pub struct MockFeed {
    pub micro_window: i64,
    pub macro_window: i64,
    pub price: Price,
    pub reserve: Decimal,
    pub has_reserve: bool,
}

impl MockFeed {
    pub fn new(price: Price, reserve: Decimal) -> Self {
        Self {
            micro_window: 600,
            macro_window: 3600,
            price,
            reserve,
            has_reserve: true,
        }
    }

    /// Feed with no reserve information (cap bounds fall back to the
    /// configured notional cap).
    pub fn without_reserve(price: Price) -> Self {
        Self {
            micro_window: 600,
            macro_window: 3600,
            price,
            reserve: Decimal::ZERO,
            has_reserve: false,
        }
    }

    pub fn set_price(&mut self, price: Price) {
        self.price = price;
    }

    pub fn latest(&self, now: Timestamp) -> OracleReading {
        OracleReading {
            timestamp: now,
            micro_window: self.micro_window,
            macro_window: self.macro_window,
            price_micro: self.price,
            price_macro: self.price,
            reserve_micro: self.reserve,
            reserve_macro: self.reserve,
            has_reserve: self.has_reserve,
        }
    }
}
