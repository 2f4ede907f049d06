// synth-state: synthetic derivatives market state engine.
// read-side risk math only: every query is a pure projection of stored
// market state to an explicit `now`, with no external I/O.
//
// file map (search X.0 for structs, X.1+ for logic):
//   1.x  types.rs: primitives: MarketId, FeedId, Side, Price, Timestamp
//   2.x  snapshot.rs: time-decayed accumulator (volume, minted supply)
//   3.x  tick.rs: logarithmic tick codec for entry prices
//   4.x  funding.rs: continuous funding decay of open interest
//   5.x  capacity.rs: notional/OI caps, circuit breaker
//   6.x  pricing.rs: bid/ask/mid with volume impact
//   7.x  position.rs: stored position record, entry encodings
//   8.x  valuation.rs: collateral, value, margin, liquidation math
//   9.x  market.rs: risk params + persisted per-market risk state
//   10.x oracle.rs: oracle reading boundary (mocked feed)
//   11.x ledger.rs: position ledger boundary (mocked in-memory)
//   12.x state.rs: market registry + the exposed read API

// core risk modules
pub mod capacity;
pub mod funding;
pub mod market;
pub mod position;
pub mod pricing;
pub mod snapshot;
pub mod tick;
pub mod types;
pub mod valuation;

// integration modules
pub mod error;
pub mod ledger;
pub mod oracle;
pub mod state;

// re exports for convenience
pub use capacity::*;
pub use error::StateError;
pub use funding::{funding_rate, oi_after_funding};
pub use market::{MarketRiskState, RiskParams};
pub use position::{EntryPrice, Position};
pub use pricing::{ask, bid, mid};
pub use snapshot::Snapshot;
pub use state::{MarketRegistry, MarketState, StateView};
pub use tick::{price_to_tick, tick_to_price};
pub use types::*;
pub use valuation::*;
pub use ledger::{InMemoryLedger, PositionLedger};
pub use oracle::{MockFeed, OracleReading};
