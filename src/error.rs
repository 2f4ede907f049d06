//! Error taxonomy for the read-side engine.
//!
//! Division-by-zero on aggregate open interest or capacity is deliberately
//! not an error: zero OI yields zero funding and zero projected OI, and a
//! zero cap yields the maximum-value sentinel from `fraction_of_cap_oi`.

use crate::types::{FeedId, Timestamp};
use rust_decimal::Decimal;

#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum StateError {
    /// Feed has no market registered against it. Surfaced, never retried.
    #[error("no market registered for feed {0:?}")]
    UnknownMarket(FeedId),

    /// Liquidation-price query on a position with no live open interest.
    #[error("position has zero open interest")]
    ZeroOpenInterest,

    /// Negative elapsed time handed to snapshot decay. Integration defect:
    /// the writer always stamps snapshots at or before `now`.
    #[error("snapshot at {last} projected to earlier time {now}")]
    TimeTravel { last: Timestamp, now: Timestamp },

    /// Tick codec fed a non-positive price.
    #[error("price {0} is not positive")]
    NonPositivePrice(Decimal),

    /// Tick outside the range representable by the fixed-point price type.
    #[error("tick {0} out of representable range")]
    TickOutOfRange(i32),
}
