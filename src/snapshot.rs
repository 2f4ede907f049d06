// time-decayed running accumulator. one primitive, two uses: directional
// trade volume (signed, decays over the oracle micro window) and protocol
// mint tracking for the circuit breaker (non-negative, decays over the
// configured breaker window).
//
// deliberately a pure value type: the mutating path persists the result of
// `transform`, the read path projects with it and throws the result away.
// both must run the exact same arithmetic or pricing diverges between them.

use crate::error::StateError;
use crate::types::Timestamp;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Snapshot {
    pub timestamp: Timestamp,
    /// Rolling window in seconds over which the accumulator decays to zero.
    pub window: Decimal,
    /// Signed running total.
    pub accumulator: Decimal,
}

impl Snapshot {
    /// Zero state at market deployment.
    pub fn empty(timestamp: Timestamp) -> Self {
        Self {
            timestamp,
            window: Decimal::ZERO,
            accumulator: Decimal::ZERO,
        }
    }

    /// Project this snapshot to `now`, folding in a new contribution of
    /// `add_value` carrying its own `add_window`. Pure; the input is left
    /// untouched.
    ///
    /// Decay is linear over the stored window. The new window is the
    /// magnitude-weighted average of old and new, so whichever contribution
    /// dominates sets how fast the next decay erases it.
    pub fn transform(
        &self,
        now: Timestamp,
        add_window: Decimal,
        add_value: Decimal,
    ) -> Result<Snapshot, StateError> {
        let dt = self.timestamp.elapsed_until(now);
        if dt < 0 {
            return Err(StateError::TimeTravel {
                last: self.timestamp,
                now,
            });
        }
        let dt = Decimal::from(dt);

        let decayed = if self.window.is_zero() || dt > self.window {
            Decimal::ZERO
        } else {
            self.accumulator - self.accumulator * dt / self.window
        };

        let accumulator = decayed + add_value;

        let window = if accumulator.is_zero() {
            add_window
        } else {
            let w1 = decayed.abs();
            let w2 = add_value.abs();
            (w1 * self.window + w2 * add_window) / (w1 + w2)
        };

        Ok(Snapshot {
            timestamp: now,
            window,
            accumulator,
        })
    }

    /// Live accumulator value at `now`: decay with no new contribution.
    /// Never persisted by the read path.
    pub fn peek(&self, now: Timestamp) -> Result<Decimal, StateError> {
        Ok(self.transform(now, self.window, Decimal::ZERO)?.accumulator)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;

    fn snap(ts: i64, window: Decimal, acc: Decimal) -> Snapshot {
        Snapshot {
            timestamp: Timestamp::from_secs(ts),
            window,
            accumulator: acc,
        }
    }

    #[test]
    fn empty_snapshot_stays_zero() {
        let s = Snapshot::empty(Timestamp::from_secs(0));
        let out = s.transform(Timestamp::from_secs(0), dec!(600), dec!(0)).unwrap();
        assert_eq!(out.accumulator, dec!(0));
        assert_eq!(out.window, dec!(600)); // zero accumulator adopts the new window
    }

    #[test]
    fn linear_decay_halfway() {
        let s = snap(0, dec!(600), dec!(10));
        let v = s.peek(Timestamp::from_secs(300)).unwrap();
        assert_eq!(v, dec!(5));
    }

    #[test]
    fn decay_reaches_zero_at_window_edge() {
        let s = snap(0, dec!(600), dec!(10));
        assert_eq!(s.peek(Timestamp::from_secs(600)).unwrap(), dec!(0));
        assert_eq!(s.peek(Timestamp::from_secs(601)).unwrap(), dec!(0));
        assert_eq!(s.peek(Timestamp::from_secs(1_000_000)).unwrap(), dec!(0));
    }

    #[test]
    fn negative_accumulator_decays_toward_zero() {
        let s = snap(0, dec!(600), dec!(-10));
        let v = s.peek(Timestamp::from_secs(150)).unwrap();
        assert_eq!(v, dec!(-7.5));
    }

    #[test]
    fn repeated_projection_is_idempotent() {
        let s = snap(0, dec!(600), dec!(9));
        let now = Timestamp::from_secs(200);
        let once = s.transform(now, dec!(600), dec!(0)).unwrap();
        let twice = once.transform(now, dec!(600), dec!(0)).unwrap();
        assert_eq!(once.accumulator, twice.accumulator);
        assert_eq!(once.window, twice.window);
    }

    #[test]
    fn window_blend_is_magnitude_weighted() {
        // decayed 6 over a 600s window, new 2 over a 200s window:
        // (6*600 + 2*200) / 8 = 500
        let s = snap(0, dec!(600), dec!(6));
        let out = s.transform(Timestamp::from_secs(0), dec!(200), dec!(2)).unwrap();
        assert_eq!(out.accumulator, dec!(8));
        assert_eq!(out.window, dec!(500));
    }

    #[test]
    fn cancelling_contribution_resets_window() {
        let s = snap(0, dec!(600), dec!(4));
        let out = s.transform(Timestamp::from_secs(0), dec!(120), dec!(-4)).unwrap();
        assert_eq!(out.accumulator, dec!(0));
        assert_eq!(out.window, dec!(120));
    }

    #[test]
    fn projection_into_the_past_is_time_travel() {
        let s = snap(500, dec!(600), dec!(1));
        let err = s.peek(Timestamp::from_secs(499)).unwrap_err();
        assert!(matches!(err, StateError::TimeTravel { .. }));
    }

    #[test]
    fn read_projection_matches_writer_transform() {
        // writer records volume, reader later projects: same arithmetic path
        let s = Snapshot::empty(Timestamp::from_secs(0));
        let written = s.transform(Timestamp::from_secs(10), dec!(600), dec!(3)).unwrap();
        let read = written.peek(Timestamp::from_secs(310)).unwrap();
        // half the window elapsed since write
        assert_eq!(read, dec!(1.5));
    }
}
