//! Tick arithmetic.
//!
//! All scheduling runs on an external, strictly increasing tick counter. Wall-clock
//! durations from definitions are converted with [`to_ticks`] at the server rate of
//! [`TICKS_PER_SECOND`].
use std::time::Duration;

/// Index of a discrete simulation tick.
pub type Tick = u64;

/// Fixed simulation rate the durations are converted against.
pub const TICKS_PER_SECOND: u64 = 20;

const MILLIS_PER_TICK: u128 = 1000 / TICKS_PER_SECOND as u128;

/// Convert a duration to whole ticks, truncating any partial tick.
#[inline]
pub fn to_ticks(duration: Duration) -> Tick {
    let ticks = duration.as_millis() / MILLIS_PER_TICK;
    Tick::try_from(ticks).unwrap_or(Tick::MAX)
}

/// Duration spanned by `ticks` at [`TICKS_PER_SECOND`].
#[inline]
pub fn from_ticks(ticks: Tick) -> Duration {
    Duration::from_millis(ticks.saturating_mul(MILLIS_PER_TICK as u64))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn whole_seconds_convert_at_twenty_ticks() {
        assert_eq!(to_ticks(Duration::from_secs(1)), 20);
        assert_eq!(to_ticks(Duration::from_secs(10)), 200);
        assert_eq!(to_ticks(Duration::ZERO), 0);
    }

    #[test]
    fn partial_ticks_truncate() {
        assert_eq!(to_ticks(Duration::from_millis(49)), 0);
        assert_eq!(to_ticks(Duration::from_millis(50)), 1);
        assert_eq!(to_ticks(Duration::from_millis(1234)), 24);
    }

    #[test]
    fn huge_durations_saturate() {
        assert_eq!(to_ticks(Duration::MAX), Tick::MAX);
    }

    #[test]
    fn from_ticks_inverts_whole_ticks() {
        assert_eq!(from_ticks(40), Duration::from_secs(2));
        assert_eq!(to_ticks(from_ticks(123)), 123);
    }
}
