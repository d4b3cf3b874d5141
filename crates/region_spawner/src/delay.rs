//! Inter-spawn delay windows.
//!
//! A window opens at `last_tick` and lasts `current_delay` ticks. It is re-rolled once
//! when a spawner is created and once after every fire, never on ticks that do not fire.
use rand::Rng;
use tracing::debug;

use crate::definition::SpawnerDefinition;
use crate::region::rand01;
use crate::time::{to_ticks, Tick};

/// The current delay window of a spawner.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DelayWindow {
    /// Tick the window started at.
    pub last_tick: Tick,
    /// Ticks that must pass after `last_tick` before the next fire.
    pub current_delay: Tick,
}

impl DelayWindow {
    pub fn new(last_tick: Tick, current_delay: Tick) -> Self {
        Self {
            last_tick,
            current_delay,
        }
    }

    /// Whether the window has run out at `now`.
    #[inline]
    pub fn elapsed(&self, now: Tick) -> bool {
        now.saturating_sub(self.last_tick) >= self.current_delay
    }

    /// Ticks left until the window runs out, 0 once elapsed.
    #[inline]
    pub fn remaining(&self, now: Tick) -> Tick {
        self.current_delay
            .saturating_sub(now.saturating_sub(self.last_tick))
    }

    /// Earliest tick a fire can happen at.
    #[inline]
    pub fn next_fire_tick(&self) -> Tick {
        self.last_tick.saturating_add(self.current_delay)
    }
}

/// Open a new delay window at `now`.
///
/// Equal `min_delay` and `max_delay` select the fixed `delay`. Otherwise the delay is a
/// uniform draw over `[min_delay, max_delay)` in ticks, truncated towards zero.
pub fn roll_delay<W: ?Sized>(
    definition: &SpawnerDefinition<W>,
    rng: &mut dyn Rng,
    now: Tick,
) -> DelayWindow {
    let current_delay = if definition.min_delay == definition.max_delay {
        to_ticks(definition.delay)
    } else {
        let min = to_ticks(definition.min_delay) as f64;
        let max = to_ticks(definition.max_delay) as f64;
        (rand01(rng) * (max - min) + min) as Tick
    };

    debug!(
        "Spawner {} delay rolled at tick {}: {} ticks.",
        definition.id, now, current_delay
    );

    DelayWindow::new(now, current_delay)
}

#[cfg(test)]
mod tests {
    use std::time::Duration;

    use glam::Vec3;
    use rand::rngs::StdRng;
    use rand::SeedableRng;

    use super::*;
    use crate::definition::SpawnerId;
    use crate::region::tests::FixedRng;
    use crate::region::Cuboid;

    fn definition() -> SpawnerDefinition<()> {
        let arena = Cuboid::new(Vec3::ZERO, Vec3::splat(8.0));
        SpawnerDefinition::new(SpawnerId(0), arena, arena)
    }

    #[test]
    fn window_arithmetic() {
        let w = DelayWindow::new(100, 20);
        assert!(!w.elapsed(119));
        assert!(w.elapsed(120));
        assert_eq!(w.remaining(105), 15);
        assert_eq!(w.remaining(500), 0);
        assert_eq!(w.next_fire_tick(), 120);
    }

    #[test]
    fn window_tolerates_ticks_before_start() {
        let w = DelayWindow::new(100, 20);
        assert!(!w.elapsed(50));
        assert_eq!(w.remaining(50), 20);
    }

    #[test]
    fn zero_delay_is_elapsed_immediately() {
        assert!(DelayWindow::new(7, 0).elapsed(7));
    }

    #[test]
    fn fixed_delay_is_constant() {
        let def = definition().with_delay(Duration::from_secs(3));
        let mut rng = StdRng::seed_from_u64(1);
        for now in [0, 10, 999] {
            let w = roll_delay(&def, &mut rng, now);
            assert_eq!(w.current_delay, 60);
            assert_eq!(w.last_tick, now);
        }
    }

    #[test]
    fn equal_bounds_use_the_fixed_delay_field() {
        let mut def = definition();
        def.delay = Duration::from_secs(2);
        def.min_delay = Duration::from_secs(5);
        def.max_delay = Duration::from_secs(5);
        let mut rng = StdRng::seed_from_u64(1);
        assert_eq!(roll_delay(&def, &mut rng, 0).current_delay, 40);
    }

    #[test]
    fn ranged_delay_maps_draw_linearly() {
        let def = definition().with_delay_range(Duration::from_secs(1), Duration::from_secs(3));

        let mut low = FixedRng { value: 0 };
        assert_eq!(roll_delay(&def, &mut low, 0).current_delay, 20);

        let mut mid = FixedRng { value: 1 << 63 };
        assert_eq!(roll_delay(&def, &mut mid, 0).current_delay, 40);

        let mut high = FixedRng { value: u64::MAX };
        assert_eq!(roll_delay(&def, &mut high, 0).current_delay, 59);
    }

    #[test]
    fn ranged_delay_is_uniform_over_half_open_range() {
        let def = definition().with_delay_range(Duration::from_secs(1), Duration::from_secs(2));
        let mut rng = StdRng::seed_from_u64(0xC0FFEE);

        // 20..40 ticks, 20 buckets.
        let samples = 40_000;
        let mut buckets = [0usize; 20];
        for _ in 0..samples {
            let d = roll_delay(&def, &mut rng, 0).current_delay;
            assert!((20..40).contains(&d), "delay {d} out of range");
            buckets[(d - 20) as usize] += 1;
        }

        let expected = samples as f64 / 20.0;
        for (i, &count) in buckets.iter().enumerate() {
            let deviation = (count as f64 - expected).abs() / expected;
            assert!(deviation < 0.1, "bucket {i} has {count}, expected ~{expected}");
        }
    }
}
