//! Animation clock

use std::time::Instant;

use visage_core::{clamp_delta, FrameTime};

/// Animation clock - monotonic, driven by display refreshes
/// INVARIANT: elapsed time never decreases
#[derive(Debug, Clone)]
pub struct AnimationClock {
    /// Seconds since mount
    elapsed: f32,
    /// Delta of the last tick
    delta: f32,
    /// Last wall-clock instant (real-time mode only)
    last_instant: Option<Instant>,
    /// Number of ticks taken
    ticks: u64,
}

impl AnimationClock {
    /// Create a new clock at zero
    pub fn new() -> Self {
        AnimationClock {
            elapsed: 0.0,
            delta: 0.0,
            last_instant: None,
            ticks: 0,
        }
    }

    /// Advance by a host-supplied refresh delta (seconds).
    /// Negative or non-finite deltas count as zero.
    pub fn advance(&mut self, dt: f32) -> FrameTime {
        let dt = if dt.is_finite() { dt.max(0.0) } else { 0.0 };
        self.elapsed += dt;
        self.delta = dt;
        self.ticks += 1;
        self.now()
    }

    /// Advance from the wall clock.
    /// The first call yields a zero delta; large gaps (sleep, hidden tab)
    /// are clamped so the animation never jumps.
    pub fn tick_realtime(&mut self) -> FrameTime {
        let now = Instant::now();
        let dt = match self.last_instant {
            Some(last) => clamp_delta(now.duration_since(last).as_secs_f32()),
            None => 0.0,
        };
        self.last_instant = Some(now);
        self.advance(dt)
    }

    /// Current frame time without advancing
    pub fn now(&self) -> FrameTime {
        FrameTime::new(self.elapsed, self.delta)
    }

    pub fn ticks(&self) -> u64 {
        self.ticks
    }
}

impl Default for AnimationClock {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::time::Duration;

    #[test]
    fn test_clock_advance() {
        let mut clock = AnimationClock::new();
        clock.advance(0.5);
        let t = clock.advance(0.25);

        assert_eq!(t.elapsed, 0.75);
        assert_eq!(t.delta, 0.25);
        assert_eq!(clock.ticks(), 2);
    }

    #[test]
    fn test_clock_rejects_negative_delta() {
        let mut clock = AnimationClock::new();
        clock.advance(1.0);
        let t = clock.advance(-0.5);

        assert_eq!(t.elapsed, 1.0);
        assert_eq!(t.delta, 0.0);
    }

    #[test]
    fn test_clock_realtime_monotonic() {
        let mut clock = AnimationClock::new();

        let t1 = clock.tick_realtime();
        assert_eq!(t1.delta, 0.0);
        std::thread::sleep(Duration::from_millis(10));
        let t2 = clock.tick_realtime();

        assert!(t2.elapsed > t1.elapsed);
        assert!(t2.delta <= visage_core::MAX_FRAME_DELTA);
    }

    mod props {
        use super::super::*;
        use proptest::prelude::*;

        proptest! {
            #[test]
            fn elapsed_never_decreases(deltas in proptest::collection::vec(-1.0f32..1.0, 1..64)) {
                let mut clock = AnimationClock::new();
                let mut last = 0.0;
                for dt in deltas {
                    let t = clock.advance(dt);
                    prop_assert!(t.elapsed >= last);
                    last = t.elapsed;
                }
            }
        }
    }
}
