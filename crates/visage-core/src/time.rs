//! Frame time primitives for VISAGE
//!
//! The compositor owns one clock per avatar. Every system reads the same
//! `FrameTime` during a tick; none keeps its own time origin except the
//! procedural speech driver's phase accumulator.

use std::time::Duration;

/// Nominal display refresh rate the fixed step is derived from
pub const NOMINAL_REFRESH_HZ: f32 = 60.0;

/// Fixed step used by the procedural speech driver (~60 fps)
pub const FRAME_DT: f32 = 0.016;

/// Largest delta a single tick may carry, in seconds.
/// A tab coming back from the background must not teleport the animation.
pub const MAX_FRAME_DELTA: f32 = 0.1;

/// Time as seen by one compositor tick
#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub struct FrameTime {
    /// Seconds since the avatar was mounted (monotonic)
    pub elapsed: f32,
    /// Seconds since the previous tick
    pub delta: f32,
}

impl FrameTime {
    pub const ZERO: FrameTime = FrameTime {
        elapsed: 0.0,
        delta: 0.0,
    };

    #[inline]
    pub fn new(elapsed: f32, delta: f32) -> Self {
        FrameTime { elapsed, delta }
    }

    /// Elapsed time as a `Duration`
    #[inline]
    pub fn elapsed_duration(&self) -> Duration {
        Duration::from_secs_f32(self.elapsed.max(0.0))
    }
}

/// Clamp a raw refresh delta into `[0, MAX_FRAME_DELTA]`
#[inline]
pub fn clamp_delta(dt: f32) -> f32 {
    if dt.is_finite() {
        dt.clamp(0.0, MAX_FRAME_DELTA)
    } else {
        0.0
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_clamp_delta() {
        assert_eq!(clamp_delta(0.016), 0.016);
        assert_eq!(clamp_delta(-1.0), 0.0);
        assert_eq!(clamp_delta(5.0), MAX_FRAME_DELTA);
        assert_eq!(clamp_delta(f32::NAN), 0.0);
    }

    #[test]
    fn test_frame_dt_matches_refresh() {
        assert!((FRAME_DT - 1.0 / NOMINAL_REFRESH_HZ).abs() < 0.001);
    }
}
