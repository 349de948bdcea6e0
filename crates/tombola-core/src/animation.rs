#![forbid(unsafe_code)]

//! Time-based animation primitives.
//!
//! A [`Timeline`] accumulates elapsed time as [`Duration`] (no
//! floating-point drift) and maps normalized progress through an easing
//! function. The caller drives it from the host frame loop via
//! [`Timeline::tick`]; the timeline itself never schedules anything.

use std::time::Duration;

// ---------------------------------------------------------------------------
// Easing functions
// ---------------------------------------------------------------------------

/// Easing function signature: maps `t` in [0, 1] to output in [0, 1].
pub type EasingFn = fn(f64) -> f64;

/// Identity easing (constant velocity).
#[inline]
pub fn linear(t: f64) -> f64 {
    t.clamp(0.0, 1.0)
}

/// Quadratic ease-out (slow end).
#[inline]
pub fn ease_out(t: f64) -> f64 {
    let t = t.clamp(0.0, 1.0);
    1.0 - (1.0 - t) * (1.0 - t)
}

/// Cubic ease-out. This is the spin deceleration curve: fast launch,
/// long smooth settle.
#[inline]
pub fn ease_out_cubic(t: f64) -> f64 {
    let t = t.clamp(0.0, 1.0);
    1.0 - (1.0 - t).powi(3)
}

// ---------------------------------------------------------------------------
// Timeline
// ---------------------------------------------------------------------------

/// Progression from 0.0 to 1.0 over a fixed duration, with configurable
/// easing.
#[derive(Debug, Clone, Copy)]
pub struct Timeline {
    elapsed: Duration,
    duration: Duration,
    easing: EasingFn,
}

impl Timeline {
    /// Create a timeline with the given duration and linear easing.
    ///
    /// A zero duration is bumped to one nanosecond so progress is always
    /// well-defined.
    pub fn new(duration: Duration) -> Self {
        Self {
            elapsed: Duration::ZERO,
            duration: if duration.is_zero() {
                Duration::from_nanos(1)
            } else {
                duration
            },
            easing: linear,
        }
    }

    /// Set the easing function (builder).
    #[must_use]
    pub fn easing(mut self, easing: EasingFn) -> Self {
        self.easing = easing;
        self
    }

    /// Advance by `dt`.
    pub fn tick(&mut self, dt: Duration) {
        self.elapsed = self.elapsed.saturating_add(dt);
    }

    /// Whether the timeline has reached its end.
    pub fn is_complete(&self) -> bool {
        self.elapsed >= self.duration
    }

    /// Raw linear progress (before easing), in [0.0, 1.0].
    pub fn raw_progress(&self) -> f64 {
        (self.elapsed.as_secs_f64() / self.duration.as_secs_f64()).clamp(0.0, 1.0)
    }

    /// Eased progress, clamped to [0.0, 1.0].
    pub fn value(&self) -> f64 {
        (self.easing)(self.raw_progress())
    }

    /// Rewind to the start.
    pub fn reset(&mut self) {
        self.elapsed = Duration::ZERO;
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;

    const MS_500: Duration = Duration::from_millis(500);
    const SEC_1: Duration = Duration::from_secs(1);

    #[test]
    fn easing_endpoints() {
        for f in [linear, ease_out, ease_out_cubic] {
            assert!((f(0.0) - 0.0).abs() < f64::EPSILON);
            assert!((f(1.0) - 1.0).abs() < f64::EPSILON);
        }
    }

    #[test]
    fn easing_clamps_input() {
        assert!((linear(-1.0) - 0.0).abs() < f64::EPSILON);
        assert!((linear(2.0) - 1.0).abs() < f64::EPSILON);
        assert!((ease_out_cubic(1.5) - 1.0).abs() < f64::EPSILON);
    }

    #[test]
    fn ease_out_faster_start() {
        // At t=0.5 both ease-outs are ahead of linear.
        assert!(ease_out(0.5) > linear(0.5));
        assert!(ease_out_cubic(0.5) > ease_out(0.5));
    }

    #[test]
    fn ease_out_cubic_matches_formula() {
        let t = 0.3;
        let expected = 1.0 - (1.0 - t) * (1.0 - t) * (1.0 - t);
        assert!((ease_out_cubic(t) - expected).abs() < 1e-12);
    }

    #[test]
    fn timeline_starts_at_zero() {
        let tl = Timeline::new(SEC_1);
        assert!((tl.value() - 0.0).abs() < f64::EPSILON);
        assert!(!tl.is_complete());
    }

    #[test]
    fn timeline_completes_after_duration() {
        let mut tl = Timeline::new(SEC_1);
        tl.tick(SEC_1);
        assert!(tl.is_complete());
        assert!((tl.value() - 1.0).abs() < f64::EPSILON);
    }

    #[test]
    fn timeline_midpoint() {
        let mut tl = Timeline::new(SEC_1);
        tl.tick(MS_500);
        assert!((tl.value() - 0.5).abs() < 0.01);
    }

    #[test]
    fn timeline_incremental_ticks() {
        let mut tl = Timeline::new(Duration::from_millis(160));
        for _ in 0..10 {
            tl.tick(Duration::from_millis(16));
        }
        assert!(tl.is_complete());
    }

    #[test]
    fn timeline_clamps_overshoot() {
        let mut tl = Timeline::new(MS_500);
        tl.tick(Duration::from_secs(10));
        assert!(tl.is_complete());
        assert!((tl.value() - 1.0).abs() < f64::EPSILON);
    }

    #[test]
    fn timeline_with_easing() {
        let mut tl = Timeline::new(SEC_1).easing(ease_out_cubic);
        tl.tick(MS_500);
        // raw 0.5 → eased 1 - 0.5^3 = 0.875
        assert!((tl.raw_progress() - 0.5).abs() < 0.01);
        assert!((tl.value() - 0.875).abs() < 0.01);
    }

    #[test]
    fn timeline_reset() {
        let mut tl = Timeline::new(SEC_1);
        tl.tick(SEC_1);
        tl.reset();
        assert!(!tl.is_complete());
        assert!((tl.value() - 0.0).abs() < f64::EPSILON);
    }

    #[test]
    fn timeline_zero_duration_is_safe() {
        let mut tl = Timeline::new(Duration::ZERO);
        tl.tick(Duration::from_millis(1));
        assert!(tl.is_complete());
    }

    #[test]
    fn zero_dt_is_noop() {
        let mut tl = Timeline::new(SEC_1);
        tl.tick(Duration::ZERO);
        assert!((tl.value() - 0.0).abs() < f64::EPSILON);
    }
}
