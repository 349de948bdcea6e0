#![forbid(unsafe_code)]

//! The in-flight spin animation.

use std::f64::consts::TAU;
use std::time::Duration;

use rand::Rng;

use crate::animation::{Timeline, ease_out_cubic};
use crate::config::SpinConfig;

/// One running spin: a fixed angular sweep eased over a fixed duration.
///
/// The sweep is `target − start` plus a random number of extra full
/// turns, so the wheel visibly winds up before settling on the target.
#[derive(Debug, Clone, Copy)]
pub struct Spin {
    start_angle: f64,
    total_delta: f64,
    timeline: Timeline,
}

impl Spin {
    /// Plan a spin from `start_angle` that settles at `target_angle`
    /// (mod 2π).
    pub fn plan<R: Rng + ?Sized>(
        rng: &mut R,
        config: &SpinConfig,
        start_angle: f64,
        target_angle: f64,
    ) -> Self {
        let max = config.max_extra_turns.max(config.min_extra_turns);
        let extra_turns = rng.random_range(config.min_extra_turns..=max);
        let end_angle = target_angle + TAU * f64::from(extra_turns);
        Self {
            start_angle,
            total_delta: end_angle - start_angle,
            timeline: Timeline::new(config.duration).easing(ease_out_cubic),
        }
    }

    /// Advance by `dt`. Returns `true` once the spin has finished.
    pub fn tick(&mut self, dt: Duration) -> bool {
        self.timeline.tick(dt);
        self.timeline.is_complete()
    }

    /// Current wheel angle for this spin.
    pub fn angle(&self) -> f64 {
        self.start_angle + self.total_delta * self.timeline.value()
    }

    /// Whether the sweep has completed.
    pub fn is_complete(&self) -> bool {
        self.timeline.is_complete()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::arc::normalize_angle;
    use rand::SeedableRng;
    use rand::rngs::StdRng;

    #[test]
    fn starts_at_start_angle() {
        let mut rng = StdRng::seed_from_u64(1);
        let spin = Spin::plan(&mut rng, &SpinConfig::default(), 0.7, 2.0);
        assert!((spin.angle() - 0.7).abs() < 1e-12);
        assert!(!spin.is_complete());
    }

    #[test]
    fn settles_on_target_modulo_full_turns() {
        let cfg = SpinConfig::default();
        for seed in 0..16 {
            let mut rng = StdRng::seed_from_u64(seed);
            let target = 2.5;
            let mut spin = Spin::plan(&mut rng, &cfg, 0.3, target);
            spin.tick(cfg.duration);
            assert!(spin.is_complete());
            let settled = normalize_angle(spin.angle());
            assert!((settled - target).abs() < 1e-6, "seed {seed}: {settled}");
        }
    }

    #[test]
    fn sweep_includes_extra_turns() {
        let cfg = SpinConfig::default();
        let mut rng = StdRng::seed_from_u64(9);
        let mut spin = Spin::plan(&mut rng, &cfg, 0.0, 1.0);
        spin.tick(cfg.duration);
        // At least min_extra_turns of winding beyond the raw target.
        assert!(spin.angle() >= 1.0 + TAU * f64::from(cfg.min_extra_turns) - 1e-9);
        assert!(spin.angle() <= 1.0 + TAU * f64::from(cfg.max_extra_turns) + 1e-9);
    }

    #[test]
    fn angle_is_monotonic() {
        let cfg = SpinConfig::default();
        let mut rng = StdRng::seed_from_u64(4);
        let mut spin = Spin::plan(&mut rng, &cfg, 0.0, 3.0);
        let mut last = spin.angle();
        for _ in 0..200 {
            spin.tick(Duration::from_millis(16));
            let now = spin.angle();
            assert!(now >= last);
            last = now;
        }
        assert!(spin.is_complete());
    }

    #[test]
    fn tick_reports_completion_once_elapsed() {
        let cfg = SpinConfig::default();
        let mut rng = StdRng::seed_from_u64(2);
        let mut spin = Spin::plan(&mut rng, &cfg, 0.0, 1.0);
        assert!(!spin.tick(Duration::from_millis(100)));
        assert!(spin.tick(cfg.duration));
    }
}
