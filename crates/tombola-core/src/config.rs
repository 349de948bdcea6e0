#![forbid(unsafe_code)]

//! Wheel tunables.

use std::time::Duration;

/// Spin animation parameters.
#[derive(Debug, Clone, Copy)]
pub struct SpinConfig {
    /// Total spin duration.
    pub duration: Duration,
    /// Fewest extra full turns added on top of the targeting rotation.
    /// Whole turns only: a fractional turn would drag the landing angle
    /// off the drawn winner.
    pub min_extra_turns: u32,
    /// Most extra full turns (inclusive).
    pub max_extra_turns: u32,
}

impl Default for SpinConfig {
    fn default() -> Self {
        Self {
            duration: Duration::from_millis(3000),
            min_extra_turns: 4,
            max_extra_turns: 7,
        }
    }
}

/// Wheel-wide tunables.
#[derive(Debug, Clone, Copy)]
pub struct WheelConfig {
    /// Idle auto-rotation speed in radians per second.
    pub rotation_speed: f64,
    /// Upper bound for the suspense multiplier. The lower bound is 1.
    pub suspense_limit: u32,
    pub spin: SpinConfig,
}

impl Default for WheelConfig {
    fn default() -> Self {
        Self {
            // 0.002 rad per frame at 60 fps, expressed in time.
            rotation_speed: 0.12,
            suspense_limit: 5,
            spin: SpinConfig::default(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults() {
        let cfg = WheelConfig::default();
        assert_eq!(cfg.spin.duration, Duration::from_millis(3000));
        assert_eq!(cfg.suspense_limit, 5);
        assert!(cfg.spin.min_extra_turns < cfg.spin.max_extra_turns);
    }
}
