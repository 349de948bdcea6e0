#![forbid(unsafe_code)]

//! The option model: one selectable choice on the wheel.

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

/// Multiplier applied when an option is boosted.
pub const BOOST_MULTIPLIER: u32 = 2;

/// One labeled choice on the wheel, with a display weight.
///
/// `boosted` records the user's intent (the ×2 toggle); the effective
/// selection weight is always read through [`WheelOption::weight`], which
/// treats a zero multiplier as 1. The `enabled` flag round-trips through
/// persistence but does not affect layout or selection.
#[derive(Debug, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct WheelOption {
    pub text: String,
    #[cfg_attr(feature = "serde", serde(default))]
    pub boosted: bool,
    #[cfg_attr(feature = "serde", serde(default = "default_multiplier"))]
    pub multiplier: u32,
    #[cfg_attr(feature = "serde", serde(default = "default_enabled"))]
    pub enabled: bool,
}

fn default_multiplier() -> u32 {
    1
}

fn default_enabled() -> bool {
    true
}

impl WheelOption {
    /// Create a unit-weight, unboosted, enabled option.
    pub fn new(text: impl Into<String>) -> Self {
        Self {
            text: text.into(),
            boosted: false,
            multiplier: 1,
            enabled: true,
        }
    }

    /// Effective selection weight. A multiplier of zero counts as 1.
    #[inline]
    pub fn weight(&self) -> u32 {
        self.multiplier.max(1)
    }

    /// Set or clear the boost toggle. Boosting sets the multiplier to
    /// [`BOOST_MULTIPLIER`]; clearing resets it to 1.
    pub fn set_boosted(&mut self, boosted: bool) {
        self.boosted = boosted;
        self.multiplier = if boosted { BOOST_MULTIPLIER } else { 1 };
    }

    /// Normalize in place: clamp a zero multiplier up to 1.
    pub fn normalize(&mut self) {
        if self.multiplier == 0 {
            self.multiplier = 1;
        }
    }
}

impl From<&str> for WheelOption {
    fn from(text: &str) -> Self {
        Self::new(text)
    }
}

/// Normalize a list wholesale, as on load/import.
pub fn normalize_all(options: &mut [WheelOption]) {
    for opt in options {
        opt.normalize();
    }
}
